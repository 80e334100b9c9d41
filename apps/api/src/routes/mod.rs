pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::admin::handlers as admin_handlers;
use crate::auth::handlers as auth_handlers;
use crate::documents::handlers as document_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/health/ai", get(health::ai_health_handler))
        // Auth API
        .route("/api/auth/register", post(auth_handlers::handle_register))
        .route("/api/auth/login", post(auth_handlers::handle_login))
        .route("/api/auth/me", get(auth_handlers::handle_me))
        // Document generation API
        .route(
            "/api/documents/email/generate",
            post(document_handlers::handle_generate_email),
        )
        .route(
            "/api/documents/report/generate",
            post(document_handlers::handle_generate_report),
        )
        // History API
        .route("/api/history", get(document_handlers::handle_history))
        .route(
            "/api/history/:id",
            get(document_handlers::handle_document_detail),
        )
        // Admin API
        .route("/api/admin/ping", get(admin_handlers::handle_ping))
        .route(
            "/api/admin/audit-logs",
            get(admin_handlers::handle_audit_logs),
        )
        .route("/api/admin/summary", get(admin_handlers::handle_summary))
        .route("/api/admin/users", post(admin_handlers::handle_create_admin))
        .with_state(state)
}
