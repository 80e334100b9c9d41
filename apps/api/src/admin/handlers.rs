//! Axum route handlers for the admin dashboard.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::audit;
use crate::auth::handlers::{insert_user, RegisterRequest};
use crate::auth::{password, validators, AdminUser};
use crate::errors::AppError;
use crate::models::audit_log::AuditLogEntry;
use crate::models::user::{UserRow, UserView, ROLE_ADMIN};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: String,
    pub user: UserView,
}

#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AuditLogResponse {
    pub audit_logs: Vec<AuditLogEntry>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub total_users: i64,
    pub total_documents: i64,
    pub documents_last_24h: i64,
    pub recent_events_count: i64,
}

#[derive(Debug, Serialize)]
pub struct CreateAdminResponse {
    pub message: String,
    pub user: UserView,
}

/// GET /api/admin/ping
pub async fn handle_ping(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<PingResponse>, AppError> {
    let user: UserRow = sqlx::query_as(
        "SELECT id, username, email, password_hash, role, created_at FROM users WHERE id = $1",
    )
    .bind(admin.user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(PingResponse {
        message: "Admin access verified".to_string(),
        user: UserView::from(&user),
    }))
}

/// GET /api/admin/audit-logs
///
/// Newest first. Usernames are joined in for display; emails are never
/// included in audit listings.
pub async fn handle_audit_logs(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<AuditLogResponse>, AppError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM audit_logs")
        .fetch_one(&state.db)
        .await?;

    let audit_logs: Vec<AuditLogEntry> = sqlx::query_as(
        "SELECT a.id, a.user_id, u.username, a.action, a.entity_type, a.entity_id, \
                a.request_context_id, a.details, a.created_at \
         FROM audit_logs a \
         LEFT JOIN users u ON u.id = a.user_id \
         ORDER BY a.created_at DESC \
         LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(AuditLogResponse {
        audit_logs,
        total: total.0,
        limit,
        offset,
    }))
}

/// GET /api/admin/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Result<Json<SummaryResponse>, AppError> {
    let since = Utc::now() - Duration::hours(24);

    let total_users: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db)
        .await?;
    let total_documents: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents")
        .fetch_one(&state.db)
        .await?;
    let documents_last_24h: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM documents WHERE created_at >= $1")
            .bind(since)
            .fetch_one(&state.db)
            .await?;
    let recent_events_count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM audit_logs WHERE created_at >= $1")
            .bind(since)
            .fetch_one(&state.db)
            .await?;

    Ok(Json(SummaryResponse {
        total_users: total_users.0,
        total_documents: total_documents.0,
        documents_last_24h: documents_last_24h.0,
        recent_events_count: recent_events_count.0,
    }))
}

/// POST /api/admin/users
pub async fn handle_create_admin(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<CreateAdminResponse>), AppError> {
    let username = request.username.trim().to_string();
    let email = request.email.trim().to_lowercase();

    if username.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Username, email, and password are required".to_string(),
        ));
    }
    if username.chars().count() < 3 || username.chars().count() > 100 {
        return Err(AppError::Validation(
            "Username must be between 3 and 100 characters".to_string(),
        ));
    }
    if !validators::validate_email(&email) {
        return Err(AppError::Validation("Invalid email format".to_string()));
    }
    validators::validate_password(&request.password)
        .map_err(|reason| AppError::Validation(reason.to_string()))?;

    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = $1 OR email = $2 LIMIT 1")
            .bind(&username)
            .bind(&email)
            .fetch_optional(&state.db)
            .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let password_hash = password::hash_password(&request.password);
    let user = insert_user(&state.db, &username, &email, &password_hash, ROLE_ADMIN).await?;

    audit::record(
        &state.db,
        audit::Entry::new(Some(admin.user_id), "admin_user_created")
            .entity("user", Some(user.id))
            .details(format!("Admin user created: {username}")),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(CreateAdminResponse {
            message: "Admin user created successfully".to_string(),
            user: UserView::from(&user),
        }),
    ))
}
