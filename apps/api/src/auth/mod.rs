//! Authentication and authorization: registration/login handlers, JWT
//! minting and verification, password hashing, and the request extractors
//! that guard protected routes.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::{info, warn};

use crate::audit;
use crate::config::AdminBootstrap;
use crate::errors::AppError;
use crate::models::user::{UserRow, ROLE_ADMIN};
use crate::state::AppState;

pub mod handlers;
pub mod password;
pub mod token;
pub mod validators;

/// Authenticated caller, extracted from a Bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: String,
}

/// Authenticated caller with the ADMIN role. Extraction fails with 403 for
/// any other role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        let claims = token::verify(token, &state.config.jwt_secret)
            .map_err(|_| AppError::Unauthorized)?;

        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized)?;

        Ok(AuthUser {
            user_id,
            role: claims.role,
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

/// Creates a one-time admin account at startup when bootstrap is configured
/// and no admin exists yet. Validation failures skip the bootstrap rather
/// than aborting startup.
pub async fn bootstrap_admin(
    pool: &sqlx::PgPool,
    bootstrap: &AdminBootstrap,
) -> anyhow::Result<()> {
    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM users WHERE role = $1 LIMIT 1")
            .bind(ROLE_ADMIN)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Ok(());
    }

    let email = bootstrap.email.trim().to_lowercase();
    if !validators::validate_email(&email) {
        warn!("admin bootstrap email is invalid, skipping");
        return Ok(());
    }
    if let Err(reason) = validators::validate_password(&bootstrap.password) {
        warn!("admin bootstrap password rejected: {reason}, skipping");
        return Ok(());
    }

    let password_hash = password::hash_password(&bootstrap.password);
    let user: UserRow = sqlx::query_as(
        "INSERT INTO users (username, email, password_hash, role) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, username, email, password_hash, role, created_at",
    )
    .bind(bootstrap.username.trim())
    .bind(&email)
    .bind(&password_hash)
    .bind(ROLE_ADMIN)
    .fetch_one(pool)
    .await?;

    audit::record(
        pool,
        audit::Entry::new(Some(user.id), "admin_bootstrap_created")
            .details(format!("Bootstrap admin created: {}", user.username)),
    )
    .await;

    info!("bootstrap admin user created");
    Ok(())
}
