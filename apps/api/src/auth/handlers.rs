//! Axum route handlers for registration, login, and profile retrieval.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::audit;
use crate::auth::{password, token, validators, AuthUser};
use crate::errors::AppError;
use crate::models::user::{UserRow, UserView, ROLE_USER};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email address.
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserView,
    pub access_token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserView,
}

fn validate_new_account(username: &str, email: &str, password: &str) -> Result<(), AppError> {
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::Validation(
            "Username, email, and password are required".to_string(),
        ));
    }
    if username.chars().count() < 3 || username.chars().count() > 100 {
        return Err(AppError::Validation(
            "Username must be between 3 and 100 characters".to_string(),
        ));
    }
    if !validators::validate_email(email) {
        return Err(AppError::Validation("Invalid email format".to_string()));
    }
    validators::validate_password(password)
        .map_err(|reason| AppError::Validation(reason.to_string()))
}

/// Inserts a user row, mapping a unique violation to a generic conflict so
/// existing accounts cannot be enumerated.
pub(crate) async fn insert_user(
    pool: &sqlx::PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
    role: &str,
) -> Result<UserRow, AppError> {
    sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (username, email, password_hash, role) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, username, email, password_hash, role, created_at",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict("User already exists".to_string())
        }
        _ => AppError::Database(e),
    })
}

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let username = request.username.trim().to_string();
    let email = request.email.trim().to_lowercase();
    validate_new_account(&username, &email, &request.password)?;

    let existing: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM users WHERE username = $1 OR email = $2 LIMIT 1")
            .bind(&username)
            .bind(&email)
            .fetch_optional(&state.db)
            .await?;
    if existing.is_some() {
        // Generic message to prevent user enumeration.
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let password_hash = password::hash_password(&request.password);
    let user = insert_user(&state.db, &username, &email, &password_hash, ROLE_USER).await?;

    audit::record(
        &state.db,
        audit::Entry::new(Some(user.id), "user_registered")
            .details(format!("New user registered: {username}")),
    )
    .await;

    let access_token = token::mint(user.id, &user.role, &state.config.jwt_secret)
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user: UserView::from(&user),
            access_token,
        }),
    ))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let identifier = request.username.trim();
    if identifier.is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let user: Option<UserRow> = sqlx::query_as(
        "SELECT id, username, email, password_hash, role, created_at \
         FROM users WHERE username = $1 OR email = $2",
    )
    .bind(identifier)
    .bind(identifier.to_lowercase())
    .fetch_optional(&state.db)
    .await?;

    let user = match user {
        Some(user) if password::verify_password(&request.password, &user.password_hash) => user,
        Some(user) => {
            audit::record(
                &state.db,
                audit::Entry::new(Some(user.id), "login_failed")
                    .details(format!("Failed login attempt for user: {}", user.username)),
            )
            .await;
            return Err(AppError::Unauthorized);
        }
        None => return Err(AppError::Unauthorized),
    };

    audit::record(
        &state.db,
        audit::Entry::new(Some(user.id), "login_success")
            .details(format!("User logged in: {}", user.username)),
    )
    .await;

    let access_token = token::mint(user.id, &user.role, &state.config.jwt_secret)
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: UserView::from(&user),
        access_token,
    }))
}

/// GET /api/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let user: UserRow = sqlx::query_as(
        "SELECT id, username, email, password_hash, role, created_at FROM users WHERE id = $1",
    )
    .bind(auth.user_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(MeResponse {
        user: UserView::from(&user),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_validation_bounds() {
        assert!(validate_new_account("bob", "bob@example.com", "abcd1234").is_ok());
        assert!(validate_new_account("ab", "bob@example.com", "abcd1234").is_err());
        assert!(validate_new_account("bob", "not-an-email", "abcd1234").is_err());
        assert!(validate_new_account("bob", "bob@example.com", "weak").is_err());
        assert!(validate_new_account("", "", "").is_err());

        let long_username = "u".repeat(101);
        assert!(validate_new_account(&long_username, "bob@example.com", "abcd1234").is_err());
    }
}
