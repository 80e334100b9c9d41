use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::genai::{GenerationError, GenerationErrorKind};
use crate::prompt::PromptError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PromptError> for AppError {
    fn from(err: PromptError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Generation(e) => return generation_error_response(e),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// Maps the generation failure taxonomy onto user-facing responses.
///
/// Rate limiting and timeouts get distinct statuses and messages. Every
/// other kind collapses into a generic unavailability message; the
/// classified detail goes to server-side logs only.
fn generation_error_response(err: &GenerationError) -> Response {
    let (status, code, message) = match err.kind() {
        GenerationErrorKind::RateLimit => (
            StatusCode::TOO_MANY_REQUESTS,
            "GENERATION_RATE_LIMITED",
            "Rate limit exceeded. Please try again later.".to_string(),
        ),
        GenerationErrorKind::Timeout => (
            StatusCode::GATEWAY_TIMEOUT,
            "GENERATION_TIMEOUT",
            "The request took too long. Please try again.".to_string(),
        ),
        GenerationErrorKind::Auth
        | GenerationErrorKind::Network
        | GenerationErrorKind::InvalidResponse
        | GenerationErrorKind::Unknown => {
            tracing::error!(
                kind = err.kind().as_str(),
                correlation_id = err.correlation_id(),
                "generation failed: {err}"
            );
            (
                StatusCode::BAD_GATEWAY,
                "GENERATION_UNAVAILABLE",
                "AI service unavailable. Please try again later.".to_string(),
            )
        }
    };

    let body = Json(json!({
        "error": {
            "code": code,
            "message": message
        },
        "correlation_id": err.correlation_id()
    }));

    let mut response = (status, body).into_response();
    if let Some(secs) = err.retry_after_secs() {
        if let Ok(value) = secs.to_string().parse() {
            response
                .headers_mut()
                .insert(axum::http::header::RETRY_AFTER, value);
        }
    }
    response
}
