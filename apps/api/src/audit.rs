//! Audit trail helpers. Audit writes are best-effort: a failed insert is
//! logged and never fails the request that triggered it.

use sqlx::PgPool;
use tracing::warn;

/// One audit entry, assembled with the builder methods below.
#[derive(Debug, Clone)]
pub struct Entry {
    user_id: Option<i64>,
    action: String,
    entity_type: Option<String>,
    entity_id: Option<i64>,
    request_context_id: Option<String>,
    details: Option<String>,
}

impl Entry {
    pub fn new(user_id: Option<i64>, action: impl Into<String>) -> Self {
        Entry {
            user_id,
            action: action.into(),
            entity_type: None,
            entity_id: None,
            request_context_id: None,
            details: None,
        }
    }

    pub fn entity(mut self, entity_type: impl Into<String>, entity_id: Option<i64>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = entity_id;
        self
    }

    pub fn request_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.request_context_id = Some(correlation_id.into());
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Inserts an audit row; failures are logged and swallowed.
pub async fn record(pool: &PgPool, entry: Entry) {
    let result = sqlx::query(
        "INSERT INTO audit_logs \
         (user_id, action, entity_type, entity_id, request_context_id, details) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(entry.user_id)
    .bind(&entry.action)
    .bind(&entry.entity_type)
    .bind(entry.entity_id)
    .bind(&entry.request_context_id)
    .bind(&entry.details)
    .execute(pool)
    .await;

    if let Err(e) = result {
        warn!(action = %entry.action, "failed to write audit log entry: {e}");
    }
}
