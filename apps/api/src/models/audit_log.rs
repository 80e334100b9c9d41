use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Audit entry as exposed to admins: the `audit_logs` row joined with the
/// acting username (usernames only; emails are withheld from listings).
/// `user_id` is nullable so system events survive user deletion, and
/// `request_context_id` carries the correlation id of the originating
/// request when one exists.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuditLogEntry {
    pub id: i64,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub request_context_id: Option<String>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}
