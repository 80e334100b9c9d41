//! Document generation and history: the orchestration layer that wires the
//! Prompt Engine and Generation Client to persistence and audit logging.

pub mod handlers;

pub const DOC_TYPE_EMAIL: &str = "email";
pub const DOC_TYPE_REPORT: &str = "report";
