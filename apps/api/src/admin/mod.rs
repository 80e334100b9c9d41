//! Admin-only endpoints. Every handler here extracts [`AdminUser`], so a
//! non-admin token is rejected with 403 before any work happens.

pub mod handlers;
