use sqlx::PgPool;

use crate::config::Config;
use crate::genai::GenerationClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub genai: GenerationClient,
    pub config: Config,
}
