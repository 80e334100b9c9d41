use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::genai::HealthReport;
use crate::state::AppState;

/// GET /health, process liveness only.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "GenAI Email & Report Drafting System"
    }))
}

/// GET /health/ai, a round trip through the generation provider.
pub async fn ai_health_handler(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.genai.health_check().await)
}
