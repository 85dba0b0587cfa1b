//! `GET /api/v1/health` — bypasses every service layer.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// Liveness probe: a trivial `SELECT 1` against the storage engine.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.engine.health().await {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "status": "unavailable" })))
    }
}
