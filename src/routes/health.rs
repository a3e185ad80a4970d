use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Liveness only; no database round trip.
#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
