use axum::{extract::Query, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct EffectParams {
    pub id: String,
}

/// POST /api/mock-effect?id=... — local effect sink.
///
/// The default `[effect] endpoint` points here so a fresh install exercises
/// the whole dispatch path without any external service. Acknowledges the
/// call; the engine only logs the status.
pub async fn mock_effect_handler(Query(params): Query<EffectParams>) -> (StatusCode, Json<Value>) {
    info!(schedule_id = %params.id, "mock effect received");
    (
        StatusCode::OK,
        Json(json!({ "status": "received", "id": params.id })),
    )
}
