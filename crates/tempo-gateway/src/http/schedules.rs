use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use tempo_core::types::{Schedule, ScheduleInfo};
use tempo_store::StoreError;

use crate::app::AppState;

/// Body for create and update requests. The server owns id, bookkeeping
/// dates and the executed flag.
#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub name: String,
    pub start_date_time: DateTime<Utc>,
    #[serde(default)]
    pub info: ScheduleInfo,
}

/// POST /api/scheduler — create a schedule.
pub async fn create_schedule(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScheduleRequest>,
) -> (StatusCode, Json<Value>) {
    debug!(name = %req.name, "create schedule request");

    let schedule = Schedule::new(req.name, req.start_date_time, req.info);
    match state.store.save(&schedule) {
        Ok(saved) => {
            info!(schedule_id = %saved.id, "schedule created");
            (StatusCode::CREATED, Json(schedule_json(&saved)))
        }
        Err(e) => internal_error("create schedule", e),
    }
}

/// GET /api/scheduler — list all schedules.
pub async fn list_schedules(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    match state.store.find_all() {
        Ok(schedules) => {
            let list: Vec<Value> = schedules.iter().map(schedule_json).collect();
            (StatusCode::OK, Json(json!({ "schedules": list })))
        }
        Err(e) => internal_error("list schedules", e),
    }
}

/// GET /api/scheduler/{id} — fetch one schedule.
pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    match state.store.find_by_id(&id) {
        Ok(Some(schedule)) => (StatusCode::OK, Json(schedule_json(&schedule))),
        Ok(None) => not_found(&id),
        Err(e) => internal_error("get schedule", e),
    }
}

/// PUT /api/scheduler/{id} — update name, due time and payload.
///
/// Leaves `id`, `create_date` and `executed` untouched; refreshes
/// `update_date`.
pub async fn update_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ScheduleRequest>,
) -> (StatusCode, Json<Value>) {
    let existing = match state.store.find_by_id(&id) {
        Ok(Some(schedule)) => schedule,
        Ok(None) => return not_found(&id),
        Err(e) => return internal_error("update schedule", e),
    };

    let updated = apply_update(existing, req);
    match state.store.save(&updated) {
        Ok(saved) => {
            info!(schedule_id = %saved.id, "schedule updated");
            (StatusCode::OK, Json(schedule_json(&saved)))
        }
        Err(e) => internal_error("update schedule", e),
    }
}

/// DELETE /api/scheduler/{id} — remove a schedule.
pub async fn delete_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    match state.store.delete(&id) {
        Ok(()) => {
            info!(schedule_id = %id, "schedule deleted");
            (StatusCode::OK, Json(json!({ "status": "deleted", "id": id })))
        }
        Err(StoreError::NotFound { .. }) => not_found(&id),
        Err(e) => internal_error("delete schedule", e),
    }
}

fn apply_update(mut schedule: Schedule, req: ScheduleRequest) -> Schedule {
    schedule.name = req.name;
    schedule.start_date_time = req.start_date_time;
    schedule.info = req.info;
    schedule.update_date = Utc::now();
    schedule
}

fn schedule_json(schedule: &Schedule) -> Value {
    serde_json::to_value(schedule).unwrap_or_else(|_| json!({ "id": schedule.id }))
}

fn not_found(id: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("schedule not found: {id}") })),
    )
}

fn internal_error(op: &str, e: StoreError) -> (StatusCode, Json<Value>) {
    error!(error = %e, "{op} failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
    )
}
