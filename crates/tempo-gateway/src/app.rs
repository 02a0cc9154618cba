use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use tempo_core::config::TempoConfig;
use tempo_store::ScheduleStore;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: TempoConfig,
    pub store: Arc<dyn ScheduleStore>,
}

impl AppState {
    pub fn new(config: TempoConfig, store: Arc<dyn ScheduleStore>) -> Self {
        Self { config, store }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route(
            "/api/scheduler",
            post(crate::http::schedules::create_schedule)
                .get(crate::http::schedules::list_schedules),
        )
        .route(
            "/api/scheduler/{id}",
            get(crate::http::schedules::get_schedule)
                .put(crate::http::schedules::update_schedule)
                .delete(crate::http::schedules::delete_schedule),
        )
        .route("/api/mock-effect", post(crate::http::effect::mock_effect_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
