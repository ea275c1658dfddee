use axum::{
    routing::get,
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    extract::State,
    Json,
};

use tracing::{debug, error};
use serde::Serialize;

use crate::state::app_state::AppState;

pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/info", get(info_check))
        .with_state(state)
}

pub async fn info_check() -> Response {
    let config = crate::utils::conf_helper::get_cached_config();

    debug!("{} requested", config.name);
    Json(config).into_response()
}

#[derive(Serialize)]
pub struct HealthStatus {
    status: String,
    rows: usize,
    signals: usize,
    activity_labels: usize,
}

async fn health_check(State(state): State<AppState>) -> Response {
    let store = &state.store;

    if store.table.is_empty() {
        error!("Health check failed: corpus has no rows");
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    Json(HealthStatus {
        status: "ok".to_owned(),
        rows: store.table.n_rows(),
        signals: store.table.signal_indices().len(),
        activity_labels: store.activity_labels.len(),
    })
    .into_response()
}
