use axum::{
    routing::{get, post},
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
    extract::{Path, State},
};

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::state::app_state::{AppState, JobStatus};
use crate::utils::conf_helper::get_cached_config;
use opp_profiler::core::cache::write_cache;
use opp_profiler::{DriverConfig, ProfilingDriver};

#[derive(Serialize)]
pub struct JobCreated {
    pub id: Uuid,
}

pub fn job_routes(state: AppState) -> Router {
    Router::new()
        .route("/jobs", post(start_job))
        .route("/jobs/{id}", get(job_status))
        .with_state(state)
}

/// Body is a driver configuration; `{}` uses the configured defaults.
async fn start_job(
    State(state): State<AppState>,
    body: Option<Json<DriverConfig>>,
) -> Response {
    let config = get_cached_config();
    let driver_config = body
        .map(|Json(c)| c)
        .unwrap_or_else(|| config.profiling.clone());

    let id = Uuid::new_v4();
    let started_at = Utc::now();
    let output = PathBuf::from(&config.dataset.results_dir).join(format!("profiles-{}.bin", id));
    let compression = config.dataset.compression;

    state.record_job(id, JobStatus::Running { started_at }).await;

    info!("Profiling job {} started ({:?})", id, driver_config);

    let store = Arc::clone(&state.store);

    tokio::spawn(async move {
        let output_path = output.clone();
        let result = tokio::task::spawn_blocking(move || {
            let index = ProfilingDriver::new(store, driver_config).run()?;
            write_cache(&output_path, &index, compression)?;
            Ok::<_, opp_profiler::ProfilerError>(index)
        })
        .await;

        let finished_at = Utc::now();
        let status = match result {
            Ok(Ok(index)) => {
                info!(
                    "Profiling job {} done: {} profiles, {} gaps",
                    id,
                    index.len(),
                    index.gaps.len()
                );
                JobStatus::Done {
                    started_at,
                    finished_at,
                    profiles: index.len(),
                    gaps: index.gaps.len(),
                    output: output.display().to_string(),
                }
            }
            Ok(Err(e)) => {
                error!("Profiling job {} failed: {}", id, e);
                JobStatus::Failed {
                    started_at,
                    finished_at,
                    error: e.to_string(),
                }
            }
            Err(e) => {
                error!("Profiling job {} panicked: {}", id, e);
                JobStatus::Failed {
                    started_at,
                    finished_at,
                    error: e.to_string(),
                }
            }
        };

        state.record_job(id, status).await;
    });

    (StatusCode::ACCEPTED, Json(JobCreated { id })).into_response()
}

async fn job_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    let jobs = state.jobs.read().await;

    match jobs.get(&id) {
        Some(status) => Json(status.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
