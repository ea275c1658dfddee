use axum::{
    routing::{get, post},
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
    extract::State,
};

use std::sync::Arc;

use tracing::{debug, error, warn};
use serde::{Serialize, Deserialize};

use crate::state::app_state::AppState;
use opp_profiler::core::driver::profile_slice;
use opp_profiler::{
    ColumnFilter, CorpusStore, LabelFilter, ProfileKind, ProfilerError, RunFilter, SelectionView,
};

/// Filters carving one slice. Applied runs, then labels, then columns.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct SliceRequest {
    pub run: RunFilter,
    pub labels: LabelFilter,
    pub columns: Option<ColumnFilter>,
}

#[derive(Deserialize, Debug)]
pub struct ProfileRequest {
    #[serde(flatten)]
    pub slice: SliceRequest,
    #[serde(default)]
    pub normalized: bool,
    #[serde(default)]
    pub gradient: bool,
}

#[derive(Serialize)]
pub struct ColumnSummary {
    pub index: usize,
    pub sensor: String,
    pub location: String,
    pub signal: String,
}

#[derive(Serialize)]
pub struct SliceResponse {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
}

#[derive(Serialize)]
pub struct SignalProfileResponse {
    pub column: usize,
    pub signal: String,
    pub samples: usize,
    pub min: f64,
    pub max: f64,
    pub bins: usize,
    pub steps: Vec<(f64, f64)>,
}

#[derive(Serialize)]
pub struct SkippedSignal {
    pub signal: String,
    pub reason: String,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub rows: usize,
    pub kind: ProfileKind,
    pub profiles: Vec<SignalProfileResponse>,
    pub skipped: Vec<SkippedSignal>,
}

/// =======================
/// ROUTER
/// =======================

pub fn data_routes(state: AppState) -> Router {
    Router::new()
        .route("/signals", get(list_signals))
        .route("/labels", get(list_labels))
        .route("/slice", post(slice))
        .route("/profile", post(profile))
        .with_state(state)
}

fn carve(store: Arc<CorpusStore>, request: &SliceRequest) -> opp_profiler::Result<SelectionView> {
    let mut view = SelectionView::new(store);

    view.apply_run_selection(&request.run)?;
    // an empty label filter would select nothing
    if !request.labels.is_empty() {
        view.apply_label_selection(&request.labels)?;
    }
    if let Some(columns) = &request.columns {
        view.apply_column_selection(columns)?;
    }

    Ok(view)
}

fn error_response(e: ProfilerError) -> Response {
    match e {
        ProfilerError::InvalidFilterKey(_) => {
            warn!("Rejected filter: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
        other => {
            error!("Slice request failed: {}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response()
        }
    }
}

/// =======================
/// HANDLERS
/// =======================

async fn list_signals(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.signal_metadata.clone())
}

async fn list_labels(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.store.activity_labels.clone())
}

async fn slice(
    State(state): State<AppState>,
    Json(request): Json<SliceRequest>,
) -> Response {
    debug!("Slice request: {:?}", request);

    let view = match carve(Arc::clone(&state.store), &request) {
        Ok(view) => view,
        Err(e) => return error_response(e),
    };

    let columns = view
        .columns()
        .iter()
        .filter(|(index, _)| **index != 0)
        .map(|(index, meta)| ColumnSummary {
            index: *index,
            sensor: meta.sensor.clone(),
            location: meta.location.clone(),
            signal: meta.signal.clone(),
        })
        .collect();

    Json(SliceResponse {
        rows: view.current().n_rows(),
        columns,
    })
    .into_response()
}

async fn profile(
    State(state): State<AppState>,
    Json(request): Json<ProfileRequest>,
) -> Response {
    debug!("Profile request: {:?}", request);

    let store = Arc::clone(&state.store);
    let kind = ProfileKind::from_flags(request.normalized, request.gradient);

    // histogramming a large slice is CPU-bound
    let result = tokio::task::spawn_blocking(move || {
        let view = carve(store, &request.slice)?;
        let rows = view.current().n_rows();
        profile_slice(&view, kind).map(|outcomes| (rows, outcomes))
    })
    .await;

    let (rows, outcomes) = match result {
        Ok(Ok(done)) => done,
        Ok(Err(e)) => return error_response(e),
        Err(e) => {
            error!("Profile task panicked: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut profiles = Vec::new();
    let mut skipped = Vec::new();

    for (signal, outcome) in outcomes {
        match outcome {
            Ok(p) => profiles.push(SignalProfileResponse {
                column: p.column,
                signal,
                samples: p.samples,
                min: p.min,
                max: p.max,
                bins: p.profile.bin_count(),
                steps: p.profile.to_step_sequence(),
            }),
            Err(e) => skipped.push(SkippedSignal {
                signal,
                reason: e.to_string(),
            }),
        }
    }

    Json(ProfileResponse {
        rows,
        kind,
        profiles,
        skipped,
    })
    .into_response()
}
