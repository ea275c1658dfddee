use axum::Router;
use tracing::{info, Level};

mod routes;
mod models;
mod utils;
mod state;

use crate::utils::conf_helper::{init_config_and_bind, get_cached_config};
use crate::utils::corpus_helper::load_store;
use crate::state::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    // === CONFIG + LISTENER ===
    let listener = init_config_and_bind()
        .await
        .map_err(anyhow::Error::msg)?;

    let config = get_cached_config();

    info!(
        "{} {} initialized on {}:{}",
        config.name,
        config.version,
        config.connection.ip,
        config.connection.port
    );

    // === CORPUS ===
    let dataset = config.dataset.clone();
    let store = tokio::task::spawn_blocking(move || load_store(&dataset)).await??;

    info!(
        "Corpus ready: {} rows, {} signals, {} activity labels",
        store.table.n_rows(),
        store.signal_metadata.len().saturating_sub(1),
        store.activity_labels.len()
    );

    let state = AppState::new(store);

    let app = Router::new()
        .merge(routes::info_routes::health_routes(state.clone()))
        .merge(routes::data_routes::data_routes(state.clone()))
        .merge(routes::job_routes::job_routes(state));

    axum::serve(listener, app).await?;

    Ok(())
}
