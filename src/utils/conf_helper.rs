use tokio::fs;
use std::sync::OnceLock;
use tracing::info;
use crate::models::config_model::ProfilerConfig;
use tokio::net::TcpListener;

static CONFIG_CACHE: OnceLock<ProfilerConfig> = OnceLock::new();

const DEFAULT_CONFIG_PATH: &str = "profiler.json";
const CONFIG_ENV: &str = "PROFILER_CONFIG";

pub fn config_path() -> String {
    std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

pub async fn init_config_and_bind() -> Result<TcpListener, String> {
    let file_path = config_path();

    let data = fs::read_to_string(&file_path)
        .await
        .map_err(|e| format!("File read Error: {e} {file_path}"))?;

    let mut config: ProfilerConfig = serde_json::from_str(&data)
        .map_err(|e| format!("JSON Parse Error: {e}"))?;

    let bind_addr = format!(
        "{}:{}",
        config.connection.ip,
        config.connection.port
    );

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("Bind failed: {e}"))?;

    // port 0 asks the OS for a free one
    let actual_port = listener
        .local_addr()
        .map_err(|e| format!("Addr error: {e}"))?
        .port();

    config.connection.port = actual_port;

    CONFIG_CACHE
        .set(config)
        .map_err(|_| "Config already initialized".to_string())?;

    info!("Config {} initialized, listening on port {}", file_path, actual_port);

    Ok(listener)
}

pub fn get_cached_config() -> &'static ProfilerConfig {
    CONFIG_CACHE.get().expect("Config not initialized")
}
