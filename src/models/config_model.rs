use opp_profiler::core::constants::CompressionType;
use opp_profiler::DriverConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilerConfig {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    pub connection: Connection,
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub profiling: DriverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub ip: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Folder with column_names.txt, label_legend.txt and the .dat sessions.
    #[serde(default)]
    pub raw_dir: Option<String>,
    pub cache_path: String,
    #[serde(default)]
    pub compression: CompressionType,
    pub results_dir: String,
}
