// Error handling for the corpus profiler

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProfilerError>;

#[derive(Error, Debug)]
pub enum ProfilerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No recognized filter key among {0:?}")]
    InvalidFilterKey(Vec<String>),

    #[error("Cannot build a density profile from an empty sample")]
    EmptySample,

    #[error("Sample contains a non-finite value at position {0}")]
    NonFiniteSample(usize),

    #[error("Bin grid for range {range} exceeds {max} bins")]
    BinGridTooLarge { range: f64, max: usize },

    #[error("Bin grid over [{lo}, {hi}] has zero-width bins at f64 precision")]
    BinGridCollapsed { lo: f64, hi: f64 },

    #[error("No samples left after dropping missing values")]
    EmptyAfterCleaning,

    #[error("Profile type mismatch: {left} vs {right}")]
    TypeMismatch { left: String, right: String },

    #[error("Length mismatch: time has {time} rows, values have {values}")]
    LengthMismatch { time: usize, values: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Metadata describes {metadata} columns, table has {table}")]
    MisalignedMetadata { metadata: usize, table: usize },

    #[error("Invalid magic bytes: expected {expected:?}, got {got:?}")]
    InvalidMagic { expected: Vec<u8>, got: Vec<u8> },

    #[error("Unsupported version: {0}")]
    UnsupportedVersion(u8),

    #[error("Unsupported compression type: {0}")]
    UnsupportedCompression(u8),

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("Corrupted data: {0}")]
    CorruptedData(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
