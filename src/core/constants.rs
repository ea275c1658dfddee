// Dataset layout and cache format constants

/// Cache container magic and version.
pub const MAGIC: &[u8; 4] = b"OPPC";
pub const CACHE_VERSION: u8 = 1;

// Cache header: MAGIC(4) version(u8) comp(u8) created(f64) payload_len(u64)
pub const CACHE_HEADER_SIZE: usize = 4 + 1 + 1 + 8 + 8; // 22 bytes

// Compression codes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionType {
    None = 0,
    #[default]
    Zlib = 1,
    Lz4 = 2,
    Zstd = 3,
}

impl CompressionType {
    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            0 => Some(CompressionType::None),
            1 => Some(CompressionType::Zlib),
            2 => Some(CompressionType::Lz4),
            3 => Some(CompressionType::Zstd),
            _ => None,
        }
    }
}

/// Column index of the time axis, also the synthetic metadata row.
pub const TIME_COLUMN: usize = 0;
pub const TIME_TAG: &str = "Time";

/// Identifying metadata columns, in projection order.
pub const FILE_COLUMN: &str = "file";
pub const PID_COLUMN: &str = "PID";
pub const RUN_COLUMN: &str = "RunID";

/// Attributes understood by the column filter.
pub const SIGNAL_KEY: &str = "Signal";
pub const LOCATION_KEY: &str = "Location";
pub const SENSOR_KEY: &str = "Sensor";

/// Label code the dataset uses for "no annotation".
pub const NULL_LABEL_CODE: i64 = 0;

// Histogram grid: bins = max(ceil(sqrt(range) / BIN_STEP) * BIN_STEP, MIN_BINS)
pub const MIN_BINS: usize = 50;
pub const BIN_STEP: usize = 10;
/// Upper bound on the grid; reached at a range of 10^10.
pub const MAX_BINS: usize = 100_000;

/// Half-width of the grid used when every sample has the same value.
pub const DEGENERATE_HALF_WIDTH: f64 = 0.5;
