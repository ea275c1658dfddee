// Opportunity corpus profiler
// Query engine and signal profiling over a consolidated activity dataset

pub mod core;

// Re-export main types
pub use crate::core::error::{ProfilerError, Result};
pub use crate::core::store::CorpusStore;
pub use crate::core::view::{SelectionView, ColumnMap};
pub use crate::core::filter::{ColumnFilter, LabelFilter, RunFilter, ValueSet};
pub use crate::core::format::{ActivityLabel, LabelClass, SignalMetadata};
pub use crate::core::density::{DensityProfile, ProfileKind};
pub use crate::core::series::SignalSeries;
pub use crate::core::driver::{DriverConfig, ProfileIndex, ProfilingDriver};
