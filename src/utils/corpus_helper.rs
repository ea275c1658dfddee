use std::path::Path;
use tracing::{info, warn};

use opp_profiler::core::cache::{read_cache, write_cache};
use opp_profiler::core::loader::load_dataset;
use opp_profiler::{CorpusStore, ProfilerError, Result};

use crate::models::config_model::DatasetConfig;

/// Cache first; otherwise parse the raw folder and refresh the cache.
pub fn load_store(dataset: &DatasetConfig) -> Result<CorpusStore> {
    let cache_path = Path::new(&dataset.cache_path);

    if cache_path.exists() {
        match read_cache::<CorpusStore, _>(cache_path) {
            Ok((_, store)) => {
                info!("Corpus restored from cache: {} rows", store.table.n_rows());
                return Ok(store);
            }
            Err(e) => warn!("Ignoring unreadable cache {}: {}", cache_path.display(), e),
        }
    }

    let raw_dir = dataset.raw_dir.as_deref().ok_or_else(|| {
        ProfilerError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no cache at {} and no raw_dir configured", cache_path.display()),
        ))
    })?;

    let store = load_dataset(raw_dir)?;
    write_cache(cache_path, &store, dataset.compression)?;
    Ok(store)
}
