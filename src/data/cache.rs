//! Dataset Cache Module
//! Read-through cache of loaded datasets keyed by (source path, row limit).

use crate::data::loader::{DataLoader, Dataset, LoaderError};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

static GLOBAL_CACHE: LazyLock<DatasetCache> = LazyLock::new(DatasetCache::new);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    source: PathBuf,
    max_rows: usize,
}

/// Loads each distinct (source, row limit) pair exactly once.
///
/// Entries are never invalidated; failed loads are not cached.
#[derive(Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<CacheKey, Arc<Dataset>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset, loading it on first request.
    pub fn get_or_load(&self, path: &Path, max_rows: usize) -> Result<Arc<Dataset>, LoaderError> {
        let key = CacheKey {
            source: path.to_path_buf(),
            max_rows,
        };

        // Held across the load so concurrent callers never read the file twice.
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(dataset) = entries.get(&key) {
            debug!("Cache hit for {} (max_rows={max_rows})", path.display());
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(DataLoader::load_csv(path, max_rows)?);
        entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Number of cached datasets.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Load through the process-wide cache.
pub fn load(path: impl AsRef<Path>, max_rows: usize) -> Result<Arc<Dataset>, LoaderError> {
    GLOBAL_CACHE.get_or_load(path.as_ref(), max_rows)
}
