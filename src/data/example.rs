//! The bundled example dataset and its process-wide cache.
//!
//! The cache is the only state that outlives a pipeline run: once fetched,
//! the example table is reused until the entry is invalidated explicitly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::Lazy;

use super::error::LoadError;
use super::loader;
use super::model::Table;

pub const EXAMPLE_DATASET_URL: &str =
    "https://github.com/patilmanoj19/eda-app-v1/raw/main/Titanic-Dataset.csv";

static EXAMPLE_CACHE: Lazy<DatasetCache> = Lazy::new(DatasetCache::default);

/// The process-wide cache used for the example dataset.
pub fn cache() -> &'static DatasetCache {
    &EXAMPLE_CACHE
}

/// Fetch (or reuse) the example dataset at `url`.
pub fn load_example(url: &str) -> Result<Arc<Table>, LoadError> {
    cache().get_or_fetch(url, http_get)
}

/// Parsed tables keyed by source URL.
#[derive(Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<String, Arc<Table>>>,
}

impl DatasetCache {
    /// Return the cached table for `url`, fetching and parsing it on a miss.
    /// Failed fetches are not cached.
    pub fn get_or_fetch<F>(&self, url: &str, fetch: F) -> Result<Arc<Table>, LoadError>
    where
        F: FnOnce(&str) -> Result<Vec<u8>, LoadError>,
    {
        if let Some(table) = self.lock().get(url) {
            log::debug!("Example cache hit for {url}");
            return Ok(Arc::clone(table));
        }

        log::info!("Fetching example dataset from {url}");
        let bytes = fetch(url)?;
        let table = Arc::new(loader::load_csv(&bytes)?);
        log::info!(
            "Cached example '{}': {} rows x {} columns",
            file_name_from_url(url),
            table.row_count(),
            table.column_count()
        );

        self.lock().insert(url.to_string(), Arc::clone(&table));
        Ok(table)
    }

    #[cfg(test)]
    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains_key(url)
    }

    /// Drop one entry so the next request refetches it.
    pub fn invalidate(&self, url: &str) -> bool {
        let removed = self.lock().remove(url).is_some();
        if removed {
            log::info!("Invalidated cached dataset {url}");
        }
        removed
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Table>>> {
        // A panic while holding the lock leaves the map itself intact.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Last path segment of a URL, used as the dataset's display name.
pub fn file_name_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("example.csv")
        .to_string()
}

fn http_get(url: &str) -> Result<Vec<u8>, LoadError> {
    let fetch_error = |e: reqwest::Error| LoadError::Fetch {
        url: url.to_string(),
        cause: e.to_string(),
    };
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(fetch_error)?;
    let bytes = response.bytes().map_err(fetch_error)?;
    Ok(bytes.to_vec())
}
