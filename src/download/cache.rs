use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{info, warn};

use super::client::{parse_records, CountriesClient};
use crate::error::{EtlError, Result};
use crate::pipeline::RecordSource;

const SNAPSHOT_FILE: &str = "countries.json";

/// Stores the last successfully fetched raw payload
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let cache_dir = match custom_dir {
            Some(dir) => dir,
            None => default_cache_dir()?,
        };

        fs::create_dir_all(&cache_dir)?;

        Ok(Self { cache_dir })
    }

    /// Get the cache directory path
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.cache_dir.join(SNAPSHOT_FILE)
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot_path().exists()
    }

    /// Replace the cached snapshot via a temp file and rename
    pub fn store_snapshot(&self, body: &str) -> Result<PathBuf> {
        let path = self.snapshot_path();
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &path)?;
        Ok(path)
    }
}

/// Fetches over HTTP and keeps a copy of every successful response
pub struct CachingSource {
    client: CountriesClient,
    cache: CacheManager,
}

impl CachingSource {
    pub fn new(client: CountriesClient, cache: CacheManager) -> Self {
        Self { client, cache }
    }
}

impl RecordSource for CachingSource {
    fn fetch(&self) -> Result<Vec<Value>> {
        let text = self.client.fetch_text()?;
        let records = parse_records(&text)?;

        // Snapshot failures are not fatal to the run
        match self.cache.store_snapshot(&text) {
            Ok(path) => info!(path = %path.display(), "Cached raw snapshot"),
            Err(e) => warn!(error = %e, "Failed to cache raw snapshot"),
        }

        Ok(records)
    }
}

pub fn default_cache_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "countries-etl")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .ok_or_else(|| EtlError::Config("could not determine cache directory".to_string()))
}
