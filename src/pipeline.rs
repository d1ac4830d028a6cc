use serde::{Serialize, Serializer};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::Settings;
use crate::download::{parse_records, CacheManager, CachingSource, CountriesClient};
use crate::error::Result;
use crate::normalize::{normalize_countries, Diagnostic};
use crate::writer::{LoadStats, SchemaBuilder};

/// Upstream collaborator producing raw country records
pub trait RecordSource {
    fn fetch(&self) -> Result<Vec<Value>>;
}

/// Raw records from a JSON array on disk
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for FileSource {
    fn fetch(&self) -> Result<Vec<Value>> {
        let text = std::fs::read_to_string(&self.path)?;
        parse_records(&text)
    }
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub records: usize,
    /// Records skipped by the normalizer, in input order
    pub diagnostics: Vec<Diagnostic>,
    pub stats: LoadStats,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn dropped(&self) -> usize {
        self.diagnostics.len()
    }
}

fn serialize_secs<S: Serializer>(elapsed: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

/// Fetch, normalize and persist once.
///
/// A fetch failure aborts before the database is opened, so whatever an
/// earlier run stored stays untouched.
pub fn run_pipeline(source: &dyn RecordSource, db_path: &Path) -> Result<RunSummary> {
    let start = Instant::now();

    let records = source.fetch()?;
    info!(records = records.len(), "Fetched raw records");

    let normalized = normalize_countries(&records);
    if !normalized.diagnostics.is_empty() {
        warn!(
            dropped = normalized.diagnostics.len(),
            "Some country records were dropped"
        );
    }

    let mut builder = SchemaBuilder::open(db_path)?;
    let stats = builder.apply_schema(&normalized.relations)?;
    builder.finalize()?;

    let summary = RunSummary {
        records: records.len(),
        diagnostics: normalized.diagnostics,
        stats,
        elapsed: start.elapsed(),
    };
    info!(
        countries = summary.stats.countries,
        rows = summary.stats.total(),
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "Pipeline run complete"
    );
    Ok(summary)
}

/// Entry point for an external scheduler: one full run against the live API
pub fn run_once(settings: &Settings) -> Result<RunSummary> {
    let client = CountriesClient::new(settings.api_url.clone(), settings.timeout)?;
    let cache = CacheManager::new(settings.cache_dir.clone())?;
    let source = CachingSource::new(client, cache);
    run_pipeline(&source, &settings.database)
}
