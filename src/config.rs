use std::path::PathBuf;
use std::time::Duration;

use crate::download::{DEFAULT_API_URL, DEFAULT_TIMEOUT};
use crate::error::{EtlError, Result};

pub const DEFAULT_DATABASE: &str = "countries.db";

/// Resolved settings for one pipeline run
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: PathBuf,
    pub api_url: String,
    pub timeout: Duration,
    /// None selects the platform cache directory
    pub cache_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            cache_dir: None,
        }
    }
}

impl Settings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct SettingsBuilder {
    database: Option<PathBuf>,
    api_url: Option<String>,
    timeout_secs: Option<u64>,
    cache_dir: Option<PathBuf>,
}

impl SettingsBuilder {
    pub fn database(mut self, database: Option<PathBuf>) -> Self {
        self.database = database;
        self
    }

    pub fn api_url(mut self, api_url: Option<String>) -> Self {
        self.api_url = api_url;
        self
    }

    pub fn timeout_secs(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn cache_dir(mut self, cache_dir: Option<PathBuf>) -> Self {
        self.cache_dir = cache_dir;
        self
    }

    pub fn build(self) -> Result<Settings> {
        let defaults = Settings::default();

        let api_url = self.api_url.unwrap_or(defaults.api_url);
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(EtlError::Config(format!("API URL must be http(s): {}", api_url)));
        }

        let timeout = match self.timeout_secs {
            Some(0) => return Err(EtlError::Config("timeout must be at least 1 second".into())),
            Some(secs) => Duration::from_secs(secs),
            None => defaults.timeout,
        };

        Ok(Settings {
            database: self.database.unwrap_or(defaults.database),
            api_url,
            timeout,
            cache_dir: self.cache_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::builder().build().unwrap();
        assert_eq!(settings.database, PathBuf::from("countries.db"));
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert!(settings.cache_dir.is_none());
    }

    #[test]
    fn test_overrides_and_validation() {
        let settings = Settings::builder()
            .database(Some("out.db".into()))
            .timeout_secs(Some(30))
            .api_url(Some("http://localhost:8080/all".into()))
            .build()
            .unwrap();
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.api_url, "http://localhost:8080/all");

        assert!(Settings::builder().timeout_secs(Some(0)).build().is_err());
        assert!(Settings::builder().api_url(Some("ftp://x".into())).build().is_err());
    }
}
