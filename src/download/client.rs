use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::info;

use crate::error::{EtlError, Result};
use crate::pipeline::RecordSource;

/// REST Countries `all` endpoint
pub const DEFAULT_API_URL: &str = "https://restcountries.com/v3.1/all";

/// The endpoint caps `all` requests at ten fields
pub const FIELDS: &[&str] = &[
    "ccn3",
    "name",
    "flags",
    "population",
    "capital",
    "region",
    "languages",
    "area",
    "currencies",
    "gini",
];

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct CountriesClient {
    client: Client,
    base_url: String,
}

impl CountriesClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent("countries-etl")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Full request URL including the field selection
    pub fn url(&self) -> String {
        format!("{}?fields={}", self.base_url, FIELDS.join(","))
    }

    /// Fetch the raw response body
    pub fn fetch_text(&self) -> Result<String> {
        let url = self.url();
        let response = self.client.get(&url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(EtlError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let text = response.text()?;
        info!(bytes = text.len(), "Fetched country records");
        Ok(text)
    }
}

impl RecordSource for CountriesClient {
    fn fetch(&self) -> Result<Vec<Value>> {
        let text = self.fetch_text()?;
        parse_records(&text)
    }
}

/// Parse a response body into raw records; the body must be a JSON array
pub fn parse_records(text: &str) -> Result<Vec<Value>> {
    let records: Vec<Value> = serde_json::from_str(text)?;
    Ok(records)
}
