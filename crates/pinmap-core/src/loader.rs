use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::LoadError;
use crate::records::AddressRecord;

pub const DEFAULT_DATA_PATH: &str = "./data/data.json";

/// Where the address list lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    /// Treats `http://` and `https://` locations as URLs and everything else as a path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            DataSource::Url(location.to_string())
        } else {
            DataSource::File(PathBuf::from(location))
        }
    }
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::File(PathBuf::from(DEFAULT_DATA_PATH))
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => f.write_str(url),
        }
    }
}

/// Fetches and parses the whole address list. Nothing is returned unless the
/// entire document parses.
pub async fn load_records(
    source: &DataSource,
    http: &reqwest::Client,
) -> Result<Vec<AddressRecord>, LoadError> {
    let bytes = match source {
        DataSource::File(path) => tokio::fs::read(path).await.map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?,
        DataSource::Url(url) => fetch(url, http).await?,
    };
    debug!(source = %source, bytes = bytes.len(), "address list fetched");

    let records = parse_records(&bytes)?;
    info!(source = %source, records = records.len(), "address list loaded");
    Ok(records)
}

pub fn parse_records(bytes: &[u8]) -> Result<Vec<AddressRecord>, LoadError> {
    Ok(serde_json::from_slice(bytes)?)
}

async fn fetch(url: &str, http: &reqwest::Client) -> Result<Vec<u8>, LoadError> {
    let http_err = |message: String| LoadError::Http {
        url: url.to_string(),
        message,
    };

    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| http_err(e.to_string()))?;

    if !response.status().is_success() {
        return Err(http_err(format!("HTTP {}", response.status())));
    }

    response
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| http_err(e.to_string()))
}
