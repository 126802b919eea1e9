// crates/pinmap-core/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

/// Failure to fetch or parse the address list.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request for {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("address list is not well-formed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a single geocode request. Any one of these fails the whole batch.
#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("geocode request for '{address}' failed: {message}")]
    Http { address: String, message: String },

    #[error("geocoder rejected '{address}' (code {code}): {message}")]
    Service {
        address: String,
        code: i64,
        message: String,
    },

    #[error("geocoder response for '{address}' could not be decoded: {message}")]
    Decode { address: String, message: String },

    #[error("geocoder returned no candidates for '{address}'")]
    NoCandidates { address: String },
}

/// Failure while placing geocoded points into layers.
#[derive(Error, Debug)]
pub enum PlaceError {
    #[error("{records} records but {results} geocode results")]
    LengthMismatch { records: usize, results: usize },

    #[error("record {index} has a non-finite coordinate ({x}, {y})")]
    InvalidCoordinate { index: usize, x: f64, y: f64 },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable {name} has invalid value '{value}': {reason}")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("load failed: {0}")]
    Load(#[from] LoadError),

    #[error("geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),

    #[error("placement failed: {0}")]
    Place(#[from] PlaceError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
