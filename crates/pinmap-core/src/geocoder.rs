//! Geocoding boundary and the concurrent fan-out over an address list.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, GeocodeError};
use crate::records::AddressRecord;

pub const DEFAULT_GEOCODER_URL: &str =
    "https://geocode.arcgis.com/arcgis/rest/services/World/GeocodeServer";

/// WGS84; the layers are declared in this reference.
pub const OUTPUT_WKID: u32 = 4326;

/// One location proposed by the geocoding service for an address.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub address: String,
    pub x: f64,
    pub y: f64,
    pub score: f64,
    pub attributes: Map<String, Value>,
}

/// The candidate the pipeline keeps for a record.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub x: f64,
    pub y: f64,
    pub matched_address: String,
}

impl From<Candidate> for GeocodeResult {
    fn from(candidate: Candidate) -> Self {
        Self {
            x: candidate.x,
            y: candidate.y,
            matched_address: candidate.address,
        }
    }
}

/// Resolves a free-form address to candidate locations, best match first.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Vec<Candidate>, GeocodeError>;
}

/// Geocodes every record concurrently and waits for all of them.
///
/// Result `i` belongs to record `i`. The first failing request fails the whole
/// batch and no results are returned. A record with no candidates counts as a
/// failure.
pub async fn geocode_all<G>(
    geocoder: &G,
    records: &[AddressRecord],
) -> Result<Vec<GeocodeResult>, GeocodeError>
where
    G: Geocoder + ?Sized,
{
    info!(requests = records.len(), "geocoding address list");

    let requests = records.iter().enumerate().map(|(index, record)| async move {
        let candidates = geocoder.geocode(&record.address).await?;
        debug!(
            index,
            address = %record.address,
            candidates = candidates.len(),
            "geocode request settled"
        );
        candidates
            .into_iter()
            .next()
            .map(GeocodeResult::from)
            .ok_or_else(|| GeocodeError::NoCandidates {
                address: record.address.clone(),
            })
    });

    try_join_all(requests).await
}

/// Client for an ArcGIS `GeocodeServer` (`findAddressCandidates`).
#[derive(Debug, Clone)]
pub struct ArcGisLocator {
    http: reqwest::Client,
    base_url: String,
}

impl ArcGisLocator {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn candidates_url(&self) -> String {
        format!("{}/findAddressCandidates", self.base_url)
    }

    fn request(&self, address: &str) -> reqwest::RequestBuilder {
        let wkid = OUTPUT_WKID.to_string();
        self.http.get(self.candidates_url()).query(&[
            ("SingleLine", address),
            ("outFields", "*"),
            ("outSR", wkid.as_str()),
            ("f", "json"),
        ])
    }
}

#[async_trait]
impl Geocoder for ArcGisLocator {
    async fn geocode(&self, address: &str) -> Result<Vec<Candidate>, GeocodeError> {
        let http_err = |message: String| GeocodeError::Http {
            address: address.to_string(),
            message,
        };

        let response = self
            .request(address)
            .send()
            .await
            .map_err(|e| {
                warn!(
                    address,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "geocode request failed"
                );
                http_err(e.to_string())
            })?;

        if !response.status().is_success() {
            warn!(
                address,
                status = response.status().as_u16(),
                "geocoder HTTP error status"
            );
            return Err(http_err(format!("HTTP {}", response.status())));
        }

        let body = response.bytes().await.map_err(|e| http_err(e.to_string()))?;
        parse_candidates(address, &body)
    }
}

#[derive(Deserialize)]
struct CandidatesResponse {
    #[serde(default)]
    candidates: Vec<RawCandidate>,
    error: Option<ServiceError>,
}

#[derive(Deserialize)]
struct RawCandidate {
    address: String,
    location: RawLocation,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    attributes: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawLocation {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Decodes a `findAddressCandidates` JSON body. The service reports failures
/// as an `error` object inside a successful HTTP response.
pub fn parse_candidates(address: &str, body: &[u8]) -> Result<Vec<Candidate>, GeocodeError> {
    let response: CandidatesResponse =
        serde_json::from_slice(body).map_err(|e| GeocodeError::Decode {
            address: address.to_string(),
            message: e.to_string(),
        })?;

    if let Some(error) = response.error {
        warn!(
            address,
            code = error.code,
            message = %error.message,
            "geocoder rejected request"
        );
        return Err(GeocodeError::Service {
            address: address.to_string(),
            code: error.code,
            message: error.message,
        });
    }

    Ok(response
        .candidates
        .into_iter()
        .map(|raw| Candidate {
            address: raw.address,
            x: raw.location.x,
            y: raw.location.y,
            score: raw.score,
            attributes: raw.attributes,
        })
        .collect())
}
