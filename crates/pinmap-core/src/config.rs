use std::time::Duration;

use crate::error::ConfigError;
use crate::geocoder::DEFAULT_GEOCODER_URL;
use crate::loader::DataSource;

pub const DATA_SOURCE_VAR: &str = "PINMAP_DATA_SOURCE";
pub const GEOCODER_URL_VAR: &str = "PINMAP_GEOCODER_URL";
pub const GEOCODE_TIMEOUT_VAR: &str = "PINMAP_GEOCODE_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub data_source: DataSource,
    pub geocoder_url: String,
    /// Per-request geocode timeout. `None` waits indefinitely.
    pub geocode_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_source: DataSource::default(),
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            geocode_timeout: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable lookup. Unset or empty
    /// variables fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(location) = get(DATA_SOURCE_VAR) {
            config.data_source = DataSource::parse(location.trim());
        }
        if let Some(url) = get(GEOCODER_URL_VAR) {
            config.set_geocoder_url(GEOCODER_URL_VAR, url)?;
        }
        if let Some(raw) = get(GEOCODE_TIMEOUT_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidVar {
                    name: GEOCODE_TIMEOUT_VAR,
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
            config.geocode_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Replaces the geocoder root; `origin` names the setting in the error.
    pub fn set_geocoder_url(
        &mut self,
        origin: &'static str,
        url: impl Into<String>,
    ) -> Result<(), ConfigError> {
        let url = url.into();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::InvalidVar {
                name: origin,
                value: url,
                reason: "expected an http(s) URL".to_string(),
            });
        }
        self.geocoder_url = url;
        Ok(())
    }
}
