//! Load → geocode → place, with records and results passed explicitly
//! between stages.

use tracing::{error, info};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::geocoder::{geocode_all, ArcGisLocator, Geocoder};
use crate::layers::LayerSet;
use crate::loader::{load_records, DataSource};
use crate::placer::{place, Placement};
use crate::records::AddressRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub records: usize,
    pub placement: Placement,
}

pub struct Pipeline<G> {
    source: DataSource,
    geocoder: G,
    http: reqwest::Client,
}

impl Pipeline<ArcGisLocator> {
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let geocoder = ArcGisLocator::new(config.geocoder_url.clone(), config.geocode_timeout)?;
        Ok(Self::new(config.data_source.clone(), geocoder))
    }
}

impl<G: Geocoder> Pipeline<G> {
    pub fn new(source: DataSource, geocoder: G) -> Self {
        Self {
            source,
            geocoder,
            http: reqwest::Client::new(),
        }
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Runs every stage once, appending to `layers`. Running twice appends twice.
    pub async fn run(&self, layers: &mut LayerSet) -> Result<RunSummary> {
        let records = load_records(&self.source, &self.http).await?;
        let placement = geocode_and_place(&self.geocoder, &records, layers).await?;
        Ok(RunSummary {
            records: records.len(),
            placement,
        })
    }

    /// Like [`Pipeline::run`], but any failure is logged and swallowed.
    pub async fn run_logged(&self, layers: &mut LayerSet) -> Option<RunSummary> {
        match self.run(layers).await {
            Ok(summary) => Some(summary),
            Err(err) => {
                report_failure(&err);
                None
            }
        }
    }
}

/// Geocodes all records, then places the results. Nothing is placed unless
/// every request succeeded.
pub async fn geocode_and_place<G>(
    geocoder: &G,
    records: &[AddressRecord],
    layers: &mut LayerSet,
) -> Result<Placement>
where
    G: Geocoder + ?Sized,
{
    if records.is_empty() {
        info!("address list is empty; nothing to geocode");
        return Ok(Placement::default());
    }

    let results = geocode_all(geocoder, records).await?;
    Ok(place(records, &results, layers)?)
}

/// The single terminal handler for a failed run.
pub fn report_failure(err: &PipelineError) {
    let stage = match err {
        PipelineError::Load(_) => "load",
        PipelineError::Geocode(_) => "geocode",
        PipelineError::Place(_) => "place",
        PipelineError::Config(_) => "config",
    };
    error!(stage, error = %err, "pipeline run failed");
}
