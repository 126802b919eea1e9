use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pinmap_core::config::PipelineConfig;
use pinmap_core::layers::LayerSet;
use pinmap_core::loader::{load_records, DataSource};
use pinmap_core::pipeline::{report_failure, Pipeline};
use pinmap_core::PipelineError;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod export;

#[derive(Parser, Debug)]
#[command(author, version, about = "Geocode an address list into colored map layers", long_about = None)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct SourceArgs {
    /// Address list location, a file path or http(s) URL (overrides PINMAP_DATA_SOURCE)
    #[arg(long, global = true)]
    data: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load, geocode and place every address, then export the layers as GeoJSON
    Run(RunArgs),
    /// Load the address list and show which layer each record targets
    Inspect,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Directory the layer GeoJSON files are written to
    #[arg(long, default_value = "layers")]
    out: PathBuf,
    /// Geocode server root (overrides PINMAP_GEOCODER_URL)
    #[arg(long)]
    geocoder_url: Option<String>,
    /// Per-request timeout in seconds (overrides PINMAP_GEOCODE_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Run(args) => handle_run(cli.source, args).await,
        Command::Inspect => handle_inspect(cli.source).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<PipelineError>() {
                Some(pipeline_err) => report_failure(pipeline_err),
                None => tracing::error!("{err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn resolve_config(source: SourceArgs) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::from_env().map_err(PipelineError::from)?;
    if let Some(location) = source.data {
        config.data_source = DataSource::parse(&location);
    }
    Ok(config)
}

async fn handle_run(source: SourceArgs, args: RunArgs) -> Result<()> {
    let mut config = resolve_config(source)?;
    if let Some(url) = args.geocoder_url {
        config
            .set_geocoder_url("--geocoder-url", url)
            .map_err(PipelineError::from)?;
    }
    if let Some(secs) = args.timeout_secs {
        config.geocode_timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }

    let pipeline = Pipeline::from_config(&config)?;
    let mut layers = LayerSet::new();
    info!(
        source = %pipeline.source(),
        geocoder = %config.geocoder_url,
        "starting pipeline run"
    );

    let summary = pipeline.run(&mut layers).await?;
    let written = export::write_layers(&layers, &args.out)
        .await
        .context("failed to export layers")?;

    println!("{}", export::summary_table(&layers, &summary));
    for path in &written {
        println!("wrote {}", path.display());
    }
    info!(
        records = summary.records,
        placed = summary.placement.total(),
        "pipeline run finished"
    );
    Ok(())
}

async fn handle_inspect(source: SourceArgs) -> Result<()> {
    let config = resolve_config(source)?;
    let records = load_records(&config.data_source, &reqwest::Client::new())
        .await
        .map_err(PipelineError::from)?;

    println!("{}", export::records_table(&records));
    println!("{} records from {}", records.len(), config.data_source);
    Ok(())
}
