//! ethnopath-digitizer - Traditional Knowledge Digitization
//!
//! Loads a corpus (the bundled sample plants unless `--input` names a JSON
//! file), runs it through the compliance gate and the 3-tier pipeline,
//! prints a summary, and exports the results as JSON.
//!
//! Exit status is non-zero only for a halted run, invalid configuration,
//! or an I/O failure. Rejected submissions are reported, not fatal.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ethnopath_common::config::{write_toml_config, ConfigResolver, LoggingConfig, TomlConfig};
use ethnopath_common::time::millis_to_duration;
use ethnopath_digitizer::config::DigitizerConfig;
use ethnopath_digitizer::corpus::{CorpusSource, JsonFileCorpus, SampleCorpus};
use ethnopath_digitizer::export::{JsonExporter, ResultSink, SummaryReport};
use ethnopath_digitizer::workflow::{DigitizationEvent, Pipeline};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for ethnopath-digitizer
#[derive(Parser, Debug)]
#[command(name = "ethnopath-digitizer")]
#[command(about = "Digitize publicly documented traditional plant knowledge")]
#[command(version)]
struct Args {
    /// Bootstrap config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON corpus file (bundled sample plants if omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Export path for the JSON results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Wall-clock budget per submission in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Skip the JSON export
    #[arg(long)]
    no_export: bool,

    /// Write the effective bootstrap config to this path and exit
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config first: it names the log level and log file
    let toml_config = load_bootstrap_config(args.config.as_deref(), std::io::stderr);
    init_tracing(&toml_config.logging)?;

    if let Some(path) = args.write_config {
        write_toml_config(&toml_config, &path)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Configuration written to: {}", path.display());
        return Ok(());
    }

    info!(
        "Starting ethnopath-digitizer v{} ({}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let mut config =
        DigitizerConfig::resolve(&toml_config).context("Invalid digitizer configuration")?;
    if let Some(output) = args.output {
        config.output_path = output;
    }
    if let Some(millis) = args.timeout_ms {
        config.pipeline.submission_timeout = Some(millis_to_duration(millis));
    }

    let corpus: Box<dyn CorpusSource> = match args.input {
        Some(path) => Box::new(JsonFileCorpus::new(path)),
        None => Box::new(SampleCorpus),
    };
    let submissions = corpus
        .load()
        .with_context(|| format!("Failed to load corpus from {}", corpus.name()))?;
    info!("Corpus: {} ({} submissions)", corpus.name(), submissions.len());

    let (event_tx, mut event_rx) = mpsc::channel(256);
    let progress = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                DigitizationEvent::SubmissionCompleted {
                    plant,
                    integrity_score,
                    incomplete_modalities,
                    ..
                } => info!(
                    plant = %plant,
                    incomplete_modalities,
                    "Digitized with integrity {:.1}%",
                    integrity_score * 100.0
                ),
                DigitizationEvent::SubmissionRejected { plant, reasons, .. } => {
                    info!(plant = %plant, "Rejected: {}", reasons.join(", "))
                }
                other => debug!(event = ?other, "Pipeline progress"),
            }
        }
    });

    let pipeline = Pipeline::with_events(config.pipeline.clone(), event_tx)
        .context("Failed to create pipeline")?;
    let run = pipeline
        .run(submissions)
        .await
        .context("Digitization run halted")?;

    // Dropping the pipeline closes the event channel
    drop(pipeline);
    if let Err(e) = progress.await {
        warn!("Progress reporter failed: {}", e);
    }

    println!("{}", SummaryReport::new(&run));

    if !args.no_export {
        let exporter = JsonExporter::new(&config.output_path);
        exporter
            .export(&run)
            .with_context(|| format!("Failed to export results to {}", exporter.path().display()))?;
        println!("Results saved to: {}", exporter.path().display());
    }

    Ok(())
}

/// Load the bootstrap config under a temporary subscriber writing to
/// `writer`, since the global one depends on the config's logging section
fn load_bootstrap_config<W>(cli_arg: Option<&Path>, writer: W) -> TomlConfig
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let bootstrap = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(bootstrap, || {
        ConfigResolver::new("digitizer").load_or_default(cli_arg)
    })
}

/// Initialize tracing: `RUST_LOG` wins over the configured level; a
/// configured log file replaces stderr output.
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Arc::new(file))
                    .with_ansi(false),
            )
        }
        None => None,
    };
    let stderr_layer = file_layer
        .is_none()
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}
