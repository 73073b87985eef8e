//! CLI entry point for the monthly Aadhaar aggregation job.
//!
//! Reads the enrolment, biometric and demographic CSV folders, aggregates them
//! per month and pincode, and writes one JSON document per month.

use aadhaar_monthly::analyzers::analyzer::run;
use aadhaar_monthly::config::PipelineConfig;
use anyhow::Result;
use clap::Parser;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "aadhaar_monthly")]
#[command(about = "Aggregate Aadhaar activity CSVs into monthly JSON per pincode", long_about = None)]
struct Cli {
    /// Directory containing "given dataset" and "external dataset"
    #[arg(value_name = "BASE_DIR", default_value = ".")]
    base_dir: PathBuf,

    /// Override the enrolment CSV directory
    #[arg(long)]
    enrolment_dir: Option<PathBuf>,

    /// Override the biometric update CSV directory
    #[arg(long)]
    biometric_dir: Option<PathBuf>,

    /// Override the demographic update CSV directory
    #[arg(long)]
    demographic_dir: Option<PathBuf>,

    /// Override the pincode directory CSV
    #[arg(long)]
    pincode_file: Option<PathBuf>,

    /// Override the directory monthly JSON files are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        let mut config = PipelineConfig::from_base_dir(&self.base_dir);
        if let Some(dir) = self.enrolment_dir {
            config.enrolment_dir = dir;
        }
        if let Some(dir) = self.biometric_dir {
            config.biometric_dir = dir;
        }
        if let Some(dir) = self.demographic_dir {
            config.demographic_dir = dir;
        }
        if let Some(file) = self.pincode_file {
            config.pincode_file = file;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        config
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/aadhaar_monthly.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("aadhaar_monthly.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let config = Cli::parse().into_config();
    info!(?config, "Starting monthly aggregation");

    let index = run(&config)?;
    info!(months = index.months.len(), "Monthly documents written");

    Ok(())
}
