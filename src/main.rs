//! CLI entry point for the tabular reporter.
//!
//! Provides subcommands for exploratory charts over any CSV, the smartphone
//! usage & stress report, and the weather statistics file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tabular_reporter::config::ReportConfig;
use tabular_reporter::pipelines::{RunSummary, explore, smartphone, weather};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "tabular_reporter")]
#[command(about = "Charts, reports and statistics from tabular data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exploratory charts and a descriptive summary for a CSV file
    Explore {
        /// Path to the CSV file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Directory for charts, summary.json and the bundled document
        #[arg(short, long, default_value = "charts")]
        out_dir: PathBuf,
    },
    /// Eight-page smartphone usage & stress report
    Report {
        /// JSON config file; absent fields keep their defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Dataset to read (overrides the config)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Document to write (overrides the config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory for the per-page SVG files (overrides the config)
        #[arg(long)]
        charts_dir: Option<PathBuf>,
    },
    /// Mean and median statistics for the built-in weather sample
    Weather {
        /// Text file to overwrite with the results
        #[arg(short, long, default_value = "weather_results.txt")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/tabular_reporter.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("tabular_reporter.log"));

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

    let cli = Cli::parse();

    match cli.command {
        Commands::Explore { input, out_dir } => {
            let summary = explore::run(&input, &out_dir)
                .with_context(|| format!("exploring {}", input.display()))?;
            report_skips(&summary);
        }
        Commands::Report {
            config,
            input,
            output,
            charts_dir,
        } => {
            let mut config = match config {
                Some(path) => ReportConfig::load(path)?,
                None => ReportConfig::default(),
            };
            if let Some(input) = input {
                config.input = input;
            }
            if let Some(output) = output {
                config.output = output;
            }
            if let Some(charts_dir) = charts_dir {
                config.charts_dir = charts_dir;
            }

            let summary = smartphone::run(&config).context("building smartphone report")?;
            report_skips(&summary);
        }
        Commands::Weather { output } => {
            let text = weather::run(&output)?;
            for line in text.lines() {
                info!("{line}");
            }
            info!(output = %output.display(), "Results saved");
        }
    }

    Ok(())
}

/// Logs what a run produced and which artifacts it left out.
fn report_skips(summary: &RunSummary) {
    if let Some(document) = &summary.document {
        info!(
            document = %document.display(),
            artifacts = summary.written.len(),
            "Run complete"
        );
    }
    for skipped in &summary.skipped {
        warn!(artifact = skipped.name, reason = ?skipped.reason, "Artifact not produced");
    }
}
