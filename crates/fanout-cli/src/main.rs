//! fanout - run a fixed set of HTTP workers concurrently and wait for all of them.
//!
//! ```text
//! main() -> resolve_config() -> FanOutRunner::run() -> RunReport -> exit code
//! ```
//!
//! Exit codes: 0 when every worker completed, 1 when any worker failed,
//! 2 when the run could not be set up.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use fanout_core::{FanOutRunner, FanoutConfig, RunReport, WorkerOutcome};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Every worker completed its full count.
const EXIT_OK: u8 = 0;
/// At least one worker failed or panicked.
const EXIT_WORKER_FAILED: u8 = 1;
/// Config, validation or client setup failed; no run happened.
const EXIT_SETUP_FAILED: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "fanout")]
#[command(about = "Issue repeated GET requests from concurrent workers and join on all of them")]
struct Cli {
    /// TOML config file; built-in defaults are used when omitted
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Number of ticks the main flow emits while workers run (0 disables)
    #[arg(long)]
    ticks: Option<u32>,

    /// Interval between ticks in milliseconds
    #[arg(long)]
    tick_interval_ms: Option<u64>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print the final report as JSON on stdout
    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

/// File (or defaults) first, then command-line overrides.
fn resolve_config(cli: &Cli) -> Result<FanoutConfig> {
    let mut config = match &cli.config {
        Some(path) => FanoutConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => FanoutConfig::default(),
    };

    if let Some(ticks) = cli.ticks {
        config.ticker.ticks = ticks;
    }
    if let Some(interval) = cli.tick_interval_ms {
        config.ticker.interval_ms = interval;
    }
    if let Some(timeout) = cli.timeout_ms {
        config.request_timeout_ms = Some(timeout);
    }
    Ok(config)
}

fn log_summary(report: &RunReport) {
    for w in &report.workers {
        match &w.outcome {
            WorkerOutcome::Completed => tracing::info!(
                worker = %w.worker,
                name = %w.name,
                calls = w.completed,
                last_status = ?w.last_status,
                elapsed_ms = w.elapsed().num_milliseconds(),
                "completed"
            ),
            WorkerOutcome::Failed { iteration, error } => tracing::error!(
                worker = %w.worker,
                name = %w.name,
                iteration,
                %error,
                "failed"
            ),
            WorkerOutcome::Panicked { message } => tracing::error!(
                worker = %w.worker,
                name = %w.name,
                %message,
                "panicked"
            ),
        }
    }
}

async fn run(config: &FanoutConfig, json: bool) -> Result<RunReport> {
    let runner = FanOutRunner::from_config(config).context("setting up run")?;

    let report = runner.run().await;
    log_summary(&report);

    if json {
        let json = serde_json::to_string_pretty(&report).context("serializing report")?;
        println!("{json}");
    }
    Ok(report)
}

/// Map the result of a run onto the process exit status.
fn exit_status(outcome: &Result<RunReport>) -> u8 {
    match outcome {
        Ok(report) if report.is_success() => EXIT_OK,
        Ok(_) => EXIT_WORKER_FAILED,
        Err(_) => EXIT_SETUP_FAILED,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let outcome = match resolve_config(&cli) {
        Ok(config) => run(&config, cli.json).await,
        Err(err) => Err(err),
    };
    if let Err(err) = &outcome {
        tracing::error!("{err:#}");
    }
    ExitCode::from(exit_status(&outcome))
}
