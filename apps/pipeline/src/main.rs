mod config;
mod main_lib;
mod scheduler;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use config::Config;
use main_lib::{build_controller, exit_status, init_tracing, report};

#[derive(Parser)]
#[command(
    name = "eod-pipeline",
    about = "Ingest EOD prices for all active assets, then gate analytics on data quality"
)]
struct Cli {
    /// Run once and exit, even when a schedule is configured.
    #[arg(long, conflicts_with = "every")]
    once: bool,

    /// Repeat the run every SECS seconds (overrides EOD_SCHEDULE_INTERVAL_SECS).
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    every: Option<u64>,

    /// Days of history to request (overrides EOD_LOOKBACK_DAYS).
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    lookback_days: Option<u32>,

    /// SQLite database file (overrides EOD_DB_PATH).
    #[arg(long, value_name = "PATH")]
    db_path: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(days) = self.lookback_days {
            config.lookback_days = days;
        }
        if let Some(path) = &self.db_path {
            config.db_path = path.clone();
        }
        if let Some(secs) = self.every {
            config.schedule_every = Some(Duration::from_secs(secs));
        }
        if self.once {
            config.schedule_every = None;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            tracing::error!("Fatal error: {:#}", e);
            eprintln!("eod-pipeline: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let mut config = Config::from_env()?;
    cli.apply(&mut config);
    init_tracing(&config.log_format);

    let controller = build_controller(&config)?;

    match config.schedule_every {
        Some(every) => Ok(scheduler::run_every(&controller, every).await),
        None => {
            let result = controller.run().await;
            report(&result);
            Ok(exit_status(&result))
        }
    }
}
