use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use eodgate_core::{
    FetchStatus, IngestionOrchestrator, LoggingAnalyticsTrigger, PipelineController, PipelineError,
    PipelineFailure, PipelineOutcome, QualityValidator, RunSettings,
};
use eodgate_market_data::YahooProvider;
use eodgate_storage_sqlite::{self as storage, AssetRepository, PriceRepository};

use crate::config::Config;

/// Process exit status for a run: 0 passed, 1 blocked by validation, 2 fatal.
pub fn exit_status(result: &Result<PipelineOutcome, PipelineError>) -> u8 {
    match result {
        Ok(outcome) if outcome.success => 0,
        Ok(outcome) => match outcome.failure() {
            Some(PipelineFailure::ValidationFailed) => 1,
            _ => 2,
        },
        Err(_) => 2,
    }
}

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_controller(config: &Config) -> anyhow::Result<PipelineController> {
    let (pool, writer) = storage::open(&config.db_path)?;
    tracing::info!("Database path in use: {}", config.db_path);

    let assets = Arc::new(AssetRepository::new(Arc::clone(&pool), writer.clone()));
    let prices = Arc::new(PriceRepository::new(pool, writer));

    let rate_limit = config.rate_limit();
    tracing::info!(
        min_delay_secs = rate_limit.min_delay.as_secs_f64(),
        "Rate limiting Yahoo requests"
    );
    let source = Arc::new(YahooProvider::new(rate_limit)?);

    let orchestrator =
        IngestionOrchestrator::new(source, prices.clone(), config.ingestion.clone());
    let validator = QualityValidator::new(prices, config.validation.clone())?;

    Ok(PipelineController::new(
        assets,
        orchestrator,
        validator,
        Arc::new(LoggingAnalyticsTrigger),
        RunSettings {
            lookback_days: config.lookback_days,
            interval: config.interval,
        },
    ))
}

/// Emit the run summary as structured fields.
pub fn report(result: &Result<PipelineOutcome, PipelineError>) {
    match result {
        Ok(outcome) => {
            let stats = outcome.stats.clone().unwrap_or_default();
            let (errors, warnings) = outcome
                .validation
                .as_ref()
                .map(|v| (v.errors().len(), v.warnings().len()))
                .unwrap_or_default();
            let failure = outcome.failure().map(|f| f.to_string()).unwrap_or_default();

            if outcome.success {
                tracing::info!(
                    run_id = %outcome.run.id,
                    status = %outcome.run.status,
                    total = stats.total_assets,
                    successful = stats.successful,
                    failed = stats.failed,
                    skipped = stats.skipped,
                    records = stats.total_records,
                    validation_warnings = warnings,
                    "Pipeline completed successfully"
                );
            } else {
                tracing::error!(
                    run_id = %outcome.run.id,
                    status = %outcome.run.status,
                    failure = %failure,
                    total = stats.total_assets,
                    successful = stats.successful,
                    failed = stats.failed,
                    skipped = stats.skipped,
                    validation_errors = errors,
                    validation_warnings = warnings,
                    "Pipeline failed"
                );
            }

            if let Some(validation) = &outcome.validation {
                for error in validation.errors() {
                    tracing::error!(run_id = %outcome.run.id, "Validation error: {}", error);
                }
                for warning in validation.warnings() {
                    tracing::warn!(run_id = %outcome.run.id, "Validation warning: {}", warning);
                }
            }
            let failures = outcome
                .outcomes
                .iter()
                .filter(|o| o.status == FetchStatus::Failed);
            for failed in failures {
                tracing::debug!(symbol = %failed.symbol, "Fetch failed: {}", failed.detail);
            }
        }
        Err(e) => tracing::warn!("Pipeline did not run: {}", e),
    }
}
