//! Fixed-interval scheduler for recurring pipeline runs.

use std::future::Future;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use eodgate_core::{PipelineController, PipelineError};

use crate::main_lib::{exit_status, report};

/// Run the pipeline every `every` until ctrl-c. The first run starts
/// immediately. Returns the exit status of the last completed run.
pub async fn run_every(controller: &PipelineController, every: Duration) -> u8 {
    run_until(controller, every, tokio::signal::ctrl_c()).await
}

/// Run the pipeline every `every` until `shutdown` resolves.
///
/// `shutdown` is polled while waiting for the next tick and while a run is
/// in flight. A run cut short is dropped, which leaves the controller
/// `Failed` and ready for the next invocation.
pub async fn run_until<F>(controller: &PipelineController, every: Duration, shutdown: F) -> u8
where
    F: Future,
{
    info!("Pipeline scheduler started ({}s interval)", every.as_secs());

    let mut ticker = interval(every);
    // A run that overruns its slot does not trigger a burst of catch-up runs
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_status = 0;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping scheduler");
                return last_status;
            }
        }

        tokio::select! {
            status = run_scheduled(controller) => {
                if let Some(status) = status {
                    last_status = status;
                }
            }
            _ = &mut shutdown => {
                warn!("Shutdown requested during a run, abandoning it");
                return last_status;
            }
        }
    }
}

/// One tick. `None` when the controller declined to start.
async fn run_scheduled(controller: &PipelineController) -> Option<u8> {
    let result = controller.run().await;
    match &result {
        Err(PipelineError::Paused) => {
            debug!("Scheduled run skipped: pipeline is paused");
            None
        }
        Err(PipelineError::RunInProgress(status)) => {
            debug!("Scheduled run skipped: previous run still {}", status);
            None
        }
        _ => {
            report(&result);
            Some(exit_status(&result))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use eodgate_core::{
        Asset, AssetDirectory, IngestionConfig, IngestionOrchestrator, LoggingAnalyticsTrigger,
        PipelineFailure, PipelineStatus, PriceRecord, QualityValidator, RunSettings,
        StorageGateway, ValidationConfig,
    };
    use eodgate_market_data::{BatchFetch, Interval, MarketDataError, MarketDataSource};

    /// Source whose requests never complete.
    struct HangingSource;

    #[async_trait]
    impl MarketDataSource for HangingSource {
        fn id(&self) -> &'static str {
            "hanging"
        }

        async fn fetch_batch(
            &self,
            _symbols: &[String],
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
            _interval: Interval,
        ) -> Result<BatchFetch, MarketDataError> {
            std::future::pending().await
        }
    }

    /// One active asset and an empty price store.
    struct OneAssetStore;

    #[async_trait]
    impl AssetDirectory for OneAssetStore {
        async fn list_active(&self) -> eodgate_core::Result<Vec<Asset>> {
            Ok(vec![Asset::new("AAPL")])
        }
    }

    #[async_trait]
    impl StorageGateway for OneAssetStore {
        async fn query_asset_count(&self, _active: bool) -> eodgate_core::Result<i64> {
            Ok(1)
        }

        async fn query_record_count(&self, _since: DateTime<Utc>) -> eodgate_core::Result<i64> {
            Ok(0)
        }

        async fn query_latest_timestamp(&self) -> eodgate_core::Result<Option<DateTime<Utc>>> {
            Ok(None)
        }

        async fn query_null_close_ratio(&self, _since: DateTime<Utc>) -> eodgate_core::Result<f64> {
            Ok(0.0)
        }

        async fn upsert_price_records(&self, records: &[PriceRecord]) -> eodgate_core::Result<usize> {
            Ok(records.len())
        }
    }

    fn hanging_controller() -> PipelineController {
        let store = Arc::new(OneAssetStore);
        let orchestrator = IngestionOrchestrator::new(
            Arc::new(HangingSource),
            store.clone(),
            IngestionConfig::default(),
        );
        let validator = QualityValidator::new(store.clone(), ValidationConfig::default()).unwrap();
        PipelineController::new(
            store,
            orchestrator,
            validator,
            Arc::new(LoggingAnalyticsTrigger),
            RunSettings::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_run_stops_scheduler() {
        let controller = hanging_controller();

        let shutdown = tokio::time::sleep(Duration::from_secs(5));
        let status = run_until(&controller, Duration::from_secs(3600), shutdown).await;

        assert_eq!(status, 0);
        assert_eq!(controller.status(), PipelineStatus::Failed);
        assert_eq!(
            controller.last_run().unwrap().failure,
            Some(PipelineFailure::Interrupted)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_while_paused_stops_scheduler() {
        let controller = hanging_controller();
        controller.pause().unwrap();

        let shutdown = tokio::time::sleep(Duration::from_secs(5));
        let status = run_until(&controller, Duration::from_secs(1), shutdown).await;

        assert_eq!(status, 0);
        assert_eq!(controller.status(), PipelineStatus::Paused);
        assert!(controller.last_run().is_none());
    }
}
