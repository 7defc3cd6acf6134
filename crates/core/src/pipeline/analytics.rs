use async_trait::async_trait;
use log::info;

use super::model::PipelineRun;
use crate::errors::Result;

/// Downstream stage that may only run on validated data.
#[async_trait]
pub trait AnalyticsTrigger: Send + Sync {
    /// Called once per run, after the quality gate passed.
    async fn on_validated(&self, run: &PipelineRun) -> Result<()>;
}

/// Trigger that only records the hand-off.
#[derive(Debug, Clone, Default)]
pub struct LoggingAnalyticsTrigger;

#[async_trait]
impl AnalyticsTrigger for LoggingAnalyticsTrigger {
    async fn on_validated(&self, run: &PipelineRun) -> Result<()> {
        let ingested = run.stats.as_ref().map(|s| s.successful).unwrap_or_default();
        info!(
            "Run {} validated ({} assets ingested); analytics may proceed",
            run.id, ingested
        );
        Ok(())
    }
}
