//! Completeness check.
//!
//! Expected rows are `min(active_assets, min_assets) * min_data_points`; the
//! check passes when the rows stored inside the trailing window reach
//! `expected * completeness_tolerance`.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use crate::errors::Result;
use crate::prices::StorageGateway;
use crate::validation::model::{CheckName, ValidationConfig};
use crate::validation::traits::{CheckOutcome, QualityCheck, ValidationContext};

pub struct CompletenessCheck {
    storage: Arc<dyn StorageGateway>,
}

impl CompletenessCheck {
    pub fn new(storage: Arc<dyn StorageGateway>) -> Self {
        Self { storage }
    }

    /// Core decision, exposed for testing.
    pub fn evaluate(observed: i64, active_assets: i64, config: &ValidationConfig) -> CheckOutcome {
        let expected = active_assets.min(config.min_assets).max(0) * config.min_data_points;
        let threshold = expected as f64 * config.completeness_tolerance;

        if observed as f64 >= threshold {
            CheckOutcome::pass(format!("{} recent records found", observed))
        } else {
            CheckOutcome::fail(
                format!(
                    "Only {} records found (expected at least {:.0})",
                    observed, threshold
                ),
                format!("Insufficient data points: {}", observed),
            )
        }
    }
}

#[async_trait]
impl QualityCheck for CompletenessCheck {
    fn name(&self) -> CheckName {
        CheckName::Completeness
    }

    async fn run(&self, ctx: &ValidationContext) -> Result<CheckOutcome> {
        let observed = self.storage.query_record_count(ctx.window_start()).await?;
        let active_assets = self.storage.query_asset_count(true).await?;
        debug!(
            "Completeness: {} records since {} across {} active assets",
            observed,
            ctx.window_start(),
            active_assets
        );
        Ok(Self::evaluate(observed, active_assets, &ctx.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_capped_by_min_assets() {
        let config = ValidationConfig::default();
        // 120 active assets, capped at 50 -> 250 expected, 200 required
        assert!(CompletenessCheck::evaluate(200, 120, &config).passed);
        assert!(!CompletenessCheck::evaluate(199, 120, &config).passed);
    }

    #[test]
    fn test_small_universe_scales_expectation() {
        let config = ValidationConfig::default();
        // 10 active assets -> 50 expected, 40 required
        assert!(CompletenessCheck::evaluate(40, 10, &config).passed);

        let outcome = CompletenessCheck::evaluate(39, 10, &config);
        assert!(!outcome.passed);
        assert_eq!(outcome.error.as_deref(), Some("Insufficient data points: 39"));
    }
}
