//! Asset coverage check.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::Result;
use crate::prices::StorageGateway;
use crate::validation::model::{CheckName, ValidationConfig};
use crate::validation::traits::{CheckOutcome, QualityCheck, ValidationContext};

/// Passes when at least `min_assets` assets are active.
pub struct AssetCoverageCheck {
    storage: Arc<dyn StorageGateway>,
}

impl AssetCoverageCheck {
    pub fn new(storage: Arc<dyn StorageGateway>) -> Self {
        Self { storage }
    }

    pub fn evaluate(active_assets: i64, config: &ValidationConfig) -> CheckOutcome {
        if active_assets >= config.min_assets {
            CheckOutcome::pass(format!("{} active assets found", active_assets))
        } else {
            CheckOutcome::fail(
                format!("Only {} active assets", active_assets),
                format!(
                    "Insufficient active assets: {}/{}",
                    active_assets, config.min_assets
                ),
            )
        }
    }
}

#[async_trait]
impl QualityCheck for AssetCoverageCheck {
    fn name(&self) -> CheckName {
        CheckName::AssetCoverage
    }

    async fn run(&self, ctx: &ValidationContext) -> Result<CheckOutcome> {
        let active_assets = self.storage.query_asset_count(true).await?;
        Ok(Self::evaluate(active_assets, &ctx.config))
    }
}
