//! Freshness check.
//!
//! Passes when the newest stored row is at most `max_staleness_hours` old.
//! The boundary is closed: exactly the limit passes.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::prices::StorageGateway;
use crate::validation::model::CheckName;
use crate::validation::traits::{CheckOutcome, QualityCheck, ValidationContext};

pub struct FreshnessCheck {
    storage: Arc<dyn StorageGateway>,
}

impl FreshnessCheck {
    pub fn new(storage: Arc<dyn StorageGateway>) -> Self {
        Self { storage }
    }

    /// Core decision, exposed for testing.
    pub fn evaluate(latest: Option<DateTime<Utc>>, ctx: &ValidationContext) -> CheckOutcome {
        let Some(latest) = latest else {
            return CheckOutcome::fail(
                "No data found in price history",
                "No data in price_history table",
            );
        };

        let age = ctx.now - latest;
        let age_hours = age.num_seconds() as f64 / 3600.0;

        if age <= ctx.config.max_staleness() {
            CheckOutcome::pass(format!("Latest data is {:.1} hours old", age_hours))
        } else {
            CheckOutcome::fail(
                format!("Data is {:.1} hours old", age_hours),
                format!("Stale data: {:.1} hours old", age_hours),
            )
        }
    }
}

#[async_trait]
impl QualityCheck for FreshnessCheck {
    fn name(&self) -> CheckName {
        CheckName::Freshness
    }

    async fn run(&self, ctx: &ValidationContext) -> Result<CheckOutcome> {
        let latest = self.storage.query_latest_timestamp().await?;
        Ok(Self::evaluate(latest, ctx))
    }
}
