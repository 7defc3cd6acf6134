//! Null-close quality check.
//!
//! Advisory only: always passes, and warns when the null-close ratio inside
//! the trailing window exceeds `max_missing_ratio`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::Result;
use crate::prices::StorageGateway;
use crate::validation::model::{CheckName, ValidationConfig};
use crate::validation::traits::{CheckOutcome, QualityCheck, ValidationContext};

pub struct NullCloseCheck {
    storage: Arc<dyn StorageGateway>,
}

impl NullCloseCheck {
    pub fn new(storage: Arc<dyn StorageGateway>) -> Self {
        Self { storage }
    }

    /// Core decision, exposed for testing.
    pub fn evaluate(null_ratio: f64, config: &ValidationConfig) -> CheckOutcome {
        let percent = null_ratio * 100.0;
        let outcome = CheckOutcome::pass(format!("Null ratio: {:.2}%", percent));

        if null_ratio > config.max_missing_ratio {
            outcome.with_warning(format!("High null ratio: {:.2}%", percent))
        } else {
            outcome
        }
    }
}

#[async_trait]
impl QualityCheck for NullCloseCheck {
    fn name(&self) -> CheckName {
        CheckName::Quality
    }

    async fn run(&self, ctx: &ValidationContext) -> Result<CheckOutcome> {
        let ratio = self.storage.query_null_close_ratio(ctx.window_start()).await?;
        Ok(Self::evaluate(ratio, &ctx.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_ratio_warns_but_passes() {
        let outcome = NullCloseCheck::evaluate(0.15, &ValidationConfig::default());
        assert!(outcome.passed);
        assert_eq!(outcome.warning.as_deref(), Some("High null ratio: 15.00%"));
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_ratio_at_threshold_is_clean() {
        let outcome = NullCloseCheck::evaluate(0.1, &ValidationConfig::default());
        assert!(outcome.passed);
        assert!(outcome.warning.is_none());
    }
}
