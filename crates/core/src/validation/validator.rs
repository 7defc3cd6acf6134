//! Quality validator.
//!
//! Runs every check in order against the same context and folds the results
//! into a [`ValidationReport`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{error, info, warn};

use super::checks::{AssetCoverageCheck, CompletenessCheck, FreshnessCheck, NullCloseCheck};
use super::model::{ValidationCheck, ValidationConfig, ValidationReport};
use super::traits::{QualityCheck, ValidationContext};
use crate::errors::Result;
use crate::prices::StorageGateway;

pub struct QualityValidator {
    checks: Vec<Box<dyn QualityCheck>>,
    config: ValidationConfig,
}

impl QualityValidator {
    /// Validator running the four built-in checks against `storage`.
    pub fn new(storage: Arc<dyn StorageGateway>, config: ValidationConfig) -> Result<Self> {
        config.validate()?;
        let checks: Vec<Box<dyn QualityCheck>> = vec![
            Box::new(CompletenessCheck::new(storage.clone())),
            Box::new(FreshnessCheck::new(storage.clone())),
            Box::new(NullCloseCheck::new(storage.clone())),
            Box::new(AssetCoverageCheck::new(storage)),
        ];
        Ok(Self { checks, config })
    }

    /// Validator running a custom set of checks.
    pub fn with_checks(
        checks: Vec<Box<dyn QualityCheck>>,
        config: ValidationConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self { checks, config })
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub async fn validate(&self) -> ValidationReport {
        self.validate_at(Utc::now()).await
    }

    /// Validate as of a fixed instant.
    pub async fn validate_at(&self, now: DateTime<Utc>) -> ValidationReport {
        let ctx = ValidationContext::with_timestamp(self.config.clone(), now);
        let mut report = ValidationReport::new();

        for check in &self.checks {
            let name = check.name();
            match check.run(&ctx).await {
                Ok(outcome) => {
                    if let Some(err) = outcome.error {
                        report.push_error(err);
                    }
                    if let Some(warning) = outcome.warning {
                        report.push_warning(warning);
                    }
                    report.insert_check(ValidationCheck {
                        name,
                        passed: outcome.passed,
                        details: outcome.details,
                    });
                }
                Err(e) => {
                    let message = format!("{} check error: {}", name.label(), e);
                    if name.is_critical() {
                        error!("{}", message);
                        report.push_error(message);
                    } else {
                        warn!("{}", message);
                        report.push_warning(message);
                    }
                    report.insert_check(ValidationCheck {
                        name,
                        passed: !name.is_critical(),
                        details: e.to_string(),
                    });
                }
            }
        }

        log_report(&report);
        report
    }
}

fn log_report(report: &ValidationReport) {
    for check in report.checks() {
        let status = if check.passed { "PASS" } else { "FAIL" };
        info!("{}: {} - {}", status, check.name, check.details);
    }
    for err in report.errors() {
        error!("Validation error: {}", err);
    }
    for warning in report.warnings() {
        warn!("Validation warning: {}", warning);
    }
    info!(
        "Overall validation: {}",
        if report.passed() { "PASSED" } else { "FAILED" }
    );
}
