//! Validation domain models.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize, Serializer};

use crate::constants::{
    COMPLETENESS_TOLERANCE, MAX_MISSING_RATIO, MAX_STALENESS_HOURS, MIN_ASSETS_REQUIRED,
    MIN_DATA_POINTS_REQUIRED, TRAILING_WINDOW_DAYS,
};
use crate::errors::{Error, Result};

// =============================================================================
// Check Name
// =============================================================================

/// The four named checks, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckName {
    Completeness,
    Freshness,
    Quality,
    AssetCoverage,
}

impl CheckName {
    pub const ALL: [CheckName; 4] = [
        CheckName::Completeness,
        CheckName::Freshness,
        CheckName::Quality,
        CheckName::AssetCoverage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckName::Completeness => "completeness",
            CheckName::Freshness => "freshness",
            CheckName::Quality => "quality",
            CheckName::AssetCoverage => "assetCoverage",
        }
    }

    /// Human-readable label used in error and warning messages.
    pub fn label(&self) -> &'static str {
        match self {
            CheckName::Completeness => "Completeness",
            CheckName::Freshness => "Freshness",
            CheckName::Quality => "Quality",
            CheckName::AssetCoverage => "Asset coverage",
        }
    }

    /// Whether this check contributes to the aggregate verdict.
    /// `quality` is advisory only.
    pub fn is_critical(&self) -> bool {
        !matches!(self, CheckName::Quality)
    }
}

impl fmt::Display for CheckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Validation Check / Report
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationCheck {
    pub name: CheckName,
    pub passed: bool,
    pub details: String,
}

/// Result of one validation pass.
///
/// `passed` is derived from the critical checks and cannot be set directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    checks: BTreeMap<CheckName, ValidationCheck>,
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_check(&mut self, check: ValidationCheck) {
        self.checks.insert(check.name, check);
    }

    pub(crate) fn push_error(&mut self, error: String) {
        self.errors.push(error);
    }

    pub(crate) fn push_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// True iff every critical check is present and passed.
    pub fn passed(&self) -> bool {
        CheckName::ALL
            .iter()
            .filter(|name| name.is_critical())
            .all(|name| self.checks.get(name).is_some_and(|c| c.passed))
    }

    pub fn check(&self, name: CheckName) -> Option<&ValidationCheck> {
        self.checks.get(&name)
    }

    pub fn checks(&self) -> impl Iterator<Item = &ValidationCheck> {
        self.checks.values()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct ReportView<'a> {
            passed: bool,
            checks: BTreeMap<&'static str, CheckView<'a>>,
            errors: &'a [String],
            warnings: &'a [String],
        }

        #[derive(Serialize)]
        struct CheckView<'a> {
            passed: bool,
            details: &'a str,
        }

        let checks = self
            .checks
            .values()
            .map(|c| {
                (
                    c.name.as_str(),
                    CheckView {
                        passed: c.passed,
                        details: &c.details,
                    },
                )
            })
            .collect();

        ReportView {
            passed: self.passed(),
            checks,
            errors: &self.errors,
            warnings: &self.warnings,
        }
        .serialize(serializer)
    }
}

// =============================================================================
// Validation Config
// =============================================================================

/// Thresholds for the quality gate.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationConfig {
    /// Window the completeness and quality checks look back over
    pub trailing_window_days: i64,
    pub min_data_points: i64,
    pub min_assets: i64,
    /// Share of expected rows that must be present, in `[0.0, 1.0]`
    pub completeness_tolerance: f64,
    pub max_staleness_hours: i64,
    /// Null-close ratio above which the quality check warns
    pub max_missing_ratio: f64,
}

impl ValidationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.trailing_window_days <= 0 {
            return Err(Error::InvalidConfigValue(
                "trailing_window_days must be positive".to_string(),
            ));
        }
        if self.min_data_points < 0 {
            return Err(Error::InvalidConfigValue(
                "min_data_points must not be negative".to_string(),
            ));
        }
        if self.min_assets < 0 {
            return Err(Error::InvalidConfigValue(
                "min_assets must not be negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.completeness_tolerance) {
            return Err(Error::InvalidConfigValue(format!(
                "completeness_tolerance must be within [0, 1], got {}",
                self.completeness_tolerance
            )));
        }
        if self.max_staleness_hours <= 0 {
            return Err(Error::InvalidConfigValue(
                "max_staleness_hours must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.max_missing_ratio) {
            return Err(Error::InvalidConfigValue(format!(
                "max_missing_ratio must be within [0, 1], got {}",
                self.max_missing_ratio
            )));
        }
        Ok(())
    }

    pub fn trailing_window(&self) -> Duration {
        Duration::days(self.trailing_window_days)
    }

    pub fn max_staleness(&self) -> Duration {
        Duration::hours(self.max_staleness_hours)
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            trailing_window_days: TRAILING_WINDOW_DAYS,
            min_data_points: MIN_DATA_POINTS_REQUIRED,
            min_assets: MIN_ASSETS_REQUIRED,
            completeness_tolerance: COMPLETENESS_TOLERANCE,
            max_staleness_hours: MAX_STALENESS_HOURS,
            max_missing_ratio: MAX_MISSING_RATIO,
        }
    }
}
