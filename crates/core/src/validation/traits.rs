//! Quality check traits.
//!
//! - `QualityCheck` - Trait for implementing one data-quality check
//! - `ValidationContext` - Thresholds and the current timestamp

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{CheckName, ValidationConfig};
use crate::errors::Result;

/// Context provided to checks during one validation pass.
///
/// Every check in a pass sees the same `now`.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    pub config: ValidationConfig,
    pub now: DateTime<Utc>,
}

impl ValidationContext {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            now: Utc::now(),
        }
    }

    /// Creates a context with a specific timestamp (for testing).
    pub fn with_timestamp(config: ValidationConfig, now: DateTime<Utc>) -> Self {
        Self { config, now }
    }

    /// Start of the trailing window.
    pub fn window_start(&self) -> DateTime<Utc> {
        self.now - self.config.trailing_window()
    }
}

/// What a check found when its queries succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub passed: bool,
    pub details: String,
    /// Appended to the report's errors
    pub error: Option<String>,
    /// Appended to the report's warnings
    pub warning: Option<String>,
}

impl CheckOutcome {
    pub fn pass(details: impl Into<String>) -> Self {
        Self {
            passed: true,
            details: details.into(),
            error: None,
            warning: None,
        }
    }

    pub fn fail(details: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            passed: false,
            details: details.into(),
            error: Some(error.into()),
            warning: None,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }
}

/// Trait for implementing data-quality checks.
///
/// Checks read storage only and have no side effects. A query error is
/// returned as `Err`; the validator records it as a failure for critical
/// checks and as a warning otherwise.
///
/// # Example
///
/// ```ignore
/// pub struct FreshnessCheck {
///     storage: Arc<dyn StorageGateway>,
/// }
///
/// #[async_trait]
/// impl QualityCheck for FreshnessCheck {
///     fn name(&self) -> CheckName {
///         CheckName::Freshness
///     }
///
///     async fn run(&self, ctx: &ValidationContext) -> Result<CheckOutcome> {
///         // Compare the newest stored timestamp against ctx.now
///     }
/// }
/// ```
#[async_trait]
pub trait QualityCheck: Send + Sync {
    /// Also decides criticality, see [`CheckName::is_critical`].
    fn name(&self) -> CheckName;

    async fn run(&self, ctx: &ValidationContext) -> Result<CheckOutcome>;
}
