//! Error types for the market data crate.
//!
//! [`MarketDataError`] covers every failure a [`MarketDataSource`] call can
//! report. Callers treat any `Err` from a batch fetch as a group-level failure;
//! per-symbol "no data" is not an error and is reported as an empty row set.
//!
//! [`MarketDataSource`]: crate::provider::MarketDataSource

use thiserror::Error;

/// Errors that can occur during market data operations.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested symbol was not found by the provider.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// No data available for the requested date range.
    #[error("No data for date range")]
    NoDataForRange,

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider returned a bar that failed validation checks.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },

    /// The interval string could not be parsed.
    #[error("Unsupported interval: {0}")]
    UnsupportedInterval(String),
}

impl MarketDataError {
    /// Returns true when the same request may succeed if issued again later.
    ///
    /// Only used for logging; the pipeline never retries within a run.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Timeout { .. })
    }
}
