//! Market data source trait definitions.
//!
//! This module defines the `MarketDataSource` trait that the ingestion
//! pipeline fetches through.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::MarketDataError;
use crate::models::{BatchFetch, Interval};

/// A rate-limited source of historical OHLCV data.
///
/// Implementations own their rate-limit state; callers never see it.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use eodgate_market_data::{BatchFetch, Interval, MarketDataError, MarketDataSource};
///
/// struct CsvSource;
///
/// #[async_trait]
/// impl MarketDataSource for CsvSource {
///     fn id(&self) -> &'static str {
///         "csv"
///     }
///
///     async fn fetch_batch(
///         &self,
///         symbols: &[String],
///         start: DateTime<Utc>,
///         end: DateTime<Utc>,
///         interval: Interval,
///     ) -> Result<BatchFetch, MarketDataError> {
///         // ...
///     }
/// }
/// ```
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Identifier written to `PriceRecord.source`, e.g. "yfinance".
    fn id(&self) -> &'static str;

    /// Fetch bars for every symbol in `symbols` over `[start, end]`.
    ///
    /// A symbol with no data maps to an empty row set without failing the
    /// call. An `Err` means the whole group failed.
    async fn fetch_batch(
        &self,
        symbols: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<BatchFetch, MarketDataError>;
}
