//! Storage interface for price history and aggregate queries.
//!
//! Implementations must make `upsert_price_records` idempotent: writing the
//! same `(symbol, timestamp, source)` twice leaves one row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::PriceRecord;
use crate::errors::Result;

/// Persisted store for asset metadata and historical price rows.
///
/// Connection-level failures must surface as
/// `DatabaseError::ConnectionFailed` or `DatabaseError::PoolCreationFailed`
/// so callers can tell them apart from a single failed query.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Number of assets with the given active flag.
    async fn query_asset_count(&self, active: bool) -> Result<i64>;

    /// Number of price rows with `timestamp >= since`.
    async fn query_record_count(&self, since: DateTime<Utc>) -> Result<i64>;

    /// Most recent timestamp across all price rows, `None` when empty.
    async fn query_latest_timestamp(&self) -> Result<Option<DateTime<Utc>>>;

    /// Share of rows with a null close among rows with `timestamp >= since`.
    /// Zero when there are no rows.
    async fn query_null_close_ratio(&self, since: DateTime<Utc>) -> Result<f64>;

    /// Insert or overwrite rows keyed on `(symbol, timestamp, source)`.
    ///
    /// Returns the number of rows that did not exist before the call.
    async fn upsert_price_records(&self, records: &[PriceRecord]) -> Result<usize>;
}
