//! In-memory fakes for the pipeline's collaborators.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tokio::time::Instant;

use eodgate_market_data::{BatchFetch, Interval, MarketDataError, MarketDataSource, PriceBar, RateLimiter};

use crate::assets::{Asset, AssetDirectory};
use crate::errors::{DatabaseError, Error, Result};
use crate::prices::{PriceRecord, StorageGateway};

// =========================================================================
// Fake store
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    AssetCount,
    RecordCount,
    LatestTimestamp,
    NullCloseRatio,
}

/// Storage gateway and asset directory backed by in-memory maps.
#[derive(Clone, Default)]
pub struct FakeStore {
    records: Arc<Mutex<BTreeMap<String, PriceRecord>>>,
    assets: Arc<Mutex<Vec<Asset>>>,
    failing_queries: Arc<Mutex<HashSet<Query>>>,
    failing_symbols: Arc<Mutex<HashSet<String>>>,
    connection_down: Arc<Mutex<bool>>,
    directory_down: Arc<Mutex<bool>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with `n` active assets named `SYM000`, `SYM001`, ...
    pub fn with_active_assets(n: usize) -> Self {
        let store = Self::new();
        store.set_assets(symbols(n).into_iter().map(Asset::new).collect());
        store
    }

    pub fn set_assets(&self, assets: Vec<Asset>) {
        *self.assets.lock().unwrap() = assets;
    }

    pub fn fail_query(&self, query: Query) {
        self.failing_queries.lock().unwrap().insert(query);
    }

    /// Writes for this symbol fail with a query-level error.
    pub fn fail_writes_for(&self, symbol: &str) {
        self.failing_symbols.lock().unwrap().insert(symbol.to_string());
    }

    pub fn set_connection_down(&self, down: bool) {
        *self.connection_down.lock().unwrap() = down;
    }

    pub fn set_directory_down(&self, down: bool) {
        *self.directory_down.lock().unwrap() = down;
    }

    pub fn insert_records(&self, records: Vec<PriceRecord>) {
        let mut stored = self.records.lock().unwrap();
        for record in records {
            stored.insert(record.record_id(), record);
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn records_for(&self, symbol: &str) -> Vec<PriceRecord> {
        self.records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.symbol == symbol)
            .cloned()
            .collect()
    }

    fn check(&self, query: Query) -> Result<()> {
        if *self.connection_down.lock().unwrap() {
            return Err(DatabaseError::ConnectionFailed("connection refused".into()).into());
        }
        if self.failing_queries.lock().unwrap().contains(&query) {
            return Err(DatabaseError::QueryFailed(format!("{:?} query failed", query)).into());
        }
        Ok(())
    }
}

#[async_trait]
impl StorageGateway for FakeStore {
    async fn query_asset_count(&self, active: bool) -> Result<i64> {
        self.check(Query::AssetCount)?;
        let assets = self.assets.lock().unwrap();
        Ok(assets.iter().filter(|a| a.active == active).count() as i64)
    }

    async fn query_record_count(&self, since: DateTime<Utc>) -> Result<i64> {
        self.check(Query::RecordCount)?;
        let records = self.records.lock().unwrap();
        Ok(records.values().filter(|r| r.timestamp >= since).count() as i64)
    }

    async fn query_latest_timestamp(&self) -> Result<Option<DateTime<Utc>>> {
        self.check(Query::LatestTimestamp)?;
        let records = self.records.lock().unwrap();
        Ok(records.values().map(|r| r.timestamp).max())
    }

    async fn query_null_close_ratio(&self, since: DateTime<Utc>) -> Result<f64> {
        self.check(Query::NullCloseRatio)?;
        let records = self.records.lock().unwrap();
        let window: Vec<_> = records.values().filter(|r| r.timestamp >= since).collect();
        if window.is_empty() {
            return Ok(0.0);
        }
        let nulls = window.iter().filter(|r| r.close.is_none()).count();
        Ok(nulls as f64 / window.len() as f64)
    }

    async fn upsert_price_records(&self, records: &[PriceRecord]) -> Result<usize> {
        if *self.connection_down.lock().unwrap() {
            return Err(DatabaseError::ConnectionFailed("connection refused".into()).into());
        }
        {
            let failing = self.failing_symbols.lock().unwrap();
            if let Some(record) = records.iter().find(|r| failing.contains(&r.symbol)) {
                return Err(DatabaseError::QueryFailed(format!(
                    "write failed for {}",
                    record.symbol
                ))
                .into());
            }
        }

        let mut stored = self.records.lock().unwrap();
        let mut new_rows = 0;
        for record in records {
            if stored.insert(record.record_id(), record.clone()).is_none() {
                new_rows += 1;
            }
        }
        Ok(new_rows)
    }
}

#[async_trait]
impl AssetDirectory for FakeStore {
    async fn list_active(&self) -> Result<Vec<Asset>> {
        if *self.directory_down.lock().unwrap() {
            return Err(Error::Database(DatabaseError::ConnectionFailed(
                "directory unreachable".into(),
            )));
        }
        let assets = self.assets.lock().unwrap();
        Ok(assets.iter().filter(|a| a.active).cloned().collect())
    }
}

// =========================================================================
// Fake source
// =========================================================================

/// Market data source serving scripted bars, with its own rate limiter.
pub struct FakeSource {
    limiter: RateLimiter,
    bars: Mutex<HashMap<String, Vec<PriceBar>>>,
    failing_calls: Mutex<HashSet<usize>>,
    failing_tickers: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<(Instant, Vec<String>)>>,
}

impl FakeSource {
    pub fn new(min_delay: StdDuration) -> Self {
        Self {
            limiter: RateLimiter::new(min_delay),
            bars: Mutex::new(HashMap::new()),
            failing_calls: Mutex::new(HashSet::new()),
            failing_tickers: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(StdDuration::ZERO)
    }

    pub fn set_bars(&self, ticker: &str, bars: Vec<PriceBar>) {
        self.bars.lock().unwrap().insert(ticker.to_string(), bars);
    }

    /// Serve `days` daily bars ending at `end` for every ticker.
    pub fn serve_daily(&self, tickers: &[String], end: DateTime<Utc>, days: i64) {
        for ticker in tickers {
            self.set_bars(ticker, daily_bars(end, days));
        }
    }

    /// The `index`-th call (zero-based) returns an error.
    pub fn fail_call(&self, index: usize) {
        self.failing_calls.lock().unwrap().insert(index);
    }

    /// Requests for this ticker fail on their own; the rest of the group
    /// still succeeds.
    pub fn fail_ticker(&self, ticker: &str, message: &str) {
        self.failing_tickers
            .lock()
            .unwrap()
            .insert(ticker.to_string(), message.to_string());
    }

    pub fn calls(&self) -> Vec<(Instant, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl MarketDataSource for FakeSource {
    fn id(&self) -> &'static str {
        "fake"
    }

    async fn fetch_batch(
        &self,
        symbols: &[String],
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _interval: Interval,
    ) -> std::result::Result<BatchFetch, MarketDataError> {
        self.limiter.acquire().await;

        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((Instant::now(), symbols.to_vec()));
            calls.len() - 1
        };

        if self.failing_calls.lock().unwrap().contains(&index) {
            return Err(MarketDataError::Timeout {
                provider: "FAKE".to_string(),
            });
        }

        let bars = self.bars.lock().unwrap();
        let failing = self.failing_tickers.lock().unwrap();
        let mut batch = BatchFetch::new();
        for symbol in symbols {
            match failing.get(symbol) {
                Some(message) => batch.insert_error(symbol.clone(), message.clone()),
                None => batch.insert(symbol.clone(), bars.get(symbol).cloned().unwrap_or_default()),
            }
        }
        Ok(batch)
    }
}

// =========================================================================
// Builders
// =========================================================================

pub fn symbols(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("SYM{:03}", i)).collect()
}

pub fn assets(n: usize) -> Vec<Asset> {
    symbols(n).into_iter().map(Asset::new).collect()
}

/// A clean bar with a flat OHLC range.
pub fn bar(timestamp: DateTime<Utc>, close: Decimal) -> PriceBar {
    PriceBar::new(timestamp, close)
        .with_ohlc(close, close, close)
        .with_volume(Decimal::from(1000))
}

/// `days` consecutive daily bars, the newest at `end`.
pub fn daily_bars(end: DateTime<Utc>, days: i64) -> Vec<PriceBar> {
    (0..days)
        .rev()
        .map(|d| bar(end - Duration::days(d), Decimal::from(100 + d)))
        .collect()
}

/// Stored record for `symbol` at `timestamp`.
pub fn record(symbol: &str, timestamp: DateTime<Utc>, close: Option<Decimal>) -> PriceRecord {
    PriceRecord {
        symbol: symbol.to_string(),
        timestamp,
        open: close,
        high: close,
        low: close,
        close,
        volume: Some(Decimal::from(1000)),
        adjusted_close: close,
        source: "fake".to_string(),
        data_quality: if close.is_some() { 1.0 } else { 0.0 },
    }
}
