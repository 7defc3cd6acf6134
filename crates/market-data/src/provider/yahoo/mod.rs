//! Yahoo Finance market data source.
//!
//! Fetches historical OHLCV bars for equities, ETFs and crypto pairs
//! (e.g. AAPL, RELIANCE.NS, BTC-USD) through the Yahoo chart API.
//!
//! One group call acquires the rate limiter once, then requests each symbol
//! in turn over the same connector.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::{BatchFetch, Interval, PriceBar};
use crate::provider::{MarketDataSource, RateLimit};
use crate::rate_limiter::RateLimiter;
use crate::resolver::to_yahoo_symbol;

/// Source id written to stored records.
pub const YAHOO_SOURCE_ID: &str = "yfinance";

const PROVIDER_NAME: &str = "YAHOO";

/// Outcome of one symbol inside a group call.
#[derive(Debug)]
enum SymbolFetch {
    Rows(Vec<PriceBar>),
    NoData,
    Failed(MarketDataError),
}

/// Yahoo Finance market data source.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
    limiter: RateLimiter,
    rate_limit: RateLimit,
}

impl YahooProvider {
    /// Create a new Yahoo Finance source with its own rate limiter.
    pub fn new(rate_limit: RateLimit) -> Result<Self, MarketDataError> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_NAME.to_string(),
                message: format!("Failed to initialize Yahoo connector: {}", e),
            })?;

        info!(
            "Yahoo source initialized (min delay {:.1}s)",
            rate_limit.min_delay.as_secs_f64()
        );

        Ok(Self {
            connector,
            limiter: RateLimiter::from_rate_limit(&rate_limit),
            rate_limit,
        })
    }

    /// Convert chrono DateTime<Utc> to time::OffsetDateTime for the Yahoo API.
    fn chrono_to_offset_datetime(dt: DateTime<Utc>) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(dt.timestamp())
            .unwrap_or_else(|_| OffsetDateTime::now_utc())
    }

    async fn fetch_symbol(
        &self,
        ticker: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
        interval: Interval,
    ) -> SymbolFetch {
        let response = match self
            .connector
            .get_quote_history_interval(ticker, start, end, interval.yahoo_code())
            .await
        {
            Ok(response) => response,
            Err(e) => return classify_error(ticker, e),
        };

        match response.quotes() {
            Ok(quotes) => {
                let bars: Vec<PriceBar> = quotes
                    .into_iter()
                    .filter_map(|q| match yahoo_quote_to_bar(&q) {
                        Ok(bar) => Some(bar),
                        Err(e) => {
                            warn!("Skipping bar for {} due to conversion error: {}", ticker, e);
                            None
                        }
                    })
                    .collect();

                if bars.is_empty() {
                    SymbolFetch::NoData
                } else {
                    SymbolFetch::Rows(bars)
                }
            }
            Err(e) => classify_error(ticker, e),
        }
    }
}

/// "No quotes" is an empty result; anything else is a per-symbol failure.
fn classify_error(ticker: &str, error: yahoo::YahooError) -> SymbolFetch {
    if matches!(error, yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) {
        debug!("No quotes returned for '{}'", ticker);
        return SymbolFetch::NoData;
    }

    let message = error.to_string();
    if message.contains("429") || message.to_lowercase().contains("too many requests") {
        return SymbolFetch::Failed(MarketDataError::RateLimited {
            provider: PROVIDER_NAME.to_string(),
        });
    }

    SymbolFetch::Failed(MarketDataError::ProviderError {
        provider: PROVIDER_NAME.to_string(),
        message,
    })
}

/// Fold per-symbol outcomes into one group result.
///
/// When every symbol failed the group itself is treated as failed and the
/// first error is returned. Otherwise failed symbols are logged and carry
/// their error in the batch.
fn collect_group(outcomes: Vec<(String, SymbolFetch)>) -> Result<BatchFetch, MarketDataError> {
    let all_failed = !outcomes.is_empty()
        && outcomes
            .iter()
            .all(|(_, outcome)| matches!(outcome, SymbolFetch::Failed(_)));

    let mut batch = BatchFetch::new();
    for (symbol, outcome) in outcomes {
        match outcome {
            SymbolFetch::Rows(bars) => batch.insert(symbol, bars),
            SymbolFetch::NoData => batch.insert_empty(symbol),
            SymbolFetch::Failed(e) if all_failed => return Err(e),
            SymbolFetch::Failed(e) => {
                warn!("Yahoo request for {} failed: {}", symbol, e);
                batch.insert_error(symbol, e.to_string());
            }
        }
    }

    Ok(batch)
}

/// Convert a Yahoo quote to a bar. Non-finite prices become `None`; the
/// adjusted close falls back to the close.
fn yahoo_quote_to_bar(quote: &yahoo::Quote) -> Result<PriceBar, MarketDataError> {
    let timestamp: DateTime<Utc> = Utc
        .timestamp_opt(quote.timestamp as i64, 0)
        .single()
        .ok_or_else(|| MarketDataError::ValidationFailed {
            message: format!("Invalid timestamp: {}", quote.timestamp),
        })?;

    let close = finite_decimal(quote.close);

    Ok(PriceBar {
        timestamp,
        open: finite_decimal(quote.open),
        high: finite_decimal(quote.high),
        low: finite_decimal(quote.low),
        close,
        volume: Decimal::from_u64(quote.volume),
        adjusted_close: finite_decimal(quote.adjclose).or(close),
    })
}

fn finite_decimal(value: f64) -> Option<Decimal> {
    if value.is_finite() {
        Decimal::from_f64_retain(value)
    } else {
        None
    }
}

#[async_trait]
impl MarketDataSource for YahooProvider {
    fn id(&self) -> &'static str {
        YAHOO_SOURCE_ID
    }

    async fn fetch_batch(
        &self,
        symbols: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<BatchFetch, MarketDataError> {
        if symbols.is_empty() {
            return Ok(BatchFetch::new());
        }

        self.limiter.acquire().await;

        debug!(
            "Fetching {} symbols from {} to {} ({}) from Yahoo",
            symbols.len(),
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
            interval
        );

        let start_time = Self::chrono_to_offset_datetime(start);
        let end_time = Self::chrono_to_offset_datetime(end);

        let group = async {
            let mut outcomes = Vec::with_capacity(symbols.len());
            for symbol in symbols {
                let ticker = to_yahoo_symbol(symbol);
                let outcome = self
                    .fetch_symbol(&ticker, start_time, end_time, interval)
                    .await;
                outcomes.push((symbol.clone(), outcome));
            }
            outcomes
        };

        let outcomes = tokio::time::timeout(timeout_or_max(self.rate_limit.request_timeout), group)
            .await
            .map_err(|_| MarketDataError::Timeout {
                provider: PROVIDER_NAME.to_string(),
            })?;

        collect_group(outcomes)
    }
}

fn timeout_or_max(timeout: Duration) -> Duration {
    if timeout.is_zero() {
        Duration::MAX
    } else {
        timeout
    }
}
