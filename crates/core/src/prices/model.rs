use chrono::{DateTime, SecondsFormat, Utc};
use eodgate_market_data::PriceBar;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A normalized OHLCV row as persisted.
///
/// Upserts are keyed on `(symbol, timestamp, source)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
    pub volume: Option<Decimal>,
    pub adjusted_close: Option<Decimal>,
    pub source: String,
    /// Score in `[0.0, 1.0]` assigned by the bar validator
    pub data_quality: f64,
}

impl PriceRecord {
    /// Normalize a provider bar under the asset's canonical symbol.
    pub fn from_bar(symbol: &str, source: &str, bar: PriceBar, data_quality: f64) -> Self {
        let adjusted_close = bar.adjusted_close_or_close();
        Self {
            symbol: symbol.to_string(),
            timestamp: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            adjusted_close,
            source: source.to_string(),
            data_quality,
        }
    }

    /// Deterministic identity derived from the upsert key.
    pub fn record_id(&self) -> String {
        format!(
            "{}|{}|{}",
            self.symbol,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.source
        )
    }
}
