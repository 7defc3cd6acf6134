use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One OHLCV row as returned by a provider.
///
/// Every price field is optional: providers occasionally emit a bar with a
/// missing close, and downstream quality checks need to see it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Start of the sampling interval (UTC)
    pub timestamp: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,

    pub close: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,

    /// Split/dividend adjusted close, when the provider supplies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjusted_close: Option<Decimal>,
}

impl PriceBar {
    /// Create a bar carrying only a timestamp and a close.
    pub fn new(timestamp: DateTime<Utc>, close: Decimal) -> Self {
        Self {
            timestamp,
            open: None,
            high: None,
            low: None,
            close: Some(close),
            volume: None,
            adjusted_close: None,
        }
    }

    pub fn with_ohlc(mut self, open: Decimal, high: Decimal, low: Decimal) -> Self {
        self.open = Some(open);
        self.high = Some(high);
        self.low = Some(low);
        self
    }

    pub fn with_volume(mut self, volume: Decimal) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Adjusted close, falling back to the raw close.
    pub fn adjusted_close_or_close(&self) -> Option<Decimal> {
        self.adjusted_close.or(self.close)
    }
}

/// Per-symbol result of one `fetch_batch` call.
///
/// A symbol the provider had nothing for is present with an empty row set
/// (or absent entirely); both read back as empty through [`rows`](Self::rows).
#[derive(Clone, Debug, Default)]
pub struct BatchFetch {
    rows: HashMap<String, Vec<PriceBar>>,
    errors: HashMap<String, String>,
}

impl BatchFetch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the rows returned for a symbol, replacing anything already there.
    pub fn insert(&mut self, symbol: impl Into<String>, bars: Vec<PriceBar>) {
        self.rows.insert(symbol.into(), bars);
    }

    /// Record that the provider returned nothing for a symbol.
    pub fn insert_empty(&mut self, symbol: impl Into<String>) {
        self.rows.insert(symbol.into(), Vec::new());
    }

    /// Rows for a symbol; empty when the provider had no data for it.
    pub fn rows(&self, symbol: &str) -> &[PriceBar] {
        self.rows.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Record that the request for one symbol failed while the rest of the
    /// group succeeded. The symbol reads back with no rows.
    pub fn insert_error(&mut self, symbol: impl Into<String>, message: impl Into<String>) {
        let symbol = symbol.into();
        self.rows.insert(symbol.clone(), Vec::new());
        self.errors.insert(symbol, message.into());
    }

    /// Provider error for a symbol whose request failed, if any.
    pub fn error(&self, symbol: &str) -> Option<&str> {
        self.errors.get(symbol).map(String::as_str)
    }

    /// Number of symbols that came back with at least one row.
    pub fn symbols_with_data(&self) -> usize {
        self.rows.values().filter(|bars| !bars.is_empty()).count()
    }

    /// Total rows across all symbols.
    pub fn total_rows(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }
}

impl FromIterator<(String, Vec<PriceBar>)> for BatchFetch {
    fn from_iter<I: IntoIterator<Item = (String, Vec<PriceBar>)>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
            errors: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_missing_symbol_reads_as_empty() {
        let mut batch = BatchFetch::new();
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        batch.insert("AAPL", vec![PriceBar::new(ts, dec!(180.5))]);
        batch.insert_empty("MSFT");

        assert_eq!(batch.rows("AAPL").len(), 1);
        assert!(batch.rows("MSFT").is_empty());
        assert!(batch.rows("TSLA").is_empty());
        assert_eq!(batch.symbols_with_data(), 1);
        assert_eq!(batch.total_rows(), 1);
        assert_eq!(batch.error("MSFT"), None);
    }

    #[test]
    fn test_symbol_error_reads_as_empty_with_message() {
        let mut batch = BatchFetch::new();
        batch.insert_error("BAD", "HTTP 404");

        assert!(batch.rows("BAD").is_empty());
        assert_eq!(batch.error("BAD"), Some("HTTP 404"));
        assert_eq!(batch.symbols_with_data(), 0);
    }

    #[test]
    fn test_adjusted_close_falls_back_to_close() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut bar = PriceBar::new(ts, dec!(10));
        assert_eq!(bar.adjusted_close_or_close(), Some(dec!(10)));

        bar.adjusted_close = Some(dec!(9.5));
        assert_eq!(bar.adjusted_close_or_close(), Some(dec!(9.5)));
    }
}
