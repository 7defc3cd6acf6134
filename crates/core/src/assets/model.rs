use serde::{Deserialize, Serialize};

/// An actively tracked instrument.
///
/// Owned by the asset directory; the pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Canonical symbol, used as the storage key for price rows
    pub symbol: String,
    /// Provider-specific ticker, when it differs from the symbol
    pub provider_ticker: Option<String>,
    pub name: Option<String>,
    pub active: bool,
}

impl Asset {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            provider_ticker: None,
            name: None,
            active: true,
        }
    }

    pub fn with_provider_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.provider_ticker = Some(ticker.into());
        self
    }

    /// Ticker to send to the market data source.
    pub fn request_ticker(&self) -> &str {
        match self.provider_ticker.as_deref().map(str::trim) {
            Some(ticker) if !ticker.is_empty() => ticker,
            _ => &self.symbol,
        }
    }
}
