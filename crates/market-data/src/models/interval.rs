use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Sampling granularity of a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    #[default]
    Daily,
    Hourly,
    Weekly,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "daily",
            Interval::Hourly => "hourly",
            Interval::Weekly => "weekly",
        }
    }

    /// Interval code understood by the Yahoo chart API.
    pub fn yahoo_code(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Hourly => "1h",
            Interval::Weekly => "1wk",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "1d" | "eod" => Ok(Interval::Daily),
            "hourly" | "1h" | "60m" => Ok(Interval::Hourly),
            "weekly" | "1wk" => Ok(Interval::Weekly),
            other => Err(MarketDataError::UnsupportedInterval(other.to_string())),
        }
    }
}
