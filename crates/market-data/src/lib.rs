//! eodgate Market Data Crate
//!
//! This crate provides the source side of the EOD ingestion pipeline.
//!
//! # Overview
//!
//! - [`MarketDataSource`] - Contract for fetching OHLCV bars for a group of symbols
//! - [`RateLimiter`] - Minimum-delay limiter owned by each source instance
//! - [`BarValidator`] - OHLC sanity checks and `data_quality` scoring
//! - [`YahooProvider`] - Yahoo Finance implementation
//!
//! # Core Types
//!
//! - [`PriceBar`] - One OHLCV row as returned by a source
//! - [`BatchFetch`] - Per-symbol rows from one group call
//! - [`Interval`] - Sampling granularity

pub mod errors;
pub mod models;
pub mod provider;
pub mod rate_limiter;
pub mod resolver;
pub mod validator;

pub use errors::MarketDataError;
pub use models::{BatchFetch, Interval, PriceBar};
pub use provider::yahoo::{YahooProvider, YAHOO_SOURCE_ID};
pub use provider::{MarketDataSource, RateLimit};
pub use rate_limiter::RateLimiter;
pub use resolver::to_yahoo_symbol;
pub use validator::{BarQuality, BarValidator, ValidatorConfig, FULL_QUALITY};
