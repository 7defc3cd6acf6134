//! Market data source abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataSource` trait that all sources implement
//! - Rate limiting configuration
//! - The Yahoo Finance implementation

mod capabilities;
mod traits;

pub mod yahoo;

pub use capabilities::RateLimit;
pub use traits::MarketDataSource;
