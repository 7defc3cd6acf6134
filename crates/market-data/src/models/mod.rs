//! Market data models
//!
//! - `bar` - A single OHLCV row and the per-symbol result of a batch fetch
//! - `interval` - Sampling granularity of a price series

mod bar;
mod interval;

pub use bar::{BatchFetch, PriceBar};
pub use interval::Interval;
