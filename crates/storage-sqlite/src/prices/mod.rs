//! SQLite storage for normalized price history.

mod model;
mod repository;

pub use model::{format_timestamp, parse_timestamp, PriceRecordDB};
pub use repository::PriceRepository;
