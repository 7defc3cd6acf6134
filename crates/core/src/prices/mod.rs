//! Persisted price history.

mod model;
mod store;

pub use model::PriceRecord;
pub use store::StorageGateway;
