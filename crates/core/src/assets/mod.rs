//! Tracked asset universe.

mod model;
mod store;

pub use model::Asset;
pub use store::AssetDirectory;
