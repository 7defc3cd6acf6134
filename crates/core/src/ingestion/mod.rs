//! Grouped, rate-limited ingestion with per-symbol failure isolation.

mod errors;
mod model;
mod orchestrator;


pub use errors::IngestionError;
pub use model::{FetchOutcome, FetchStatus, IngestionConfig, IngestionStats, IngestionSummary};
pub use orchestrator::IngestionOrchestrator;
