//! eodgate Core - Domain entities, services, and traits.
//!
//! This crate contains the validation-gated ingestion pipeline. It is
//! storage-agnostic and defines the traits that the `storage-sqlite` crate
//! implements:
//!
//! - [`assets::AssetDirectory`] - which symbols are actively tracked
//! - [`prices::StorageGateway`] - idempotent price upserts and aggregate queries
//!
//! Market data comes in through [`eodgate_market_data::MarketDataSource`].

pub mod assets;
pub mod constants;
pub mod errors;
pub mod ingestion;
pub mod pipeline;
pub mod prices;
pub mod validation;

#[cfg(test)]
#[allow(dead_code)]
pub(crate) mod test_support;

pub use assets::{Asset, AssetDirectory};
pub use ingestion::{
    FetchOutcome, FetchStatus, IngestionConfig, IngestionError, IngestionOrchestrator,
    IngestionStats, IngestionSummary,
};
pub use pipeline::{
    AnalyticsTrigger, LoggingAnalyticsTrigger, PipelineController, PipelineError,
    PipelineFailure, PipelineOutcome, PipelineRun, PipelineStatus, RunSettings,
};
pub use prices::{PriceRecord, StorageGateway};
pub use validation::{
    CheckName, QualityCheck, QualityValidator, ValidationCheck, ValidationConfig,
    ValidationContext, ValidationReport,
};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
