use thiserror::Error;

/// Conditions that make an ingestion run meaningless to continue.
///
/// Per-symbol and per-group failures are never reported here; they are
/// recorded as `Failed` outcomes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestionError {
    #[error("No assets to ingest")]
    EmptyUniverse,

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}
