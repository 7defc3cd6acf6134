//! Core error types for the eodgate pipeline.
//!
//! This module defines storage-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, r2d2) are converted to these types by the storage layer.

use thiserror::Error;

use crate::ingestion::IngestionError;
use crate::pipeline::PipelineError;
use eodgate_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Ingestion failed: {0}")]
    Ingestion(#[from] IngestionError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// True when the store itself cannot be reached, as opposed to a single
    /// query failing. Ingestion treats this as fatal.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            Error::Database(DatabaseError::ConnectionFailed(_))
                | Error::Database(DatabaseError::PoolCreationFailed(_))
        )
    }
}

/// Storage-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A database transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Unexpected(err.to_string())
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failures_are_distinguished() {
        let err: Error = DatabaseError::ConnectionFailed("pool timed out".into()).into();
        assert!(err.is_connection_failure());

        let err: Error = DatabaseError::PoolCreationFailed("bad path".into()).into();
        assert!(err.is_connection_failure());

        let err: Error = DatabaseError::QueryFailed("no such table".into()).into();
        assert!(!err.is_connection_failure());

        assert!(!Error::Unexpected("boom".into()).is_connection_failure());
    }

    #[test]
    fn test_error_display() {
        let err: Error = DatabaseError::QueryFailed("no such table: price_history".into()).into();
        assert_eq!(
            err.to_string(),
            "Database operation failed: Database query failed: no such table: price_history"
        );
    }
}
