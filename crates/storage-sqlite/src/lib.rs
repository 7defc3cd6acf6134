//! SQLite storage implementation for eodgate.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the storage traits defined in `eodgate-core`:
//! - [`AssetRepository`] implements `AssetDirectory`
//! - [`PriceRepository`] implements `StorageGateway`
//!
//! Reads go through an r2d2 pool; every write is serialized through a single
//! writer task holding its own connection.
//!
//! ```text
//!   core (pipeline)
//!         │
//!         ▼
//!   storage-sqlite (this crate)
//!         │
//!         ▼
//!     SQLite DB
//! ```

pub mod assets;
pub mod db;
pub mod errors;
pub mod prices;
pub mod schema;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, open, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

pub use assets::AssetRepository;
pub use prices::PriceRepository;

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from eodgate-core for convenience
pub use eodgate_core::errors::{DatabaseError, Error, Result};
