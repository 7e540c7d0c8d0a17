//! Theme layer error types.

use thiserror::Error;

/// Errors that can occur during theme operations.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// Theme not found in the catalog
    #[error("Theme not found: {0}")]
    NotFound(String),

    /// RocksDB error
    #[error("Database error: {0}")]
    Database(#[from] rocksdb::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
