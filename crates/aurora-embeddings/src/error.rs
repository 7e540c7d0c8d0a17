//! Embedding error types.

use thiserror::Error;

/// Errors that can occur during embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Model failed to load or download
    #[error("Model initialization failed: {0}")]
    Init(String),

    /// Inference failure
    #[error("Embedding inference failed: {0}")]
    Inference(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unknown model name
    #[error("Unknown embedding model: {0}")]
    UnknownModel(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
