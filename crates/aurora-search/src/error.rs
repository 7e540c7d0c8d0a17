//! Search session error types.

use thiserror::Error;

/// Errors that can occur during search session operations.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Initialization recently failed and the cooldown has not elapsed
    #[error("Initialization cooling down, retry in {retry_in_ms} ms")]
    Cooldown { retry_in_ms: u64 },

    /// Embedding error (model load or inference)
    #[error("Embedding error: {0}")]
    Embedding(#[from] aurora_embeddings::EmbeddingError),

    /// Vector index or store error
    #[error("Vector error: {0}")]
    Vector(#[from] aurora_vector::VectorError),

    /// Blocking task failed to complete
    #[error("Background task failed: {0}")]
    Task(String),
}
