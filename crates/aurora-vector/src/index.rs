//! Vector index trait and types.

use crate::error::VectorError;
use aurora_embeddings::Embedding;

/// A nearest-neighbor hit.
#[derive(Debug, Clone)]
pub struct Hit {
    /// Internal vector ID
    pub vector_id: u64,
    /// Similarity score (higher = more similar)
    pub score: f32,
}

impl Hit {
    pub fn new(vector_id: u64, score: f32) -> Self {
        Self { vector_id, score }
    }
}

/// Trait for in-memory vector indexes.
///
/// Implementations must be thread-safe for concurrent read access.
pub trait VectorIndex: Send + Sync {
    /// Embedding dimension the index was built for.
    fn dimension(&self) -> usize;

    /// Number of vectors currently held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a vector under the given ID.
    fn add(&self, id: u64, embedding: &Embedding) -> Result<(), VectorError>;

    /// Search for the k nearest neighbors, best first.
    fn search(&self, query: &Embedding, k: usize) -> Result<Vec<Hit>, VectorError>;

    /// Remove a vector by ID. Returns whether it existed.
    fn remove(&self, id: u64) -> Result<bool, VectorError>;

    /// Check if a vector ID exists.
    fn contains(&self, id: u64) -> bool;

    /// Drop every vector, leaving an empty index.
    fn clear(&self) -> Result<(), VectorError>;
}
