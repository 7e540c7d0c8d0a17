//! Model provider seam.
//!
//! The session loads its embedding model lazily; the provider abstracts how
//! the model comes into existence so tests can inject failures and count
//! load attempts.

use std::sync::Arc;

use aurora_embeddings::{EmbedderConfig, EmbeddingError, EmbeddingModel, FastEmbedder};

/// Source of embedding models for a search session.
///
/// `load` is called on the blocking pool; it may download model files on
/// first use and block for a while.
pub trait ModelProvider: Send + Sync {
    fn load(&self) -> Result<Arc<dyn EmbeddingModel>, EmbeddingError>;
}

/// Production provider backed by fastembed.
pub struct FastEmbedProvider {
    config: EmbedderConfig,
}

impl FastEmbedProvider {
    pub fn new(config: EmbedderConfig) -> Self {
        Self { config }
    }
}

impl Default for FastEmbedProvider {
    fn default() -> Self {
        Self::new(EmbedderConfig::default())
    }
}

impl ModelProvider for FastEmbedProvider {
    fn load(&self) -> Result<Arc<dyn EmbeddingModel>, EmbeddingError> {
        Ok(Arc::new(FastEmbedder::load(&self.config)?))
    }
}
