//! # aurora-embeddings
//!
//! Embedding generation for Aurora's semantic search.
//!
//! Model inference is delegated to the external `fastembed` library; this
//! crate only defines the `Embedding` value type, the `EmbeddingModel` trait
//! seam, and a thin adapter over fastembed (model loading, cache directory,
//! batch embedding). Works offline after the initial model download.

pub mod embedder;
pub mod error;
pub mod model;

pub use embedder::{EmbedderConfig, FastEmbedder};
pub use error::EmbeddingError;
pub use model::{Embedding, EmbeddingModel, ModelInfo};
