//! # aurora-search
//!
//! The vector search session: an explicitly owned handle over an embedding
//! model and an in-memory nearest-neighbor index backed by the persisted
//! item store.
//!
//! Two states: uninitialized and ready. The transition happens on the first
//! call to any operation (or an explicit `ensure_ready`), runs single-flight,
//! and on failure is memoized with an exponential cooldown so callers don't
//! hammer model loading. A later successful attempt fully recovers the
//! session.

pub mod error;
pub mod provider;
pub mod session;

pub use error::SearchError;
pub use provider::{FastEmbedProvider, ModelProvider};
pub use session::{SearchConfig, SearchSession, VectorSearchResult};
