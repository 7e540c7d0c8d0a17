//! # aurora-vector
//!
//! Vector storage for Aurora's semantic search.
//!
//! Two layers with distinct roles:
//! - `ItemStore`: RocksDB-backed persisted storage holding each index item
//!   together with its embedding. This is the canonical snapshot that
//!   survives restarts and that external indexers mutate.
//! - `HnswIndex`: in-memory approximate nearest-neighbor cache over usearch,
//!   rebuilt from the store on session init and on cache refresh.
//!
//! Ranking and distance metric are owned by usearch (cosine); persistence
//! format is plain serde_json records in RocksDB.

pub mod error;
pub mod hnsw;
pub mod index;
pub mod item;
pub mod store;

pub use error::VectorError;
pub use hnsw::{HnswConfig, HnswIndex};
pub use index::{Hit, VectorIndex};
pub use item::IndexItem;
pub use store::{ItemStore, StoredVector, CF_VECTORS};
