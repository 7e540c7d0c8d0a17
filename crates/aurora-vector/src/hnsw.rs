//! In-memory HNSW index over usearch.
//!
//! Parameters tuned for quality over speed:
//! - M = 16 (connections per layer)
//! - ef_construction = 200 (build-time quality)
//! - ef_search = 100 (search-time quality)
//!
//! The index is deliberately not persisted; the `ItemStore` is canonical and
//! the index is rebuilt from it on init and refresh.

use std::sync::RwLock;

use aurora_embeddings::Embedding;
use tracing::debug;
use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use crate::error::VectorError;
use crate::index::{Hit, VectorIndex};

/// HNSW index configuration.
#[derive(Debug, Clone)]
pub struct HnswConfig {
    /// Embedding dimension (must match the model)
    pub dimension: usize,
    /// Connections per layer (M parameter)
    pub connectivity: usize,
    /// Build-time search depth (ef_construction)
    pub expansion_add: usize,
    /// Query-time search depth (ef_search)
    pub expansion_search: usize,
    /// Initial capacity reservation
    pub capacity: usize,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            dimension: 384, // all-MiniLM-L6-v2
            connectivity: 16,
            expansion_add: 200,
            expansion_search: 100,
            capacity: 100_000,
        }
    }
}

impl HnswConfig {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            ..Default::default()
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

/// In-memory HNSW index wrapper around usearch.
pub struct HnswIndex {
    index: RwLock<Index>,
    config: HnswConfig,
}

impl HnswIndex {
    /// Create an empty index.
    pub fn create(config: HnswConfig) -> Result<Self, VectorError> {
        let index = build_index(&config)?;
        debug!(dim = config.dimension, "Created vector index");
        Ok(Self {
            index: RwLock::new(index),
            config,
        })
    }
}

fn build_index(config: &HnswConfig) -> Result<Index, VectorError> {
    let options = IndexOptions {
        dimensions: config.dimension,
        metric: MetricKind::Cos,
        quantization: ScalarKind::F32,
        connectivity: config.connectivity,
        expansion_add: config.expansion_add,
        expansion_search: config.expansion_search,
        multi: false,
    };

    let index = Index::new(&options).map_err(|e| VectorError::Index(e.to_string()))?;
    index
        .reserve(config.capacity)
        .map_err(|e| VectorError::Index(e.to_string()))?;
    Ok(index)
}

impl VectorIndex for HnswIndex {
    fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn len(&self) -> usize {
        self.index.read().unwrap().size()
    }

    fn add(&self, id: u64, embedding: &Embedding) -> Result<(), VectorError> {
        if embedding.dimension() != self.config.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.config.dimension,
                actual: embedding.dimension(),
            });
        }

        let index = self.index.write().unwrap();
        if index.size() >= index.capacity() {
            index
                .reserve(index.capacity() * 2)
                .map_err(|e| VectorError::Index(e.to_string()))?;
        }
        index
            .add(id, &embedding.values)
            .map_err(|e| VectorError::Index(e.to_string()))?;

        debug!(id = id, "Added vector");
        Ok(())
    }

    fn search(&self, query: &Embedding, k: usize) -> Result<Vec<Hit>, VectorError> {
        if query.dimension() != self.config.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.config.dimension,
                actual: query.dimension(),
            });
        }

        let index = self.index.read().unwrap();
        let results = index
            .search(&query.values, k)
            .map_err(|e| VectorError::Index(e.to_string()))?;

        // Convert cosine distance to similarity
        let hits: Vec<Hit> = results
            .keys
            .iter()
            .zip(results.distances.iter())
            .map(|(&id, &dist)| Hit::new(id, 1.0 - dist))
            .collect();

        debug!(k = k, found = hits.len(), "Search complete");
        Ok(hits)
    }

    fn remove(&self, id: u64) -> Result<bool, VectorError> {
        let index = self.index.write().unwrap();
        let removed = index
            .remove(id)
            .map_err(|e| VectorError::Index(e.to_string()))?;
        Ok(removed > 0)
    }

    fn contains(&self, id: u64) -> bool {
        self.index.read().unwrap().contains(id)
    }

    fn clear(&self) -> Result<(), VectorError> {
        let new_index = build_index(&self.config)?;
        *self.index.write().unwrap() = new_index;
        debug!("Cleared vector index");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_embedding(dim: usize) -> Embedding {
        use rand::Rng;
        let mut rng = rand::rng();
        let values: Vec<f32> = (0..dim).map(|_| rng.random()).collect();
        Embedding::new(values)
    }

    #[test]
    fn test_create_empty() {
        let index = HnswIndex::create(HnswConfig::new(64)).unwrap();
        assert_eq!(index.dimension(), 64);
        assert!(index.is_empty());
    }

    #[test]
    fn test_add_and_search_ordering() {
        let index = HnswIndex::create(HnswConfig::new(64).with_capacity(100)).unwrap();

        for i in 0..10 {
            index.add(i, &random_embedding(64)).unwrap();
        }
        assert_eq!(index.len(), 10);

        let results = index.search(&random_embedding(64), 5).unwrap();
        assert_eq!(results.len(), 5);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_exact_match_ranks_first() {
        let index = HnswIndex::create(HnswConfig::new(32).with_capacity(100)).unwrap();
        let target = random_embedding(32);
        index.add(7, &target).unwrap();
        for i in 0..5 {
            index.add(i, &random_embedding(32)).unwrap();
        }

        let results = index.search(&target, 3).unwrap();
        assert_eq!(results[0].vector_id, 7);
        assert!(results[0].score > 0.999);
    }

    #[test]
    fn test_dimension_mismatch() {
        let index = HnswIndex::create(HnswConfig::new(64)).unwrap();
        let wrong = random_embedding(32);
        assert!(matches!(
            index.add(0, &wrong),
            Err(VectorError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            index.search(&wrong, 5),
            Err(VectorError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_remove_and_contains() {
        let index = HnswIndex::create(HnswConfig::new(64).with_capacity(100)).unwrap();
        index.add(42, &random_embedding(64)).unwrap();
        assert!(index.contains(42));

        assert!(index.remove(42).unwrap());
        assert!(!index.contains(42));
        assert!(!index.remove(42).unwrap());
    }

    #[test]
    fn test_clear() {
        let index = HnswIndex::create(HnswConfig::new(64).with_capacity(100)).unwrap();
        for i in 0..5 {
            index.add(i, &random_embedding(64)).unwrap();
        }
        index.clear().unwrap();
        assert!(index.is_empty());
        assert!(!index.contains(0));
    }

    #[test]
    fn test_capacity_growth() {
        let index = HnswIndex::create(HnswConfig::new(16).with_capacity(4)).unwrap();
        for i in 0..32 {
            index.add(i, &random_embedding(16)).unwrap();
        }
        assert_eq!(index.len(), 32);
    }
}
