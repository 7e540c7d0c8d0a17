//! Persisted item store.
//!
//! Maps internal vector IDs (u64) to index items and their embeddings.
//! Stored in RocksDB; this is the canonical snapshot the in-memory index is
//! rebuilt from on session init and cache refresh.

use std::path::Path;

use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Options, DB};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::VectorError;
use crate::item::IndexItem;

/// Column family name for stored vectors
pub const CF_VECTORS: &str = "vectors";

/// A persisted item with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredVector {
    /// Internal vector ID (key in the HNSW index)
    pub vector_id: u64,
    /// The opaque index item
    pub item: IndexItem,
    /// Embedding the item was augmented with on insertion
    pub embedding: Vec<f32>,
}

impl StoredVector {
    pub fn new(vector_id: u64, item: IndexItem, embedding: Vec<f32>) -> Self {
        Self {
            vector_id,
            item,
            embedding,
        }
    }
}

/// RocksDB-backed item store.
pub struct ItemStore {
    db: DB,
}

impl ItemStore {
    /// Open or create the store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, VectorError> {
        let path = path.as_ref();

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf = ColumnFamilyDescriptor::new(CF_VECTORS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf])?;

        info!(path = ?path, "Opened item store");
        Ok(Self { db })
    }

    fn cf(&self) -> &ColumnFamily {
        self.db.cf_handle(CF_VECTORS).expect("CF_VECTORS missing")
    }

    /// Persist a stored vector.
    pub fn put(&self, stored: &StoredVector) -> Result<(), VectorError> {
        let key = stored.vector_id.to_be_bytes();
        let value =
            serde_json::to_vec(stored).map_err(|e| VectorError::Serialization(e.to_string()))?;

        self.db.put_cf(self.cf(), key, value)?;
        debug!(vector_id = stored.vector_id, item_id = %stored.item.id, "Stored vector");
        Ok(())
    }

    /// Get a stored vector by its ID.
    pub fn get(&self, vector_id: u64) -> Result<Option<StoredVector>, VectorError> {
        let key = vector_id.to_be_bytes();
        match self.db.get_cf(self.cf(), key)? {
            Some(bytes) => {
                let stored: StoredVector = serde_json::from_slice(&bytes)
                    .map_err(|e| VectorError::Serialization(e.to_string()))?;
                Ok(Some(stored))
            }
            None => Ok(None),
        }
    }

    /// Delete a stored vector. Returns whether it existed.
    pub fn delete(&self, vector_id: u64) -> Result<bool, VectorError> {
        let key = vector_id.to_be_bytes();
        let existed = self.db.get_cf(self.cf(), key)?.is_some();
        self.db.delete_cf(self.cf(), key)?;
        Ok(existed)
    }

    /// Find the stored vector for an item ID.
    pub fn find_by_item_id(&self, item_id: &str) -> Result<Option<StoredVector>, VectorError> {
        let iter = self.db.iterator_cf(self.cf(), rocksdb::IteratorMode::Start);

        for entry in iter {
            let (_, value) = entry?;
            let stored: StoredVector = serde_json::from_slice(&value)
                .map_err(|e| VectorError::Serialization(e.to_string()))?;
            if stored.item.id == item_id {
                return Ok(Some(stored));
            }
        }

        Ok(None)
    }

    /// Get every stored vector.
    ///
    /// Used to preload the in-memory index; use with caution on large stores.
    pub fn all(&self) -> Result<Vec<StoredVector>, VectorError> {
        let mut entries = Vec::new();
        let iter = self.db.iterator_cf(self.cf(), rocksdb::IteratorMode::Start);

        for entry in iter {
            let (_, value) = entry?;
            let stored: StoredVector = serde_json::from_slice(&value)
                .map_err(|e| VectorError::Serialization(e.to_string()))?;
            entries.push(stored);
        }

        Ok(entries)
    }

    /// Count stored vectors.
    pub fn count(&self) -> Result<usize, VectorError> {
        let iter = self.db.iterator_cf(self.cf(), rocksdb::IteratorMode::Start);
        Ok(iter.count())
    }

    /// Remove every stored vector.
    pub fn clear(&self) -> Result<(), VectorError> {
        // Collect keys first to avoid iterator invalidation
        let keys: Vec<Vec<u8>> = self
            .db
            .iterator_cf(self.cf(), rocksdb::IteratorMode::Start)
            .filter_map(|entry| entry.ok().map(|(k, _)| k.to_vec()))
            .collect();

        for key in keys {
            self.db.delete_cf(self.cf(), &key)?;
        }

        debug!("Cleared item store");
        Ok(())
    }

    /// Next available vector ID.
    pub fn next_vector_id(&self) -> Result<u64, VectorError> {
        let mut iter = self.db.iterator_cf(self.cf(), rocksdb::IteratorMode::End);

        if let Some(Ok((key, _))) = iter.next() {
            let bytes: [u8; 8] = key[..8]
                .try_into()
                .map_err(|_| VectorError::Serialization("Malformed vector key".to_string()))?;
            Ok(u64::from_be_bytes(bytes) + 1)
        } else {
            Ok(1) // Start from 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample(vector_id: u64, item_id: &str) -> StoredVector {
        StoredVector::new(
            vector_id,
            IndexItem::new(item_id, "pages", "some indexed text"),
            vec![0.1, 0.2, 0.3],
        )
    }

    #[test]
    fn test_put_and_get() {
        let temp = TempDir::new().unwrap();
        let store = ItemStore::open(temp.path()).unwrap();

        store.put(&sample(1, "page:1")).unwrap();

        let stored = store.get(1).unwrap().unwrap();
        assert_eq!(stored.vector_id, 1);
        assert_eq!(stored.item.id, "page:1");
        assert_eq!(stored.embedding, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_find_by_item_id() {
        let temp = TempDir::new().unwrap();
        let store = ItemStore::open(temp.path()).unwrap();

        for i in 1..=5 {
            store.put(&sample(i, &format!("page:{}", i))).unwrap();
        }

        let found = store.find_by_item_id("page:3").unwrap().unwrap();
        assert_eq!(found.vector_id, 3);
        assert!(store.find_by_item_id("page:99").unwrap().is_none());
    }

    #[test]
    fn test_next_vector_id() {
        let temp = TempDir::new().unwrap();
        let store = ItemStore::open(temp.path()).unwrap();

        assert_eq!(store.next_vector_id().unwrap(), 1);

        store.put(&sample(42, "page:42")).unwrap();
        assert_eq!(store.next_vector_id().unwrap(), 43);
    }

    #[test]
    fn test_delete() {
        let temp = TempDir::new().unwrap();
        let store = ItemStore::open(temp.path()).unwrap();

        store.put(&sample(1, "page:1")).unwrap();
        assert!(store.delete(1).unwrap());
        assert!(store.get(1).unwrap().is_none());
        assert!(!store.delete(1).unwrap());
    }

    #[test]
    fn test_clear_and_count() {
        let temp = TempDir::new().unwrap();
        let store = ItemStore::open(temp.path()).unwrap();

        for i in 1..=5 {
            store.put(&sample(i, &format!("page:{}", i))).unwrap();
        }
        assert_eq!(store.count().unwrap(), 5);

        store.clear().unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn test_survives_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let store = ItemStore::open(temp.path()).unwrap();
            store.put(&sample(1, "page:1")).unwrap();
        }

        let store = ItemStore::open(temp.path()).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get(1).unwrap().unwrap().item.id, "page:1");
    }
}
