//! Vector search session.
//!
//! Owns the lazily created embedding model and in-memory index. All entry
//! points funnel through `ensure_ready`, which runs initialization
//! single-flight: concurrent callers that both observe "uninitialized" share
//! one attempt instead of racing redundant model loads.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use backoff::{backoff::Backoff, ExponentialBackoff};
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use aurora_embeddings::{Embedding, EmbeddingModel};
use aurora_vector::{
    HnswConfig, HnswIndex, IndexItem, ItemStore, StoredVector, VectorIndex,
};

use crate::error::SearchError;
use crate::provider::ModelProvider;

/// Search session configuration.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Expected embedding dimension; the loaded model is authoritative and a
    /// mismatch is only logged.
    pub dimension: usize,
    /// Nearest neighbors returned when the caller does not ask for a count
    pub default_top_k: usize,
    /// Queries are truncated to this many characters before embedding
    pub max_query_chars: usize,
    /// Initial cooldown after a failed initialization
    pub init_backoff_start: Duration,
    /// Upper bound on the cooldown
    pub init_backoff_max: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            dimension: 384,
            default_top_k: 10,
            max_query_chars: 100,
            init_backoff_start: Duration::from_millis(500),
            init_backoff_max: Duration::from_secs(30),
        }
    }
}

/// A search hit: the stored item enriched with its embedding.
#[derive(Debug, Clone)]
pub struct VectorSearchResult {
    /// Similarity score (higher = more similar)
    pub score: f32,
    /// The matched item
    pub item: IndexItem,
    /// Embedding the item was stored with
    pub embedding: Vec<f32>,
}

/// Everything that exists only after a successful initialization.
struct Ready {
    embedder: Arc<dyn EmbeddingModel>,
    index: HnswIndex,
}

/// Failure memoization for initialization.
struct RetryState {
    backoff: ExponentialBackoff,
    not_before: Option<Instant>,
    failures: u32,
}

impl RetryState {
    fn new(config: &SearchConfig) -> Self {
        Self {
            backoff: new_backoff(config),
            not_before: None,
            failures: 0,
        }
    }
}

fn new_backoff(config: &SearchConfig) -> ExponentialBackoff {
    ExponentialBackoff {
        initial_interval: config.init_backoff_start,
        max_interval: config.init_backoff_max,
        max_elapsed_time: None,
        ..Default::default()
    }
}

/// Lazily initialized vector search session.
///
/// Pass by reference (or `Arc`); there is no global instance.
pub struct SearchSession {
    config: SearchConfig,
    store: Arc<ItemStore>,
    provider: Arc<dyn ModelProvider>,
    ready: OnceCell<Ready>,
    retry: Mutex<RetryState>,
}

impl SearchSession {
    pub fn new(
        config: SearchConfig,
        store: Arc<ItemStore>,
        provider: Arc<dyn ModelProvider>,
    ) -> Self {
        let retry = Mutex::new(RetryState::new(&config));
        Self {
            config,
            store,
            provider,
            ready: OnceCell::new(),
            retry,
        }
    }

    /// Whether initialization has completed.
    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    /// Number of vectors currently in the in-memory index.
    pub fn vector_count(&self) -> usize {
        self.ready.get().map(|r| r.index.len()).unwrap_or(0)
    }

    /// Initialize the session if it is not ready yet.
    ///
    /// Single-flight: concurrent callers share one attempt. A failed attempt
    /// leaves the session uninitialized and arms a cooldown; calls landing
    /// inside the cooldown fail fast with `SearchError::Cooldown`.
    pub async fn ensure_ready(&self) -> Result<(), SearchError> {
        self.ready_ref().await.map(|_| ())
    }

    async fn ready_ref(&self) -> Result<&Ready, SearchError> {
        self.ready.get_or_try_init(|| self.initialize()).await
    }

    async fn initialize(&self) -> Result<Ready, SearchError> {
        {
            let retry = self.retry.lock().unwrap();
            if let Some(at) = retry.not_before {
                let now = Instant::now();
                if now < at {
                    let retry_in = at - now;
                    debug!(retry_in_ms = retry_in.as_millis() as u64, "Init cooling down");
                    return Err(SearchError::Cooldown {
                        retry_in_ms: retry_in.as_millis() as u64,
                    });
                }
            }
        }

        match self.try_initialize().await {
            Ok(ready) => {
                let mut retry = self.retry.lock().unwrap();
                *retry = RetryState::new(&self.config);
                Ok(ready)
            }
            Err(e) => {
                let mut retry = self.retry.lock().unwrap();
                retry.failures += 1;
                let delay = retry
                    .backoff
                    .next_backoff()
                    .unwrap_or(self.config.init_backoff_max);
                retry.not_before = Some(Instant::now() + delay);
                error!(
                    error = %e,
                    attempts = retry.failures,
                    next_attempt_in_ms = delay.as_millis() as u64,
                    "Search session initialization failed"
                );
                Err(e)
            }
        }
    }

    async fn try_initialize(&self) -> Result<Ready, SearchError> {
        info!("Initializing search session");

        let provider = Arc::clone(&self.provider);
        let embedder = tokio::task::spawn_blocking(move || provider.load())
            .await
            .map_err(|e| SearchError::Task(e.to_string()))??;

        let dimension = embedder.info().dimension;
        if dimension != self.config.dimension {
            warn!(
                configured = self.config.dimension,
                actual = dimension,
                "Model dimension differs from configuration"
            );
        }

        let index = HnswIndex::create(HnswConfig::new(dimension))?;
        let loaded = preload(&self.store, &index)?;

        info!(
            model = %embedder.info().name,
            dim = dimension,
            vectors = loaded,
            "Search session ready"
        );

        Ok(Ready { embedder, index })
    }

    /// Embed the query and return its top-K nearest items.
    ///
    /// The query is truncated to `max_query_chars` before embedding to cap
    /// embedding cost. Results come back best-first, de-duplicated by item
    /// id, each enriched with the embedding it was stored with. Failures
    /// after initialization propagate to the caller.
    pub async fn search(
        &self,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<VectorSearchResult>, SearchError> {
        let ready = self.ready_ref().await?;
        let top_k = top_k.unwrap_or(self.config.default_top_k);

        let truncated = truncate_chars(query, self.config.max_query_chars);
        debug!(query = %truncated, top_k = top_k, "Vector search");

        let embedding = self.embed(ready, truncated.to_string()).await?;
        let hits = ready.index.search(&embedding, top_k)?;

        let mut seen = HashSet::new();
        let mut results = Vec::new();
        for hit in hits {
            if let Some(stored) = self.store.get(hit.vector_id)? {
                // Hits arrive best-first, so the first occurrence wins
                if seen.insert(stored.item.id.clone()) {
                    results.push(VectorSearchResult {
                        score: hit.score,
                        item: stored.item,
                        embedding: stored.embedding,
                    });
                }
            }
        }

        debug!(results = results.len(), "Vector search complete");
        Ok(results)
    }

    /// Drop the in-memory index and rebuild it from the persisted store.
    ///
    /// Used to resynchronize after the store was mutated externally; a
    /// subsequent search reflects only the store's current contents. Returns
    /// the number of vectors loaded.
    pub async fn refresh_cache(&self) -> Result<usize, SearchError> {
        let ready = self.ready_ref().await?;
        ready.index.clear()?;
        let loaded = preload(&self.store, &ready.index)?;
        info!(vectors = loaded, "Refreshed vector cache");
        Ok(loaded)
    }

    /// Embed items and insert them into the store and the live index.
    ///
    /// Items whose id is already stored, or whose text is empty, are
    /// skipped. Returns the number of items added.
    pub async fn add_items(&self, items: Vec<IndexItem>) -> Result<usize, SearchError> {
        let ready = self.ready_ref().await?;
        let mut added = 0;

        for item in items {
            if item.text.trim().is_empty() {
                debug!(item_id = %item.id, "Empty text, skipping");
                continue;
            }
            if self.store.find_by_item_id(&item.id)?.is_some() {
                debug!(item_id = %item.id, "Already indexed, skipping");
                continue;
            }

            let embedding = self.embed(ready, item.text.clone()).await?;
            let vector_id = self.store.next_vector_id()?;

            self.store
                .put(&StoredVector::new(vector_id, item, embedding.values.clone()))?;
            ready.index.add(vector_id, &embedding)?;
            added += 1;
        }

        debug!(added = added, "Items indexed");
        Ok(added)
    }

    async fn embed(&self, ready: &Ready, text: String) -> Result<Embedding, SearchError> {
        let embedder = Arc::clone(&ready.embedder);
        let embedding = tokio::task::spawn_blocking(move || embedder.embed(&text))
            .await
            .map_err(|e| SearchError::Task(e.to_string()))??;
        Ok(embedding)
    }
}

/// Load every persisted vector into the index. Entries whose dimension does
/// not match the index (stale snapshot from another model) are skipped.
fn preload(store: &ItemStore, index: &HnswIndex) -> Result<usize, SearchError> {
    let mut loaded = 0;
    for stored in store.all()? {
        if stored.embedding.len() != index.dimension() {
            warn!(
                vector_id = stored.vector_id,
                dim = stored.embedding.len(),
                "Skipping stale vector with wrong dimension"
            );
            continue;
        }
        index.add(
            stored.vector_id,
            &Embedding::from_normalized(stored.embedding),
        )?;
        loaded += 1;
    }
    Ok(loaded)
}

/// Truncate on a character boundary.
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurora_embeddings::{EmbeddingError, ModelInfo};
    use std::sync::atomic::{AtomicU32, Ordering};
    use tempfile::TempDir;

    const DIM: usize = 8;

    /// Deterministic embedder: same text, same vector. Records inputs so
    /// tests can assert on what actually got embedded.
    struct MockEmbedder {
        info: ModelInfo,
        inputs: Mutex<Vec<String>>,
    }

    impl MockEmbedder {
        fn new() -> Self {
            Self {
                info: ModelInfo {
                    name: "mock".to_string(),
                    dimension: DIM,
                },
                inputs: Mutex::new(Vec::new()),
            }
        }
    }

    impl EmbeddingModel for MockEmbedder {
        fn info(&self) -> &ModelInfo {
            &self.info
        }

        fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
            self.inputs.lock().unwrap().push(text.to_string());
            let mut values = vec![0.1f32; DIM];
            for (i, b) in text.bytes().enumerate() {
                values[(i + b as usize) % DIM] += b as f32;
            }
            Ok(Embedding::new(values))
        }
    }

    /// Provider that fails the first `fail_first` loads, then hands out a
    /// shared mock embedder.
    struct FlakyProvider {
        fail_first: u32,
        loads: AtomicU32,
        embedder: Arc<MockEmbedder>,
    }

    impl FlakyProvider {
        fn new(fail_first: u32) -> Self {
            Self {
                fail_first,
                loads: AtomicU32::new(0),
                embedder: Arc::new(MockEmbedder::new()),
            }
        }

        fn load_count(&self) -> u32 {
            self.loads.load(Ordering::SeqCst)
        }
    }

    impl ModelProvider for FlakyProvider {
        fn load(&self) -> Result<Arc<dyn EmbeddingModel>, EmbeddingError> {
            let attempt = self.loads.fetch_add(1, Ordering::SeqCst);
            if attempt < self.fail_first {
                return Err(EmbeddingError::Init("model unavailable".to_string()));
            }
            Ok(self.embedder.clone() as Arc<dyn EmbeddingModel>)
        }
    }

    fn test_config() -> SearchConfig {
        SearchConfig {
            dimension: DIM,
            init_backoff_start: Duration::from_millis(1),
            init_backoff_max: Duration::from_millis(5),
            ..Default::default()
        }
    }

    fn session_with(
        temp: &TempDir,
        provider: Arc<FlakyProvider>,
        config: SearchConfig,
    ) -> (SearchSession, Arc<ItemStore>) {
        let store = Arc::new(ItemStore::open(temp.path()).unwrap());
        let session = SearchSession::new(config, store.clone(), provider);
        (session, store)
    }

    #[tokio::test]
    async fn test_search_truncates_long_queries() {
        let temp = TempDir::new().unwrap();
        let provider = Arc::new(FlakyProvider::new(0));
        let (session, _store) = session_with(&temp, provider.clone(), test_config());

        let long_query: String = "é".repeat(250);
        session.search(&long_query, None).await.unwrap();

        let inputs = provider.embedder.inputs.lock().unwrap();
        let embedded = inputs.last().unwrap();
        assert_eq!(embedded.chars().count(), 100);
    }

    #[tokio::test]
    async fn test_short_query_untouched() {
        let temp = TempDir::new().unwrap();
        let provider = Arc::new(FlakyProvider::new(0));
        let (session, _store) = session_with(&temp, provider.clone(), test_config());

        session.search("hello", None).await.unwrap();

        let inputs = provider.embedder.inputs.lock().unwrap();
        assert_eq!(inputs.last().unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_add_and_search() {
        let temp = TempDir::new().unwrap();
        let provider = Arc::new(FlakyProvider::new(0));
        let (session, _store) = session_with(&temp, provider, test_config());

        let added = session
            .add_items(vec![
                IndexItem::new("page:1", "pages", "rust borrow checker"),
                IndexItem::new("page:2", "pages", "gardening in spring"),
            ])
            .await
            .unwrap();
        assert_eq!(added, 2);

        let results = session.search("rust borrow checker", None).await.unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].item.id, "page:1");
        assert_eq!(results[0].embedding.len(), DIM);
    }

    #[tokio::test]
    async fn test_default_top_k_is_ten() {
        let temp = TempDir::new().unwrap();
        let provider = Arc::new(FlakyProvider::new(0));
        let (session, _store) = session_with(&temp, provider, test_config());

        let items: Vec<IndexItem> = (0..15)
            .map(|i| IndexItem::new(format!("page:{}", i), "pages", format!("document {}", i)))
            .collect();
        session.add_items(items).await.unwrap();

        let results = session.search("document", None).await.unwrap();
        assert_eq!(results.len(), 10);

        let results = session.search("document", Some(3)).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_items_deduped() {
        let temp = TempDir::new().unwrap();
        let provider = Arc::new(FlakyProvider::new(0));
        let (session, store) = session_with(&temp, provider, test_config());

        // Two vectors persisted under the same item id (external indexer
        // wrote twice); preload picks up both.
        let item = IndexItem::new("page:1", "pages", "duplicated entry");
        store
            .put(&StoredVector::new(1, item.clone(), vec![0.5; DIM]))
            .unwrap();
        store
            .put(&StoredVector::new(2, item, vec![0.4; DIM]))
            .unwrap();

        let results = session.search("duplicated entry", None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item.id, "page:1");
    }

    #[tokio::test]
    async fn test_refresh_reflects_external_mutation() {
        let temp = TempDir::new().unwrap();
        let provider = Arc::new(FlakyProvider::new(0));
        let (session, store) = session_with(&temp, provider, test_config());

        session
            .add_items(vec![IndexItem::new("page:old", "pages", "old content")])
            .await
            .unwrap();
        let results = session.search("content", None).await.unwrap();
        assert_eq!(results[0].item.id, "page:old");

        // External mutation: old entry removed, new one written directly
        let old = store.find_by_item_id("page:old").unwrap().unwrap();
        store.delete(old.vector_id).unwrap();
        store
            .put(&StoredVector::new(
                10,
                IndexItem::new("page:new", "pages", "new content"),
                vec![0.3; DIM],
            ))
            .unwrap();

        session.refresh_cache().await.unwrap();

        let results = session.search("content", None).await.unwrap();
        assert!(results.iter().all(|r| r.item.id != "page:old"));
        assert!(results.iter().any(|r| r.item.id == "page:new"));
    }

    #[tokio::test]
    async fn test_init_failure_then_recovery() {
        let temp = TempDir::new().unwrap();
        let provider = Arc::new(FlakyProvider::new(2));
        let (session, _store) = session_with(&temp, provider.clone(), test_config());

        assert!(session.search("query", None).await.is_err());
        assert!(!session.is_ready());

        // Cooldowns are 1-5 ms in the test config; wait them out
        for _ in 0..20 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if session.search("query", None).await.is_ok() {
                break;
            }
        }

        assert!(session.is_ready());
        assert!(session.search("query", None).await.is_ok());
        assert_eq!(provider.load_count(), 3);
    }

    #[tokio::test]
    async fn test_cooldown_fails_fast() {
        let temp = TempDir::new().unwrap();
        let provider = Arc::new(FlakyProvider::new(u32::MAX));
        let config = SearchConfig {
            dimension: DIM,
            init_backoff_start: Duration::from_secs(60),
            init_backoff_max: Duration::from_secs(60),
            ..Default::default()
        };
        let (session, _store) = session_with(&temp, provider.clone(), config);

        assert!(matches!(
            session.search("query", None).await,
            Err(SearchError::Embedding(_))
        ));
        assert!(matches!(
            session.search("query", None).await,
            Err(SearchError::Cooldown { .. })
        ));
        // The second call never reached the provider
        assert_eq!(provider.load_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_calls_share_one_init() {
        let temp = TempDir::new().unwrap();
        let provider = Arc::new(FlakyProvider::new(0));
        let (session, _store) = session_with(&temp, provider.clone(), test_config());
        let session = Arc::new(session);

        let mut handles = Vec::new();
        for i in 0..8 {
            let session = session.clone();
            handles.push(tokio::spawn(async move {
                session.search(&format!("query {}", i), None).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(provider.load_count(), 1);
    }

    #[tokio::test]
    async fn test_preload_skips_stale_dimensions() {
        let temp = TempDir::new().unwrap();
        let provider = Arc::new(FlakyProvider::new(0));
        let (session, store) = session_with(&temp, provider, test_config());

        store
            .put(&StoredVector::new(
                1,
                IndexItem::new("page:stale", "pages", "stale"),
                vec![0.5; DIM + 4],
            ))
            .unwrap();
        store
            .put(&StoredVector::new(
                2,
                IndexItem::new("page:good", "pages", "good"),
                vec![0.5; DIM],
            ))
            .unwrap();

        session.ensure_ready().await.unwrap();
        assert_eq!(session.vector_count(), 1);
    }

    #[test]
    fn test_truncate_chars_multibyte_boundary() {
        let s = "日本語のテキスト";
        assert_eq!(truncate_chars(s, 3), "日本語");
        assert_eq!(truncate_chars(s, 100), s);
        assert_eq!(truncate_chars("", 5), "");
    }
}
