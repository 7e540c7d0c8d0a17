//! fastembed adapter.
//!
//! Wraps the external `TextEmbedding` model behind the `EmbeddingModel`
//! trait. fastembed handles model download and on-disk caching itself; the
//! adapter only picks the model, the cache directory, and probes the
//! dimension after load.

use std::path::PathBuf;
use std::sync::Mutex;

use fastembed::{InitOptions, TextEmbedding};
use tracing::info;

use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Configuration for loading the fastembed model.
#[derive(Debug, Clone)]
pub struct EmbedderConfig {
    /// Model cache directory
    pub cache_dir: PathBuf,
    /// Model name, parsed into a fastembed identifier
    pub model_name: String,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("aurora")
            .join("models");

        Self {
            cache_dir,
            model_name: "all-minilm-l6-v2".to_string(),
        }
    }
}

impl EmbedderConfig {
    pub fn new(cache_dir: impl Into<PathBuf>, model_name: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            model_name: model_name.into(),
        }
    }
}

/// Embedding model backed by fastembed.
///
/// fastembed's `embed()` takes `&mut self`, hence the Mutex.
pub struct FastEmbedder {
    model: Mutex<TextEmbedding>,
    info: ModelInfo,
}

impl FastEmbedder {
    /// Load the model, downloading it into the cache directory if needed.
    pub fn load(config: &EmbedderConfig) -> Result<Self, EmbeddingError> {
        info!(model = %config.model_name, cache = ?config.cache_dir, "Loading embedding model");

        let model_id = parse_model_name(&config.model_name)?;
        std::fs::create_dir_all(&config.cache_dir)?;

        let options = InitOptions::new(model_id)
            .with_cache_dir(config.cache_dir.clone())
            .with_show_download_progress(false);

        let mut model =
            TextEmbedding::try_new(options).map_err(|e| EmbeddingError::Init(e.to_string()))?;

        let dimension = probe_dimension(&mut model)?;
        info!(dim = dimension, "Embedding model loaded");

        Ok(Self {
            model: Mutex::new(model),
            info: ModelInfo {
                name: config.model_name.clone(),
                dimension,
            },
        })
    }

    /// Load with default cache settings.
    pub fn load_default() -> Result<Self, EmbeddingError> {
        Self::load(&EmbedderConfig::default())
    }
}

impl EmbeddingModel for FastEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut batch = self.embed_batch(&[text])?;
        batch
            .pop()
            .ok_or_else(|| EmbeddingError::Inference("Empty batch result".to_string()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut model = self.model.lock().unwrap();
        let vectors = model
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbeddingError::Inference(e.to_string()))?;

        Ok(vectors.into_iter().map(Embedding::new).collect())
    }
}

/// Resolve the model's output dimension by embedding a probe string.
fn probe_dimension(model: &mut TextEmbedding) -> Result<usize, EmbeddingError> {
    let probe = model
        .embed(vec!["dimension probe"], None)
        .map_err(|e| EmbeddingError::Init(e.to_string()))?;
    probe
        .first()
        .map(|v| v.len())
        .ok_or_else(|| EmbeddingError::Init("Dimension probe returned no vector".to_string()))
}

/// Map a config-file model name onto a fastembed identifier.
fn parse_model_name(name: &str) -> Result<fastembed::EmbeddingModel, EmbeddingError> {
    match name.to_lowercase().as_str() {
        "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
        "all-minilm-l6-v2-q" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2Q),
        "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        other => Err(EmbeddingError::UnknownModel(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmbedderConfig::default();
        assert_eq!(config.model_name, "all-minilm-l6-v2");
        assert!(config.cache_dir.to_string_lossy().contains("aurora"));
    }

    #[test]
    fn test_parse_model_name() {
        assert!(parse_model_name("all-minilm-l6-v2").is_ok());
        assert!(parse_model_name("ALL-MiniLM-L6-V2").is_ok());
        assert!(matches!(
            parse_model_name("not-a-model"),
            Err(EmbeddingError::UnknownModel(_))
        ));
    }

    // Loading the real model requires a download; exercised via the CLI.
}
