//! Configuration loading.
//!
//! Layered precedence: built-in defaults -> config file
//! (~/.config/aurora/config.toml) -> optional CLI-specified file ->
//! environment variables (AURORA_*). CLI flags are applied by the caller
//! after loading.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::AuroraError;

/// Workspace-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Theme catalog database path
    #[serde(default = "default_themes_db_path")]
    pub themes_db_path: String,

    /// Vector item store path
    #[serde(default = "default_vector_db_path")]
    pub vector_db_path: String,

    /// Embedding model cache directory
    #[serde(default = "default_model_cache_dir")]
    pub model_cache_dir: String,

    /// Embedding model name (fastembed identifier)
    #[serde(default = "default_model_name")]
    pub model_name: String,

    /// Embedding dimension (must match the model)
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,

    /// Default number of nearest neighbors per search
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Initial cooldown after a failed session initialization (ms)
    #[serde(default = "default_init_backoff_start_ms")]
    pub init_backoff_start_ms: u64,

    /// Upper bound on the initialization cooldown (ms)
    #[serde(default = "default_init_backoff_max_ms")]
    pub init_backoff_max_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn project_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "aurora")
        .map(|p| p.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./data"))
}

fn default_themes_db_path() -> String {
    project_data_dir().join("themes-db").to_string_lossy().to_string()
}

fn default_vector_db_path() -> String {
    project_data_dir()
        .join("vector-store")
        .to_string_lossy()
        .to_string()
}

fn default_model_cache_dir() -> String {
    ProjectDirs::from("", "", "aurora")
        .map(|p| p.cache_dir().join("models"))
        .unwrap_or_else(|| PathBuf::from("./models"))
        .to_string_lossy()
        .to_string()
}

fn default_model_name() -> String {
    "all-minilm-l6-v2".to_string()
}

fn default_embedding_dimension() -> usize {
    384
}

fn default_top_k() -> usize {
    10
}

fn default_init_backoff_start_ms() -> u64 {
    500
}

fn default_init_backoff_max_ms() -> u64 {
    30_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            themes_db_path: default_themes_db_path(),
            vector_db_path: default_vector_db_path(),
            model_cache_dir: default_model_cache_dir(),
            model_name: default_model_name(),
            embedding_dimension: default_embedding_dimension(),
            top_k: default_top_k(),
            init_backoff_start_ms: default_init_backoff_start_ms(),
            init_backoff_max_ms: default_init_backoff_max_ms(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/aurora/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (AURORA_*)
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, AuroraError> {
        let config_dir = ProjectDirs::from("", "", "aurora")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("themes_db_path", defaults.themes_db_path)
            .map_err(|e| AuroraError::Config(e.to_string()))?
            .set_default("vector_db_path", defaults.vector_db_path)
            .map_err(|e| AuroraError::Config(e.to_string()))?
            .set_default("model_cache_dir", defaults.model_cache_dir)
            .map_err(|e| AuroraError::Config(e.to_string()))?
            .set_default("model_name", defaults.model_name)
            .map_err(|e| AuroraError::Config(e.to_string()))?
            .set_default("embedding_dimension", defaults.embedding_dimension as i64)
            .map_err(|e| AuroraError::Config(e.to_string()))?
            .set_default("top_k", defaults.top_k as i64)
            .map_err(|e| AuroraError::Config(e.to_string()))?
            .set_default("init_backoff_start_ms", defaults.init_backoff_start_ms as i64)
            .map_err(|e| AuroraError::Config(e.to_string()))?
            .set_default("init_backoff_max_ms", defaults.init_backoff_max_ms as i64)
            .map_err(|e| AuroraError::Config(e.to_string()))?
            .set_default("log_level", defaults.log_level)
            .map_err(|e| AuroraError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(Environment::with_prefix("AURORA").try_parsing(true));

        let config = builder
            .build()
            .map_err(|e| AuroraError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AuroraError::Config(e.to_string()))
    }
}
