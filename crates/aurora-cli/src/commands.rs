//! Command implementations.
//!
//! Each command loads settings, opens the stores it needs and runs one
//! operation. The search session is built fresh per invocation; its lazy
//! initialization means theme commands never pay for model loading.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use aurora_bus::MessageBus;
use aurora_embeddings::EmbedderConfig;
use aurora_search::{FastEmbedProvider, SearchConfig, SearchSession};
use aurora_themes::{ThemeManager, ThemeStore};
use aurora_types::{BusMessage, Settings, Theme};
use aurora_vector::{IndexItem, ItemStore};

use crate::cli::ThemeCommands;

/// Load settings and install the global tracing subscriber.
pub fn init(config_path: Option<&str>, log_level_override: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    if let Some(level) = log_level_override {
        settings.log_level = level.to_string();
    }

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    Ok(settings)
}

fn open_manager(settings: &Settings) -> Result<ThemeManager> {
    let store =
        Arc::new(ThemeStore::open(&settings.themes_db_path).context("Failed to open theme store")?);
    Ok(ThemeManager::new(store, MessageBus::<BusMessage>::new()))
}

fn open_session(settings: &Settings) -> Result<SearchSession> {
    let store =
        Arc::new(ItemStore::open(&settings.vector_db_path).context("Failed to open item store")?);
    let provider = Arc::new(FastEmbedProvider::new(EmbedderConfig::new(
        &settings.model_cache_dir,
        &settings.model_name,
    )));

    let config = SearchConfig {
        dimension: settings.embedding_dimension,
        default_top_k: settings.top_k,
        init_backoff_start: Duration::from_millis(settings.init_backoff_start_ms),
        init_backoff_max: Duration::from_millis(settings.init_backoff_max_ms),
        ..Default::default()
    };

    Ok(SearchSession::new(config, store, provider))
}

pub fn handle_themes(settings: &Settings, command: ThemeCommands) -> Result<()> {
    let manager = open_manager(settings)?;

    match command {
        ThemeCommands::List => {
            let list = manager.list_themes()?;
            if list.themes.is_empty() {
                println!("No themes in the catalog");
                return Ok(());
            }
            for theme in &list.themes {
                let marker = if list.selected_theme.as_deref() == Some(theme.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{} {}  {}", marker, theme.id, theme.name);
            }
        }
        ThemeCommands::Set { theme_id } => {
            manager.set_theme(&theme_id)?;
            println!("Selected theme: {}", theme_id);
        }
        ThemeCommands::Disable => {
            manager.disable_theme()?;
            println!("Theme disabled");
        }
        ThemeCommands::Delete { theme_id } => {
            manager.delete_theme(&theme_id)?;
            println!("Deleted theme: {}", theme_id);
        }
        ThemeCommands::Add {
            theme_id,
            name,
            description,
        } => {
            let mut theme = Theme::new(&theme_id, &name);
            theme.description = description;
            manager.install_theme(&theme)?;
            println!("Added theme: {}", theme_id);
        }
        ThemeCommands::Downloads => {
            let downloaded = manager.get_downloaded_themes()?;
            if downloaded.is_empty() {
                println!("No downloaded themes");
                return Ok(());
            }
            for dl in &downloaded {
                println!(
                    "{}  {}  (downloaded {})",
                    dl.id(),
                    dl.theme.name,
                    dl.downloaded_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        ThemeCommands::Sync => {
            let removed = manager.sync_downloads()?;
            if removed.is_empty() {
                println!("Nothing to reconcile");
            } else {
                println!("Requested removal of {} duplicate(s):", removed.len());
                for id in removed {
                    println!("  {}", id);
                }
            }
        }
    }

    Ok(())
}

pub async fn handle_search(
    settings: &Settings,
    query: &str,
    top_k: Option<usize>,
) -> Result<()> {
    let session = open_session(settings)?;
    let results = session.search(query, top_k).await?;

    if results.is_empty() {
        println!("No results");
        return Ok(());
    }
    for result in results {
        println!(
            "{:.4}  [{}] {}  {}",
            result.score,
            result.item.source,
            result.item.id,
            summarize(&result.item.text)
        );
    }

    Ok(())
}

pub async fn handle_index(settings: &Settings, path: &str) -> Result<()> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path))?;
    let items: Vec<IndexItem> =
        serde_json::from_str(&data).context("Expected a JSON array of items")?;

    let session = open_session(settings)?;
    let added = session.add_items(items).await?;
    info!(added = added, "Indexing complete");
    println!("Indexed {} item(s)", added);

    Ok(())
}

pub async fn handle_refresh(settings: &Settings) -> Result<()> {
    let session = open_session(settings)?;
    let loaded = session.refresh_cache().await?;
    println!("Cache rebuilt: {} vector(s)", loaded);
    Ok(())
}

fn summarize(text: &str) -> String {
    let mut summary: String = text.chars().take(80).collect();
    if summary.len() < text.len() {
        summary.push('…');
    }
    summary
}
