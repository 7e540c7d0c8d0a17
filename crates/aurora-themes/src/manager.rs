//! Theme operations.
//!
//! The manager is the single surface mutating theme state. Every mutating
//! selection operation publishes `ThemeChanged` so selectors in any context
//! can re-fetch.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use aurora_bus::MessageBus;
use aurora_types::{BusMessage, DownloadedTheme, Theme, ThemeList};

use crate::error::ThemeError;
use crate::store::ThemeStore;

/// Theme management operations over the store and the bus.
pub struct ThemeManager {
    store: Arc<ThemeStore>,
    bus: MessageBus<BusMessage>,
}

impl ThemeManager {
    pub fn new(store: Arc<ThemeStore>, bus: MessageBus<BusMessage>) -> Self {
        Self { store, bus }
    }

    /// Catalog plus the current selection.
    pub fn list_themes(&self) -> Result<ThemeList, ThemeError> {
        Ok(ThemeList {
            themes: self.store.list_themes()?,
            selected_theme: self.store.selected_theme()?,
        })
    }

    /// Locally downloaded themes.
    pub fn get_downloaded_themes(&self) -> Result<Vec<DownloadedTheme>, ThemeError> {
        self.store.downloaded_themes()
    }

    /// Add a theme to the catalog.
    pub fn install_theme(&self, theme: &Theme) -> Result<(), ThemeError> {
        self.store.put_theme(theme)
    }

    /// Store a local download.
    pub fn install_downloaded(&self, downloaded: &DownloadedTheme) -> Result<(), ThemeError> {
        self.store.put_downloaded(downloaded)
    }

    /// Activate a theme. Errors if the id is not in the catalog.
    pub fn set_theme(&self, theme_id: &str) -> Result<(), ThemeError> {
        if self.store.get_theme(theme_id)?.is_none() {
            return Err(ThemeError::NotFound(theme_id.to_string()));
        }

        self.store.set_selected(theme_id)?;
        info!(theme_id = %theme_id, "Theme selected");
        self.bus.publish(BusMessage::ThemeChanged {
            theme_id: Some(theme_id.to_string()),
        });
        Ok(())
    }

    /// Clear the selection.
    pub fn disable_theme(&self) -> Result<(), ThemeError> {
        self.store.clear_selected()?;
        info!("Theme disabled");
        self.bus
            .publish(BusMessage::ThemeChanged { theme_id: None });
        Ok(())
    }

    /// Remove a theme from the catalog; clears the selection iff the theme
    /// was selected.
    pub fn delete_theme(&self, theme_id: &str) -> Result<(), ThemeError> {
        if !self.store.delete_theme(theme_id)? {
            return Err(ThemeError::NotFound(theme_id.to_string()));
        }

        let selected = self.store.selected_theme()?;
        if selected.as_deref() == Some(theme_id) {
            self.store.clear_selected()?;
        }

        info!(theme_id = %theme_id, "Theme deleted");
        self.bus.publish(BusMessage::ThemeChanged {
            theme_id: self.store.selected_theme()?,
        });
        Ok(())
    }

    /// Remove a local copy. Returns whether it existed.
    pub fn remove_downloaded(&self, theme_id: &str) -> Result<bool, ThemeError> {
        let removed = self.store.delete_downloaded(theme_id)?;
        if removed {
            debug!(theme_id = %theme_id, "Removed downloaded theme");
        }
        Ok(removed)
    }

    /// Reconcile local downloads against the catalog.
    ///
    /// A theme present in both places makes the local copy redundant:
    /// exactly one `DeleteDownloadedTheme` message is published per
    /// duplicate id. Returns the duplicate ids.
    pub fn sync_downloads(&self) -> Result<Vec<String>, ThemeError> {
        let catalog: HashSet<String> = self
            .store
            .list_themes()?
            .into_iter()
            .map(|t| t.id)
            .collect();

        let mut duplicates = Vec::new();
        let mut seen = HashSet::new();
        for downloaded in self.store.downloaded_themes()? {
            let id = downloaded.id();
            if catalog.contains(id) && seen.insert(id.to_string()) {
                debug!(theme_id = %id, "Duplicate download, requesting removal");
                self.bus.publish(BusMessage::DeleteDownloadedTheme {
                    theme_id: id.to_string(),
                });
                duplicates.push(id.to_string());
            }
        }

        Ok(duplicates)
    }
}
