//! Theme persistence.
//!
//! Three column families: the canonical catalog, locally downloaded copies,
//! and a small settings CF holding the selected-theme id.

use std::path::Path;

use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Options, DB};
use tracing::{debug, info};

use aurora_types::{DownloadedTheme, Theme};

use crate::error::ThemeError;

/// Column family for catalog entries
pub const CF_THEMES: &str = "themes";
/// Column family for locally downloaded themes
pub const CF_DOWNLOADS: &str = "downloads";
/// Column family for selection state
pub const CF_SETTINGS: &str = "settings";

const SELECTED_THEME_KEY: &[u8] = b"selected_theme";

/// RocksDB-backed theme store.
pub struct ThemeStore {
    db: DB,
}

impl ThemeStore {
    /// Open or create the store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ThemeError> {
        let path = path.as_ref();

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = vec![
            ColumnFamilyDescriptor::new(CF_THEMES, Options::default()),
            ColumnFamilyDescriptor::new(CF_DOWNLOADS, Options::default()),
            ColumnFamilyDescriptor::new(CF_SETTINGS, Options::default()),
        ];
        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        info!(path = ?path, "Opened theme store");
        Ok(Self { db })
    }

    fn cf(&self, name: &str) -> &ColumnFamily {
        self.db.cf_handle(name).expect("column family missing")
    }

    /// Store a catalog entry.
    pub fn put_theme(&self, theme: &Theme) -> Result<(), ThemeError> {
        let value =
            serde_json::to_vec(theme).map_err(|e| ThemeError::Serialization(e.to_string()))?;
        self.db.put_cf(self.cf(CF_THEMES), theme.id.as_bytes(), value)?;
        debug!(theme_id = %theme.id, "Stored theme");
        Ok(())
    }

    /// Get a catalog entry by id.
    pub fn get_theme(&self, theme_id: &str) -> Result<Option<Theme>, ThemeError> {
        match self.db.get_cf(self.cf(CF_THEMES), theme_id.as_bytes())? {
            Some(bytes) => {
                let theme: Theme = serde_json::from_slice(&bytes)
                    .map_err(|e| ThemeError::Serialization(e.to_string()))?;
                Ok(Some(theme))
            }
            None => Ok(None),
        }
    }

    /// Remove a catalog entry. Returns whether it existed.
    pub fn delete_theme(&self, theme_id: &str) -> Result<bool, ThemeError> {
        let existed = self
            .db
            .get_cf(self.cf(CF_THEMES), theme_id.as_bytes())?
            .is_some();
        self.db.delete_cf(self.cf(CF_THEMES), theme_id.as_bytes())?;
        Ok(existed)
    }

    /// All catalog entries, sorted by display name.
    pub fn list_themes(&self) -> Result<Vec<Theme>, ThemeError> {
        let mut themes = Vec::new();
        let iter = self
            .db
            .iterator_cf(self.cf(CF_THEMES), rocksdb::IteratorMode::Start);

        for entry in iter {
            let (_, value) = entry?;
            let theme: Theme = serde_json::from_slice(&value)
                .map_err(|e| ThemeError::Serialization(e.to_string()))?;
            themes.push(theme);
        }

        themes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(themes)
    }

    /// Store a locally downloaded theme.
    pub fn put_downloaded(&self, downloaded: &DownloadedTheme) -> Result<(), ThemeError> {
        let value = serde_json::to_vec(downloaded)
            .map_err(|e| ThemeError::Serialization(e.to_string()))?;
        self.db
            .put_cf(self.cf(CF_DOWNLOADS), downloaded.id().as_bytes(), value)?;
        debug!(theme_id = %downloaded.id(), "Stored downloaded theme");
        Ok(())
    }

    /// All locally downloaded themes, sorted by display name.
    pub fn downloaded_themes(&self) -> Result<Vec<DownloadedTheme>, ThemeError> {
        let mut downloaded = Vec::new();
        let iter = self
            .db
            .iterator_cf(self.cf(CF_DOWNLOADS), rocksdb::IteratorMode::Start);

        for entry in iter {
            let (_, value) = entry?;
            let theme: DownloadedTheme = serde_json::from_slice(&value)
                .map_err(|e| ThemeError::Serialization(e.to_string()))?;
            downloaded.push(theme);
        }

        downloaded.sort_by(|a, b| a.theme.name.cmp(&b.theme.name));
        Ok(downloaded)
    }

    /// Remove a local copy. Returns whether it existed.
    pub fn delete_downloaded(&self, theme_id: &str) -> Result<bool, ThemeError> {
        let existed = self
            .db
            .get_cf(self.cf(CF_DOWNLOADS), theme_id.as_bytes())?
            .is_some();
        self.db
            .delete_cf(self.cf(CF_DOWNLOADS), theme_id.as_bytes())?;
        Ok(existed)
    }

    /// Currently selected theme id.
    pub fn selected_theme(&self) -> Result<Option<String>, ThemeError> {
        match self.db.get_cf(self.cf(CF_SETTINGS), SELECTED_THEME_KEY)? {
            Some(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).to_string())),
            None => Ok(None),
        }
    }

    /// Persist the selection.
    pub fn set_selected(&self, theme_id: &str) -> Result<(), ThemeError> {
        self.db
            .put_cf(self.cf(CF_SETTINGS), SELECTED_THEME_KEY, theme_id.as_bytes())?;
        Ok(())
    }

    /// Clear the selection.
    pub fn clear_selected(&self) -> Result<(), ThemeError> {
        self.db
            .delete_cf(self.cf(CF_SETTINGS), SELECTED_THEME_KEY)?;
        Ok(())
    }
}
