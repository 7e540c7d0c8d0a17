//! Theme catalog types.
//!
//! A `Theme` is an immutable catalog entry. A `DownloadedTheme` is the same
//! theme additionally present in local device storage; when a theme id shows
//! up in both places the local copy is redundant and gets reconciled away
//! (see the dedup-on-sync pass in aurora-themes).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A theme catalog entry. Immutable once listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Stable theme identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Short description shown in pickers
    #[serde(default)]
    pub description: String,
    /// Theme author
    #[serde(default)]
    pub author: String,
    /// Optional cover image URL
    #[serde(default)]
    pub cover_url: Option<String>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl Theme {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            author: String::new(),
            cover_url: None,
            updated_at: Utc::now(),
        }
    }
}

/// A theme variant that also lives in local device storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadedTheme {
    /// The underlying theme data
    #[serde(flatten)]
    pub theme: Theme,
    /// When the local copy was stored
    pub downloaded_at: DateTime<Utc>,
}

impl DownloadedTheme {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            downloaded_at: Utc::now(),
        }
    }

    /// Theme identifier of the local copy.
    pub fn id(&self) -> &str {
        &self.theme.id
    }
}

/// Catalog listing: all themes plus the current selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeList {
    /// Catalog entries, sorted by name
    pub themes: Vec<Theme>,
    /// Currently selected theme id, if any
    pub selected_theme: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downloaded_theme_id() {
        let dl = DownloadedTheme::new(Theme::new("midnight", "Midnight"));
        assert_eq!(dl.id(), "midnight");
    }

    #[test]
    fn test_theme_roundtrip() {
        let theme = Theme::new("paper", "Paper");
        let json = serde_json::to_string(&theme).unwrap();
        let decoded: Theme = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, theme);
    }

    #[test]
    fn test_downloaded_theme_flattens() {
        let dl = DownloadedTheme::new(Theme::new("paper", "Paper"));
        let value = serde_json::to_value(&dl).unwrap();
        // Theme fields sit at the top level of the serialized record
        assert_eq!(value["id"], "paper");
        assert!(value.get("downloaded_at").is_some());
    }
}
