//! Cross-context bus messages.
//!
//! Messages are fire-and-forget and serialize as `{"type": ..., "body": ...}`
//! so they stay compatible with the host app's runtime channel.

use serde::{Deserialize, Serialize};

/// Message published on the cross-context bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "body", rename_all = "camelCase")]
pub enum BusMessage {
    /// The active theme changed; observers should re-fetch the catalog.
    ThemeChanged {
        /// New selection, `None` when the theme was disabled
        theme_id: Option<String>,
    },

    /// A locally downloaded theme is redundant and should be removed.
    DeleteDownloadedTheme { theme_id: String },

    /// The persisted search index was mutated externally; sessions should
    /// refresh their in-memory cache.
    IndexUpdated,
}
