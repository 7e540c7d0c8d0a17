//! Shared settings state.

use serde::{Deserialize, Serialize};

/// Mutable settings state shared between contexts.
///
/// Invariant: at most one theme is selected at a time. Selection, disable and
/// delete operations all funnel through this single field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsState {
    /// Currently selected theme id; `None` means no theme is active.
    #[serde(default)]
    pub selected_theme: Option<String>,
}

impl SettingsState {
    /// Whether the given theme id is the current selection.
    pub fn is_selected(&self, theme_id: &str) -> bool {
        self.selected_theme.as_deref() == Some(theme_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_selected() {
        let mut state = SettingsState::default();
        assert!(!state.is_selected("midnight"));

        state.selected_theme = Some("midnight".to_string());
        assert!(state.is_selected("midnight"));
        assert!(!state.is_selected("paper"));
    }
}
