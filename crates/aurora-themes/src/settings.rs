//! Shared settings handle.

use std::sync::{Arc, RwLock};

use aurora_types::SettingsState;

/// Shared, mutable settings state.
///
/// Cheap to clone; clones share the same state. Mutation goes through the
/// functional updater so callers never hold the lock across other work.
#[derive(Clone, Default)]
pub struct SettingsHandle {
    inner: Arc<RwLock<SettingsState>>,
}

impl SettingsHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current state.
    pub fn get(&self) -> SettingsState {
        self.inner.read().unwrap().clone()
    }

    /// Apply an update function to the state.
    pub fn update(&self, f: impl FnOnce(&mut SettingsState)) {
        let mut state = self.inner.write().unwrap();
        f(&mut state);
    }

    /// Currently selected theme id.
    pub fn selected_theme(&self) -> Option<String> {
        self.inner.read().unwrap().selected_theme.clone()
    }
}
