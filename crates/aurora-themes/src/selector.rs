//! Headless theme selection controller.
//!
//! Owns the state a picker view renders from: the catalog, the local
//! downloads, and a loading flag. Selection is debounced so a user scrubbing
//! through the list commits only the theme they settle on. A watcher task
//! re-fetches on `ThemeChanged` so selections made elsewhere show up here;
//! the watcher owns its bus subscription, so aborting the task detaches
//! exactly this selector's registration and nobody else's.

use std::sync::{Arc, Mutex, RwLock, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use aurora_bus::MessageBus;
use aurora_types::{BusMessage, DownloadedTheme, Theme};

use crate::debounce::Debouncer;
use crate::error::ThemeError;
use crate::manager::ThemeManager;
use crate::settings::SettingsHandle;

/// Quiet period for selection taps.
const SELECT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Render state for a theme picker.
#[derive(Debug, Clone, Default)]
pub struct SelectorState {
    /// Catalog entries, sorted by name
    pub themes: Vec<Theme>,
    /// Locally downloaded themes not already in the catalog
    pub downloaded: Vec<DownloadedTheme>,
    /// True until the first fetch completes
    pub loading: bool,
}

/// Headless theme picker controller.
///
/// Must be created inside a tokio runtime; construction spawns the
/// change-watcher task and debounced selections spawn timers.
pub struct ThemeSelector {
    manager: Arc<ThemeManager>,
    settings: SettingsHandle,
    state: RwLock<SelectorState>,
    select: Debouncer<String>,
    watch: Mutex<Option<JoinHandle<()>>>,
}

impl ThemeSelector {
    /// Build the selector, run the initial fetch and start watching for
    /// theme changes.
    pub fn spawn(
        manager: Arc<ThemeManager>,
        bus: MessageBus<BusMessage>,
        settings: SettingsHandle,
    ) -> Arc<Self> {
        let selector = Arc::new_cyclic(|weak: &Weak<ThemeSelector>| {
            let weak = weak.clone();
            let select = Debouncer::new(SELECT_DEBOUNCE, move |theme_id: String| {
                if let Some(selector) = weak.upgrade() {
                    selector.select_now(&theme_id);
                }
            });

            ThemeSelector {
                manager,
                settings,
                state: RwLock::new(SelectorState {
                    loading: true,
                    ..Default::default()
                }),
                select,
                watch: Mutex::new(None),
            }
        });

        selector.fetch();

        // The task owns the subscription; aborting it drops the guard and
        // deregisters exactly this watcher.
        let mut sub = bus.subscribe();
        let weak = Arc::downgrade(&selector);
        let handle = tokio::spawn(async move {
            while let Some(message) = sub.recv().await {
                if let BusMessage::ThemeChanged { theme_id } = message {
                    let Some(selector) = weak.upgrade() else {
                        break;
                    };
                    debug!(theme_id = ?theme_id, "Theme changed, re-fetching");
                    selector.fetch();
                }
            }
        });
        *selector.watch.lock().unwrap() = Some(handle);

        selector
    }

    /// Snapshot of the current render state.
    pub fn state(&self) -> SelectorState {
        self.state.read().unwrap().clone()
    }

    /// Request selection of a theme id. Debounced; rapid repeated requests
    /// collapse to the last one.
    pub fn select(&self, theme_id: &str) {
        self.select.call(theme_id.to_string());
    }

    /// Apply a selection immediately.
    ///
    /// Selecting the already-active theme disables it. Unknown ids are
    /// ignored. Errors are absorbed into a log line so a failed tap never
    /// tears down the picker.
    pub fn select_now(&self, theme_id: &str) {
        if self.settings.selected_theme().as_deref() == Some(theme_id) {
            if let Err(e) = self.manager.disable_theme() {
                warn!(theme_id = %theme_id, error = %e, "Failed to disable theme");
                return;
            }
            self.settings.update(|s| s.selected_theme = None);
            return;
        }

        let known = self
            .state
            .read()
            .unwrap()
            .themes
            .iter()
            .any(|t| t.id == theme_id);
        if !known {
            debug!(theme_id = %theme_id, "Ignoring selection of unknown theme");
            return;
        }

        match self.manager.set_theme(theme_id) {
            Ok(()) => {
                let id = theme_id.to_string();
                self.settings.update(|s| s.selected_theme = Some(id));
            }
            Err(e) => warn!(theme_id = %theme_id, error = %e, "Failed to set theme"),
        }
    }

    /// Delete a theme from the catalog.
    ///
    /// The listing stays intact apart from the removed entry; if the deleted
    /// theme was selected the selection is cleared.
    pub fn delete(&self, theme_id: &str) {
        match self.manager.delete_theme(theme_id) {
            Ok(()) => {
                let id = theme_id.to_string();
                self.settings.update(|s| {
                    if s.selected_theme.as_deref() == Some(&id) {
                        s.selected_theme = None;
                    }
                });
            }
            Err(e) => warn!(theme_id = %theme_id, error = %e, "Failed to delete theme"),
        }
    }

    /// Reload catalog and downloads, reconciling duplicates first.
    ///
    /// Failures degrade to an empty listing rather than propagate; the
    /// loading flag always clears.
    pub fn fetch(&self) {
        match self.try_fetch() {
            Ok(state) => {
                *self.state.write().unwrap() = state;
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch themes");
                *self.state.write().unwrap() = SelectorState {
                    loading: false,
                    ..Default::default()
                };
            }
        }
    }

    fn try_fetch(&self) -> Result<SelectorState, ThemeError> {
        let duplicates = self.manager.sync_downloads()?;

        let list = self.manager.list_themes()?;
        let downloaded = self
            .manager
            .get_downloaded_themes()?
            .into_iter()
            .filter(|d| !duplicates.iter().any(|id| id == d.id()))
            .collect();

        self.settings
            .update(|s| s.selected_theme = list.selected_theme.clone());

        Ok(SelectorState {
            themes: list.themes,
            downloaded,
            loading: false,
        })
    }

    /// Stop watching for theme changes. Idempotent.
    pub fn close(&self) {
        if let Some(handle) = self.watch.lock().unwrap().take() {
            handle.abort();
            debug!("Theme selector closed");
        }
    }
}

impl Drop for ThemeSelector {
    fn drop(&mut self) {
        self.close();
    }
}
