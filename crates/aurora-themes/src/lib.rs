//! # aurora-themes
//!
//! Theme management for the Aurora client.
//!
//! Layers, bottom up:
//! - `ThemeStore`: RocksDB persistence for the catalog, local downloads and
//!   the selected-theme setting.
//! - `ThemeManager`: the operations surface (list, set, disable, delete,
//!   download sync) plus change notifications on the message bus.
//! - `SettingsHandle`: shared settings state with a functional updater.
//! - `ThemeSelector`: headless controller a view layer renders from —
//!   debounced selection, catalog fetching with dedup-on-sync, and a
//!   theme-changed watcher that detaches cleanly on close.

pub mod debounce;
pub mod error;
pub mod manager;
pub mod selector;
pub mod settings;
pub mod store;

pub use debounce::Debouncer;
pub use error::ThemeError;
pub use manager::ThemeManager;
pub use selector::{SelectorState, ThemeSelector};
pub use settings::SettingsHandle;
pub use store::ThemeStore;
