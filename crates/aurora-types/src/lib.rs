//! # aurora-types
//!
//! Shared domain types for the Aurora client backend.
//!
//! This crate defines the data structures used throughout the workspace:
//! - Themes: catalog entries and locally downloaded variants
//! - Settings state: the nullable selected-theme field shared across contexts
//! - Bus messages: the fire-and-forget cross-context wire enum
//! - Settings: layered configuration loading

pub mod config;
pub mod error;
pub mod message;
pub mod settings;
pub mod theme;

pub use config::Settings;
pub use error::AuroraError;
pub use message::BusMessage;
pub use settings::SettingsState;
pub use theme::{DownloadedTheme, Theme, ThemeList};
