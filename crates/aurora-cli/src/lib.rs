//! # aurora-cli
//!
//! Command-line interface over the theme catalog and the vector search
//! session.
//!
//! # Usage
//!
//! ```bash
//! aurora themes list
//! aurora themes set <theme-id>
//! aurora search "query text" -k 5
//! aurora refresh
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/aurora/config.toml)
//! 3. CLI-specified config file (--config)
//! 4. Environment variables (AURORA_*)
//! 5. CLI flags

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, ThemeCommands};
pub use commands::{handle_index, handle_refresh, handle_search, handle_themes, init};
