//! CLI argument parsing.

use clap::{Parser, Subcommand};

/// Aurora
///
/// Theme management and local vector search over a persisted item store.
#[derive(Parser, Debug)]
#[command(name = "aurora")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/aurora/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Theme catalog operations
    Themes {
        #[command(subcommand)]
        command: ThemeCommands,
    },

    /// Semantic search over indexed items
    Search {
        /// Search query
        query: String,

        /// Number of results
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Index items from a JSON file (array of {id, source, text})
    Index {
        /// Path to the JSON file
        path: String,
    },

    /// Rebuild the in-memory vector cache from the persisted store
    Refresh,
}

/// Theme subcommands
#[derive(Subcommand, Debug)]
pub enum ThemeCommands {
    /// List catalog themes and the current selection
    List,

    /// Select a theme
    Set {
        /// Theme id to activate
        theme_id: String,
    },

    /// Clear the current selection
    Disable,

    /// Delete a theme from the catalog
    Delete {
        /// Theme id to delete
        theme_id: String,
    },

    /// Add a theme to the catalog
    Add {
        /// Theme id
        theme_id: String,

        /// Display name
        name: String,

        /// Short description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// List locally downloaded themes
    Downloads,

    /// Reconcile downloaded themes against the catalog
    Sync,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search_with_top_k() {
        let cli = Cli::parse_from(["aurora", "search", "rust async", "-k", "5"]);
        match cli.command {
            Commands::Search { query, top_k } => {
                assert_eq!(query, "rust async");
                assert_eq!(top_k, Some(5));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
