use anyhow::Result;
use clap::Parser;

use aurora_cli::{handle_index, handle_refresh, handle_search, handle_themes, init, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = init(cli.config.as_deref(), cli.log_level.as_deref())?;

    match cli.command {
        Commands::Themes { command } => {
            handle_themes(&settings, command)?;
        }
        Commands::Search { query, top_k } => {
            handle_search(&settings, &query, top_k).await?;
        }
        Commands::Index { path } => {
            handle_index(&settings, &path).await?;
        }
        Commands::Refresh => {
            handle_refresh(&settings).await?;
        }
    }

    Ok(())
}
