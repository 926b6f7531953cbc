use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};
use output::OutputWriter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(&cli.log_level)
        .json()
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(config = %cli.config.display(), "stocktake-cli starting");

    let writer = OutputWriter::new(cli.format);

    match cli.command {
        Commands::Scan(args) => commands::scan::execute(args, &cli.config, &writer).await?,
        Commands::Merge(args) => commands::merge::execute(args, &cli.config, &writer).await?,
        Commands::Coverage(args) => {
            commands::coverage::execute(args, &cli.config, &writer).await?;
        }
        Commands::Relations(args) => {
            commands::relations::execute(args, &cli.config, &writer).await?;
        }
    }

    Ok(())
}
