//! Corpora CLI - Command-line interface for the corpus engine.

use clap::Parser;
use corpora_cli::commands;
use corpora_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> corpora_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Logs go to stderr, results to stdout
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(&cli.config)?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Ingest(args) => {
            commands::execute_ingest(args, &config, format, &formatter).await?;
        }
        Command::Embed => {
            commands::execute_embed(&config, &formatter).await?;
        }
        Command::Query(args) => {
            commands::execute_query(args, &config, &formatter).await?;
        }
        Command::Sentences(args) => {
            commands::execute_sentences(args, &config, &formatter).await?;
        }
        Command::Properties => {
            commands::execute_properties(&config, &formatter).await?;
        }
    }

    Ok(())
}
