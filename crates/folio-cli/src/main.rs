mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use folio_config::Settings;
use folio_core::PortfolioConfig;
use folio_engine::Studio;
use folio_storage::Storage;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    if let cli::Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut cli::Cli::command(), "folio", &mut std::io::stdout());
        return Ok(());
    }

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    // RUST_LOG wins over the settings file
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Initialize storage once (creates connection pool and runs migrations)
    let storage = Storage::new(settings.storage.path.clone()).await?;
    let defaults = PortfolioConfig::with_style(settings.defaults.layout, settings.defaults.theme);
    let mut studio = Studio::open(storage, &settings.profile.owner, defaults).await?;

    match cli.command {
        cli::Commands::Stats(cmd) => commands::stats::handle(cmd, &studio, &settings).await,
        cli::Commands::Design(cmd) => commands::design::handle(cmd, &mut studio).await,
        cli::Commands::Export(cmd) => commands::export::handle(cmd, &studio).await,
        cli::Commands::Completions { .. } => Ok(()),
    }
}
