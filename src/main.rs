//! AskVerse - conversational assistant in the terminal
//!
#![doc = "AskVerse - conversational assistant in the terminal"]
#![doc = "Main entry point for the askverse binary."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use askverse::cli::{Cli, Commands};
use askverse::commands;
use askverse::config::{Config, DEFAULT_CONFIG_PATH};
use askverse::gallery::ImageGallery;
use askverse::providers::ImageEndpoint;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    let store = commands::open_store(&config, cli.ephemeral)?;

    // Execute command
    match cli.command {
        Commands::Chat => {
            tracing::info!("Starting interactive chat mode");
            commands::chat::run_chat(config, store).await?;
        }
        Commands::Ask { question } => {
            tracing::info!("Asking a single question");
            commands::ask::run_ask(config, store, &question).await?;
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(command, store)?;
        }
        Commands::Image { command } => {
            tracing::info!("Starting image command");
            let endpoint = ImageEndpoint::new(&config.images.endpoint)?;
            let mut gallery = ImageGallery::load(store, endpoint);
            commands::images::handle_image(command, &mut gallery)?;
        }
        Commands::Theme { mode } => {
            commands::theme::handle_theme(store.as_ref(), mode)?;
        }
    }

    Ok(())
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never interleave with answers on stdout.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "askverse=debug"
    } else {
        "askverse=warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
