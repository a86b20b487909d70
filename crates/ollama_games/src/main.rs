//! Ollama Games - unified CLI.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use ollama_games::{HubConfig, server, tui};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, host, port } => {
            init_tracing();
            let config = load_config(&config)?.with_listen(host, port);
            info!(host = %config.host(), port = config.port(), "Starting Ollama Games hub");
            server::serve(&config).await
        }
        Command::Gateway { config, host, port } => {
            init_tracing();
            let config = load_config(&config)?.with_listen(host, port);
            info!(host = %config.host(), port = config.port(), "Starting completion gateway");
            server::serve_gateway(&config).await
        }
        Command::Play {
            config,
            gateway_url,
        } => {
            let config = load_config(&config)?.with_gateway_url(gateway_url);
            tui::run_tui(config).await
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,ollama_games=debug")),
        )
        .init();
}

fn load_config(path: &Path) -> Result<HubConfig> {
    Ok(HubConfig::load_or_default(path)?)
}
