//! Command-line interface for ollama_games.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ollama Games - play tic-tac-toe against a local language model
#[derive(Parser, Debug)]
#[command(name = "ollama_games")]
#[command(about = "Game hub backed by a local Ollama model", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the hub server (game API and completion gateway)
    Serve {
        /// Path to the hub config file (defaults apply when missing)
        #[arg(short, long, default_value = "ollama_games.toml")]
        config: PathBuf,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run only the completion gateway
    Gateway {
        /// Path to the hub config file (defaults apply when missing)
        #[arg(short, long, default_value = "ollama_games.toml")]
        config: PathBuf,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Play in the terminal
    Play {
        /// Path to the hub config file (defaults apply when missing)
        #[arg(short, long, default_value = "ollama_games.toml")]
        config: PathBuf,

        /// Completion gateway to ask for moves. Without one the terminal
        /// talks to Ollama directly.
        #[arg(long)]
        gateway_url: Option<String>,
    },
}
