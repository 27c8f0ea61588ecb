//! # waffle
//!
//! Terminal client for Waffle chat.
//!
//! ## Commands
//!
//! - `init`: Create the local identity
//! - `status`: Show identity and server settings
//! - `history`: Print the conversation so far
//! - `send`: Send one message
//! - `watch`: Print the conversation and follow it live
//!
//! ## Example
//!
//! ```bash
//! # Create an identity pointed at a relay
//! waffle init --server http://localhost:3000
//!
//! # Say something
//! waffle send "Hello, waffle!"
//!
//! # Follow along (Ctrl-C to stop)
//! waffle watch
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{history, init, send, status, watch};
use config::Settings;

/// Terminal client for Waffle chat.
#[derive(Parser, Debug)]
#[command(name = "waffle")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Data directory for the identity and settings
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Relay URL (overrides waffle.toml)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Use a mock transport with a demo conversation instead of a relay
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the local identity
    Init,

    /// Show identity and server settings
    Status,

    /// Print the conversation so far
    History,

    /// Send one message
    Send {
        /// Message text
        message: String,
    },

    /// Print the conversation and follow it live
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the conversation
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Determine data directory
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;
    config::set_dir_permissions_0700(&data_dir).await?;

    let settings = Settings::load(&data_dir).await?;
    let client_config = settings.client_config(cli.server.as_deref());

    match cli.command {
        Commands::Init => {
            init::run(&data_dir, cli.server.as_deref()).await?;
        }
        Commands::Status => {
            status::run(&data_dir, &client_config).await?;
        }
        Commands::History => {
            history::run(&data_dir, &client_config, cli.mock).await?;
        }
        Commands::Send { message } => {
            send::run(&data_dir, &client_config, &message, cli.mock).await?;
        }
        Commands::Watch => {
            watch::run(&data_dir, &client_config, cli.mock).await?;
        }
    }

    Ok(())
}

/// Get the default data directory for waffle.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("org", "waffle", "waffle")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
