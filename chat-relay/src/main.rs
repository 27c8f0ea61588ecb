//! waffle-relay binary entry point.
//!
//! Usage:
//! ```bash
//! waffle-relay --config relay.toml
//! PORT=8080 waffle-relay
//! ```

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use waffle_chat_relay::{ChatRelay, Config};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("waffle-relay v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    let relay = Arc::new(ChatRelay::new(config));

    waffle_chat_relay::serve(relay, shutdown_signal())
        .await
        .context("Relay stopped with an error")?;

    tracing::info!("Shut down");
    Ok(())
}

/// Load the config file if present, then apply a `PORT` override.
fn load_config() -> Result<Config> {
    let path = get_config_path();
    let config = if path.exists() {
        tracing::info!("Configuration file: {}", path.display());
        Config::from_file(&path)?
    } else {
        tracing::info!("No {} found, using defaults", path.display());
        Config::default()
    };

    Ok(match std::env::var("PORT") {
        Ok(port) if !port.is_empty() => config.with_port(&port),
        _ => config,
    })
}

fn get_config_path() -> PathBuf {
    std::env::args()
        .skip_while(|arg| arg != "--config")
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("relay.toml"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
