//! Show local status.

use anyhow::Result;
use std::path::Path;
use waffle_chat_client::{ClientConfig, IdentityStore};

use crate::config::FileIdentityStore;

/// Run the status command.
pub async fn run(data_dir: &Path, config: &ClientConfig) -> Result<()> {
    println!("=== waffle status ===");
    println!();

    let store = FileIdentityStore::new(data_dir);
    match store.get(&config.identity_key) {
        Ok(Some(actor)) => {
            println!("Identity:");
            println!("  Actor ID: {}", actor);
            println!("  Stored:   {}", store.path().display());
        }
        Ok(None) => {
            println!("Identity: NOT INITIALIZED");
            println!();
            println!("Run 'waffle init' to initialize.");
            return Ok(());
        }
        Err(e) => {
            println!("Identity: UNREADABLE ({})", e);
            return Ok(());
        }
    }

    println!();
    println!("Server:");
    println!("  History: {}", config.history_url());
    println!("  Send:    {}", config.send_url());
    println!("  Stream:  {}", config.stream_url());
    match config.request_timeout {
        Some(timeout) => println!("  Timeout: {}s", timeout.as_secs()),
        None => println!("  Timeout: none"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn status_without_init() {
        let dir = tempdir().unwrap();

        // Should succeed but show "not initialized"
        let result = run(dir.path(), &ClientConfig::default()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn status_after_init() {
        let dir = tempdir().unwrap();
        crate::commands::init::run(dir.path(), None).await.unwrap();

        let result = run(dir.path(), &ClientConfig::default()).await;
        assert!(result.is_ok());
    }
}
