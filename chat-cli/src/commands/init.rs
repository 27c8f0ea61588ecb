//! Initialize the local identity.

use anyhow::{Context, Result};
use std::path::Path;
use waffle_chat_client::IdentityProvider;

use crate::config::{FileIdentityStore, Settings};

/// Run the init command.
pub async fn run(data_dir: &Path, server: Option<&str>) -> Result<()> {
    let store = FileIdentityStore::new(data_dir);

    // Check if already initialized
    if store.exists() {
        anyhow::bail!(
            "Already initialized. Delete {} to reinitialize.",
            store.path().display()
        );
    }

    let mut settings = Settings::load(data_dir).await?;
    if let Some(url) = server {
        settings.server.url = url.to_string();
    }
    settings.save(data_dir).await?;

    let actor = IdentityProvider::with_key(store, &settings.identity.key)
        .actor_id()
        .context("Failed to create identity")?;

    println!("Initialized successfully!");
    println!();
    println!("  Actor ID: {}", actor);
    println!("  Server:   {}", settings.server.url);
    println!("  Data dir: {}", data_dir.display());
    println!();
    println!("Next steps:");
    println!("  1. Read the conversation: waffle history");
    println!("  2. Say something:         waffle send \"hello\"");

    Ok(())
}
