//! Configuration management for waffle.
//!
//! Everything lives in one data directory:
//! - `waffle.toml`: optional settings (server, timeouts, identity key)
//! - `identity.json`: the identity store, owner-readable only

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use waffle_chat_client::{ClientConfig, IdentityError, IdentityStore};
use waffle_chat_types::ACTOR_ID_KEY;

const SETTINGS_FILE: &str = "waffle.toml";
const IDENTITY_FILE: &str = "identity.json";

/// Settings loaded from `waffle.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Relay connection settings.
    pub server: ServerSettings,
    /// Identity settings.
    pub identity: IdentitySettings,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL of the relay.
    pub url: String,
    /// Timeout for history and send requests. 0 disables it.
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: waffle_chat_client::config::DEFAULT_SERVER_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// `[identity]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySettings {
    /// Identity-store key holding the actor id.
    pub key: String,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            key: ACTOR_ID_KEY.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a data directory, falling back to defaults when
    /// no settings file exists.
    pub async fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(SETTINGS_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    /// Save settings to a data directory.
    pub async fn save(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join(SETTINGS_FILE);
        let contents = toml::to_string_pretty(self).context("Failed to encode settings")?;
        tokio::fs::write(&path, contents)
            .await
            .context("Failed to save settings")?;
        Ok(())
    }

    /// Build the client configuration, with an optional server override.
    pub fn client_config(&self, server_override: Option<&str>) -> ClientConfig {
        let url = server_override.unwrap_or(&self.server.url);
        let timeout = match self.server.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        ClientConfig::new(url)
            .with_identity_key(&self.identity.key)
            .with_request_timeout(timeout)
    }
}

/// Identity store backed by a JSON file in the data directory.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    /// Create a store for `data_dir`. Nothing is touched until first use.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(IDENTITY_FILE),
        }
    }

    /// Check if the identity file exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Path of the identity file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>, IdentityError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(IdentityError::Persistence(e.to_string())),
        };
        serde_json::from_str(&contents)
            .map_err(|e| IdentityError::Persistence(format!("corrupt identity file: {}", e)))
    }
}

impl IdentityStore for FileIdentityStore {
    fn get(&self, key: &str) -> Result<Option<String>, IdentityError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), IdentityError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());

        let contents = serde_json::to_string_pretty(&values)
            .map_err(|e| IdentityError::Persistence(e.to_string()))?;
        write_private(&self.path, contents.as_bytes())
            .map_err(|e| IdentityError::Persistence(e.to_string()))
    }
}

/// Write `contents` to a file that is created owner-only on Unix.
///
/// A file that already exists with looser permissions is tightened too.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    set_file_permissions_0600(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Set file permissions to 0600 (owner read/write only) on Unix.
/// No-op on non-Unix platforms.
fn set_file_permissions_0600(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

/// Set directory permissions to 0700 (owner only) on Unix.
/// No-op on non-Unix platforms.
pub async fn set_dir_permissions_0700(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
            .await
            .context("Failed to set directory permissions")?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}
