//! Client configuration.

use std::time::Duration;
use waffle_chat_types::ACTOR_ID_KEY;

/// Server used when nothing else is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Default timeout for history and send requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how a session reaches its server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the relay, e.g. `http://localhost:3000`.
    pub server_url: String,
    /// Path of the history endpoint.
    pub history_path: String,
    /// Path of the send endpoint.
    pub send_path: String,
    /// Path of the push stream.
    pub stream_path: String,
    /// Identity-store key holding the actor id.
    pub identity_key: String,
    /// Timeout for history and send requests. Never applied to the stream.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER_URL)
    }
}

impl ClientConfig {
    /// Create a configuration for `server_url` with default paths.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            history_path: "/api/messages".to_string(),
            send_path: "/api/messages".to_string(),
            stream_path: "/sse".to_string(),
            identity_key: ACTOR_ID_KEY.to_string(),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }

    /// Set the history endpoint path.
    pub fn with_history_path(mut self, path: &str) -> Self {
        self.history_path = path.to_string();
        self
    }

    /// Set the send endpoint path.
    pub fn with_send_path(mut self, path: &str) -> Self {
        self.send_path = path.to_string();
        self
    }

    /// Set the push stream path.
    pub fn with_stream_path(mut self, path: &str) -> Self {
        self.stream_path = path.to_string();
        self
    }

    /// Set the identity-store key.
    pub fn with_identity_key(mut self, key: &str) -> Self {
        self.identity_key = key.to_string();
        self
    }

    /// Set (or disable, with `None`) the request timeout.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Full URL of the history endpoint.
    pub fn history_url(&self) -> String {
        self.join(&self.history_path)
    }

    /// Full URL of the send endpoint.
    pub fn send_url(&self) -> String {
        self.join(&self.send_path)
    }

    /// Full URL of the push stream.
    pub fn stream_url(&self) -> String {
        self.join(&self.stream_path)
    }

    fn join(&self, path: &str) -> String {
        let base = self.server_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}
