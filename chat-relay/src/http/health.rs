//! Health check endpoint.

use crate::server::ChatRelay;
use axum::{Extension, Json};
use serde::Serialize;
use std::sync::Arc;

/// Health status response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Number of stored messages.
    pub messages: usize,
    /// Number of connected push-stream subscribers.
    pub subscribers: usize,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
}

/// Health check handler.
pub async fn health_handler(Extension(relay): Extension<Arc<ChatRelay>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        messages: relay.message_count().await,
        subscribers: relay.subscriber_count(),
        uptime_seconds: relay.uptime_seconds(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use waffle_chat_types::Message;

    #[test]
    fn health_status_serializes() {
        let status = HealthStatus {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            messages: 42,
            subscribers: 3,
            uptime_seconds: 3600,
        };

        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"messages\":42"));
        assert!(json.contains("\"subscribers\":3"));
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let relay = Arc::new(ChatRelay::new(Config::default()));
        relay
            .create_message(Message::new("m1", "bob", "hi", 1))
            .await;
        let _subscriber = relay.subscribe();

        let Json(status) = health_handler(Extension(relay)).await;

        assert_eq!(status.status, "ok");
        assert_eq!(status.messages, 1);
        assert_eq!(status.subscribers, 1);
    }
}
