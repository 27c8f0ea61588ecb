//! Main ChatRelay server coordination.
//!
//! ChatRelay owns the message log and the broker, and ties message creation
//! to fan-out.

use crate::broker::Broker;
use crate::config::Config;
use crate::log::MessageLog;
use std::time::Instant;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use waffle_chat_types::{collision_probability, Message, StreamEvent, ID_SPACE};

/// Main relay server.
#[derive(Debug)]
pub struct ChatRelay {
    config: Config,
    log: RwLock<MessageLog>,
    broker: Broker,
    started: Instant,
}

impl ChatRelay {
    /// Create a new ChatRelay with the given config.
    pub fn new(config: Config) -> Self {
        let log = MessageLog::new(config.log.capacity);
        let broker = Broker::new(config.stream.channel_capacity);

        tracing::info!("Store capacity: {} messages", log.capacity());
        tracing::info!(
            "ID collision probability at capacity: {:.6} ({} possible ids)",
            collision_probability(log.capacity()),
            ID_SPACE
        );

        Self {
            config,
            log: RwLock::new(log),
            broker,
            started: Instant::now(),
        }
    }

    /// Get the relay configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the broker.
    pub fn broker(&self) -> &Broker {
        &self.broker
    }

    /// Store a message and publish it to every subscriber.
    pub async fn create_message(&self, message: Message) -> Message {
        let evicted = self.log.write().await.append(message.clone());
        if let Some(old) = evicted {
            tracing::debug!("Log full, dropped oldest message {}", old.id);
        }

        let reached = self.broker.publish(StreamEvent::Message(message.clone()));
        tracing::info!(
            "Message created: id={} sender={} (published to {})",
            message.id,
            message.sender,
            reached
        );
        message
    }

    /// All stored messages in arrival order.
    pub async fn messages(&self) -> Vec<Message> {
        self.log.read().await.all()
    }

    /// Number of stored messages.
    pub async fn message_count(&self) -> usize {
        self.log.read().await.len()
    }

    /// Register a push-stream subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.broker.subscribe()
    }

    /// Number of connected push-stream subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.broker.subscriber_count()
    }

    /// Seconds since the relay was created.
    pub fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Start the keepalive task, if enabled in the configuration.
    pub fn spawn_keepalive(&self) -> Option<JoinHandle<()>> {
        let interval = self.config.stream.keepalive_interval()?;
        tracing::info!("Keepalive every {}s", interval.as_secs());
        Some(self.broker.spawn_keepalive(interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_relay(capacity: usize) -> ChatRelay {
        let mut config = Config::default();
        config.log.capacity = capacity;
        ChatRelay::new(config)
    }

    #[tokio::test]
    async fn create_stores_and_publishes() {
        let relay = small_relay(8);
        let mut receiver = relay.subscribe();
        let message = Message::new("m1", "bob", "hi", 1);

        let stored = relay.create_message(message.clone()).await;

        assert_eq!(stored, message);
        assert_eq!(relay.messages().await, vec![message.clone()]);
        assert_eq!(receiver.recv().await.unwrap(), StreamEvent::Message(message));
    }

    #[tokio::test]
    async fn log_is_truncated_at_capacity() {
        let relay = small_relay(2);
        for i in 0..5 {
            relay
                .create_message(Message::new(format!("m{}", i), "bob", "x", i))
                .await;
        }

        let ids: Vec<_> = relay
            .messages()
            .await
            .into_iter()
            .map(|m| m.id.to_string())
            .collect();
        assert_eq!(ids, vec!["m3", "m4"]);
        assert_eq!(relay.message_count().await, 2);
    }

    #[test]
    fn keepalive_disabled_by_config() {
        let mut config = Config::default();
        config.stream.keepalive_secs = 0;
        let relay = ChatRelay::new(config);

        assert!(relay.spawn_keepalive().is_none());
    }
}
