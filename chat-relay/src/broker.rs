//! Push-stream fan-out.
//!
//! Every subscriber gets its own broadcast receiver. A subscriber that
//! falls more than `channel_capacity` events behind skips the missed events
//! rather than slowing everyone else down.

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use waffle_chat_types::StreamEvent;

/// Broadcasts stream events to every connected subscriber.
#[derive(Debug, Clone)]
pub struct Broker {
    sender: broadcast::Sender<StreamEvent>,
}

impl Broker {
    /// Create a broker buffering up to `channel_capacity` events per
    /// subscriber.
    pub fn new(channel_capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(channel_capacity.max(1));
        Self { sender }
    }

    /// Publish an event. Returns the number of subscribers it reached.
    pub fn publish(&self, event: StreamEvent) -> usize {
        // No receivers is not an error; nobody is listening yet
        self.sender.send(event).unwrap_or(0)
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        let receiver = self.sender.subscribe();
        tracing::info!(
            "Subscriber connected (total: {})",
            self.sender.receiver_count()
        );
        receiver
    }

    /// Number of connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish a keepalive marker every `interval` until the task is aborted.
    pub fn spawn_keepalive(&self, interval: Duration) -> JoinHandle<()> {
        let broker = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let reached = broker.publish(StreamEvent::Keepalive);
                tracing::trace!("Keepalive sent to {} subscribers", reached);
            }
        })
    }
}
