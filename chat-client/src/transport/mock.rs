//! Mock transport for testing.
//!
//! Serves a canned history, captures posted messages, and lets tests push
//! events into every open subscription.

use super::{ChatTransport, EventStream, TransportError, EVENT_BUFFER};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use waffle_chat_types::{Message, StreamEvent};

type EventSender = mpsc::Sender<Result<StreamEvent, TransportError>>;

/// Mock transport for testing.
///
/// Clones share state, so a test can keep a handle after moving one into a
/// session.
#[derive(Debug, Default, Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    history: Vec<Message>,
    posted: Vec<Message>,
    subscribers: Vec<EventSender>,
    history_requests: usize,
    fail_next_history: Option<String>,
    fail_next_post: Option<String>,
    fail_next_subscribe: Option<String>,
}

impl MockTransport {
    /// Create a new mock transport with an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the messages returned by `fetch_history()`.
    pub fn set_history(&self, messages: Vec<Message>) {
        let mut inner = self.inner.lock().unwrap();
        inner.history = messages;
    }

    /// Get all messages that were posted.
    pub fn posted_messages(&self) -> Vec<Message> {
        let inner = self.inner.lock().unwrap();
        inner.posted.clone()
    }

    /// Get the last message that was posted.
    pub fn last_posted(&self) -> Option<Message> {
        let inner = self.inner.lock().unwrap();
        inner.posted.last().cloned()
    }

    /// Number of `fetch_history()` calls so far.
    pub fn history_requests(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.history_requests
    }

    /// Number of subscriptions that are still held open by a consumer.
    pub fn open_subscriptions(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.subscribers.iter().filter(|tx| !tx.is_closed()).count()
    }

    /// Deliver an event to every open subscription.
    ///
    /// Returns how many subscriptions accepted it.
    pub fn push_event(&self, event: StreamEvent) -> usize {
        self.deliver(|| Ok(event.clone()))
    }

    /// Deliver a transport error to every open subscription.
    pub fn push_error(&self, error: &str) -> usize {
        let error = error.to_string();
        self.deliver(|| Err(TransportError::Http(error.clone())))
    }

    /// Deliver an undecodable payload to every open subscription.
    pub fn push_garbage(&self) -> usize {
        self.deliver(|| Err(TransportError::Decode("expected value".into())))
    }

    /// End every open subscription (as if the server hung up).
    pub fn end_streams(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.clear();
    }

    /// Cause the next fetch_history() to fail with the given error.
    pub fn fail_next_history(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_history = Some(error.to_string());
    }

    /// Cause the next post_message() to fail with the given error.
    pub fn fail_next_post(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_post = Some(error.to_string());
    }

    /// Cause the next subscribe() to fail with the given error.
    pub fn fail_next_subscribe(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_subscribe = Some(error.to_string());
    }

    fn deliver<F>(&self, make: F) -> usize
    where
        F: Fn() -> Result<StreamEvent, TransportError>,
    {
        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.retain(|tx| !tx.is_closed());
        inner
            .subscribers
            .iter()
            .filter(|tx| tx.try_send(make()).is_ok())
            .count()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn fetch_history(&self) -> Result<Vec<Message>, TransportError> {
        let mut inner = self.inner.lock().unwrap();
        inner.history_requests += 1;

        // Check for forced failure
        if let Some(error) = inner.fail_next_history.take() {
            return Err(TransportError::ConnectionFailed(error));
        }

        Ok(inner.history.clone())
    }

    async fn post_message(&self, message: &Message) -> Result<(), TransportError> {
        let mut inner = self.inner.lock().unwrap();

        // Check for forced failure
        if let Some(error) = inner.fail_next_post.take() {
            return Err(TransportError::ConnectionFailed(error));
        }

        inner.posted.push(message.clone());
        Ok(())
    }

    async fn subscribe(&self) -> Result<EventStream, TransportError> {
        let mut inner = self.inner.lock().unwrap();

        // Check for forced failure
        if let Some(error) = inner.fail_next_subscribe.take() {
            return Err(TransportError::ConnectionFailed(error));
        }

        let (tx, stream) = EventStream::channel(EVENT_BUFFER);
        inner.subscribers.push(tx);
        Ok(stream)
    }
}
