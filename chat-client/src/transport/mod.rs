//! Transport abstraction for Waffle.
//!
//! This module provides a pluggable transport layer that abstracts the
//! three channels a chat session consumes (HTTP + SSE, mock for testing).
//!
//! # Design
//!
//! The transport trait is async and channel-oriented:
//! - `fetch_history()` returns the full message list once
//! - `post_message()` transmits one locally authored message
//! - `subscribe()` opens the push channel as an [`EventStream`]
//!
//! The transport never touches session state. Everything it delivers goes
//! through the session's deduplicating store.
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::new();
//! transport.set_history(vec![message]);
//! let history = transport.fetch_history().await?;
//! let mut stream = transport.subscribe().await?;
//! while let Some(event) = stream.next().await { /* ... */ }
//! ```

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::MockTransport;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use waffle_chat_types::{Message, StreamEvent};

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Server answered with a non-success status.
    #[error("unexpected status: {0}")]
    Status(u16),

    /// Request failed after the connection was made.
    #[error("http error: {0}")]
    Http(String),

    /// A payload could not be decoded.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The push stream has been closed.
    #[error("stream closed")]
    StreamClosed,

    /// Request timeout.
    #[error("request timeout")]
    Timeout,
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::ConnectionFailed(e.to_string())
        } else if let Some(status) = e.status() {
            TransportError::Status(status.as_u16())
        } else if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else {
            TransportError::Http(e.to_string())
        }
    }
}

/// Transport trait for the history, send and push channels.
///
/// Implementations handle the underlying connection mechanism
/// (HTTP + Server-Sent Events, mock, etc).
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Fetch every message the server currently holds.
    async fn fetch_history(&self) -> Result<Vec<Message>, TransportError>;

    /// Transmit one message. Any response body is ignored.
    async fn post_message(&self, message: &Message) -> Result<(), TransportError>;

    /// Open the push channel.
    async fn subscribe(&self) -> Result<EventStream, TransportError>;
}

/// Capacity of the channel between a stream reader and its consumer.
pub const EVENT_BUFFER: usize = 64;

/// A live push-channel subscription.
///
/// Dropping (or closing) the stream releases the subscription and stops the
/// background reader, if any.
#[derive(Debug)]
pub struct EventStream {
    events: mpsc::Receiver<Result<StreamEvent, TransportError>>,
    reader: Option<JoinHandle<()>>,
}

impl EventStream {
    /// Wrap a receiver fed by a background reader task.
    pub fn new(
        events: mpsc::Receiver<Result<StreamEvent, TransportError>>,
        reader: Option<JoinHandle<()>>,
    ) -> Self {
        Self { events, reader }
    }

    /// Create a stream fed directly through the returned sender.
    pub fn channel(
        capacity: usize,
    ) -> (mpsc::Sender<Result<StreamEvent, TransportError>>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx, None))
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<Result<StreamEvent, TransportError>> {
        self.events.recv().await
    }

    /// Release the subscription.
    pub fn close(&mut self) {
        self.events.close();
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.close();
    }
}
