//! HTTP transport: REST for history and sends, Server-Sent Events for push.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use tokio::sync::mpsc;
use waffle_chat_types::{Message, StreamEvent};

use super::{ChatTransport, EventStream, TransportError, EVENT_BUFFER};
use crate::config::ClientConfig;

/// Transport talking to a Waffle relay over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    config: ClientConfig,
    /// Client for short requests (history, send); carries the timeout.
    requests: reqwest::Client,
    /// Client for the long-lived push stream; no overall timeout.
    stream: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for the server named in `config`.
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let requests = builder.build()?;
        let stream = reqwest::Client::builder().build()?;

        Ok(Self {
            config,
            requests,
            stream,
        })
    }

    /// The configuration this transport was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn fetch_history(&self) -> Result<Vec<Message>, TransportError> {
        let url = self.config.history_url();
        tracing::debug!("Fetching history from {}", url);

        let response = self.requests.get(&url).send().await?.error_for_status()?;
        let body = response.bytes().await?;

        Message::list_from_json(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn post_message(&self, message: &Message) -> Result<(), TransportError> {
        let url = self.config.send_url();
        tracing::debug!("Posting message {} to {}", message.id, url);

        self.requests
            .post(&url)
            .json(message)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn subscribe(&self) -> Result<EventStream, TransportError> {
        let url = self.config.stream_url();
        tracing::debug!("Opening push stream {}", url);

        let request = self.stream.get(&url).header("Accept", "text/event-stream");
        let mut source =
            EventSource::new(request).map_err(|e| TransportError::Http(e.to_string()))?;
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        // Connection and status failures surface here rather than on the
        // first read.
        match source.next().await {
            Some(Ok(Event::Open)) => {}
            Some(Ok(Event::Message(message))) => {
                let _ = tx.try_send(decode_event(&message.data));
            }
            Some(Err(e)) => {
                source.close();
                return Err(stream_error(e).unwrap_or(TransportError::StreamClosed));
            }
            None => return Err(TransportError::StreamClosed),
        }

        let reader = tokio::spawn(async move {
            while let Some(event) = source.next().await {
                let item = match event {
                    Ok(Event::Open) => continue,
                    Ok(Event::Message(message)) => decode_event(&message.data),
                    Err(e) => {
                        if let Some(error) = stream_error(e) {
                            let _ = tx.send(Err(error)).await;
                        }
                        break;
                    }
                };

                if tx.send(item).await.is_err() {
                    // Consumer released the subscription
                    break;
                }
            }

            // No reconnects: the session decides what an ended stream means
            source.close();
            tracing::debug!("Push stream ended");
        });

        Ok(EventStream::new(rx, Some(reader)))
    }
}

fn decode_event(data: &str) -> Result<StreamEvent, TransportError> {
    StreamEvent::from_json(data).map_err(|e| TransportError::Decode(e.to_string()))
}

/// Map an event source error; `None` for a stream that simply ended.
fn stream_error(error: reqwest_eventsource::Error) -> Option<TransportError> {
    use reqwest_eventsource::Error;

    match error {
        Error::StreamEnded => None,
        Error::Transport(e) => Some(e.into()),
        Error::InvalidStatusCode(status, _) => Some(TransportError::Status(status.as_u16())),
        Error::Utf8(e) => Some(TransportError::Decode(e.to_string())),
        Error::Parser(e) => Some(TransportError::Decode(e.to_string())),
        other => Some(TransportError::Http(other.to_string())),
    }
}
