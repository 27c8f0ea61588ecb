//! Chat records as they travel between client and relay.
//!
//! All payloads are JSON. History and send endpoints carry [`Message`]
//! records directly; each push-channel event carries a [`StreamEvent`].

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{ActorId, MessageId, WireError};

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// A chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Globally unique identifier; the deduplication key.
    pub id: MessageId,
    /// Actor that authored the message.
    pub sender: ActorId,
    /// Raw text payload.
    pub content: String,
    /// Author-assigned creation time in epoch milliseconds. Ordering only.
    pub timestamp: i64,
}

impl Message {
    /// Build a message from its parts.
    pub fn new(
        id: impl Into<MessageId>,
        sender: impl Into<ActorId>,
        content: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            id: id.into(),
            sender: sender.into(),
            content: content.into(),
            timestamp,
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, WireError> {
        serde_json::to_vec(self).map_err(WireError::Serialization)
    }

    /// Deserialize from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, WireError> {
        serde_json::from_slice(bytes).map_err(WireError::Deserialization)
    }

    /// Deserialize a history listing (a JSON array of messages).
    pub fn list_from_json(bytes: &[u8]) -> Result<Vec<Self>, WireError> {
        serde_json::from_slice(bytes).map_err(WireError::Deserialization)
    }
}

/// One event delivered by the push channel.
///
/// A record whose `keepalive` field is `true` is a keepalive, whatever else
/// it carries. Anything else must decode as a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "WireEvent")]
pub enum StreamEvent {
    /// Liveness marker, `{"keepalive": true}`. Carries no message.
    Keepalive,
    /// A message record.
    Message(Message),
}

impl StreamEvent {
    /// Serialize to a JSON string suitable for an SSE `data:` line.
    pub fn to_json(&self) -> Result<String, WireError> {
        serde_json::to_string(self).map_err(WireError::Serialization)
    }

    /// Deserialize from the JSON payload of one SSE event.
    pub fn from_json(data: &str) -> Result<Self, WireError> {
        serde_json::from_str(data).map_err(WireError::Deserialization)
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireEvent {
    Keepalive { keepalive: bool },
    Message(Message),
}

impl TryFrom<serde_json::Value> for StreamEvent {
    type Error = serde_json::Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        if value.get("keepalive") == Some(&serde_json::Value::Bool(true)) {
            return Ok(StreamEvent::Keepalive);
        }
        serde_json::from_value(value).map(StreamEvent::Message)
    }
}

impl From<StreamEvent> for WireEvent {
    fn from(value: StreamEvent) -> Self {
        match value {
            StreamEvent::Keepalive => WireEvent::Keepalive { keepalive: true },
            StreamEvent::Message(message) => WireEvent::Message(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_json_shape() {
        let msg = Message::new("m1", "bob", "hey", 100);
        let json = String::from_utf8(msg.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            r#"{"id":"m1","sender":"bob","content":"hey","timestamp":100}"#
        );
    }

    #[test]
    fn history_listing_decodes() {
        let body = br#"[
            {"id":"m1","sender":"bob","timestamp":100,"content":"hey"},
            {"id":"m2","sender":"bob","timestamp":200,"content":"yo"}
        ]"#;
        let list = Message::list_from_json(body).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].id, MessageId::new("m2"));
        assert_eq!(list[1].timestamp, 200);
    }

    #[test]
    fn malformed_message_is_rejected() {
        let result = Message::from_json(br#"{"id":"m1","sender":"bob"}"#);
        assert!(matches!(result, Err(WireError::Deserialization(_))));
    }

    #[test]
    fn keepalive_event_decodes() {
        let event = StreamEvent::from_json(r#"{"keepalive":true}"#).unwrap();
        assert_eq!(event, StreamEvent::Keepalive);
    }

    #[test]
    fn bare_keepalive_false_is_rejected() {
        assert!(StreamEvent::from_json(r#"{"keepalive":false}"#).is_err());
    }

    #[test]
    fn keepalive_false_with_message_fields_is_a_message() {
        let event = StreamEvent::from_json(
            r#"{"keepalive":false,"id":"m3","sender":"bob","content":"yo","timestamp":7}"#,
        )
        .unwrap();
        assert_eq!(event, StreamEvent::Message(Message::new("m3", "bob", "yo", 7)));
    }

    #[test]
    fn keepalive_true_wins_over_message_fields() {
        let event = StreamEvent::from_json(
            r#"{"keepalive":true,"id":"m3","sender":"bob","content":"yo","timestamp":7}"#,
        )
        .unwrap();
        assert_eq!(event, StreamEvent::Keepalive);
    }

    #[test]
    fn message_event_decodes() {
        let event = StreamEvent::from_json(
            r#"{"id":"m9","sender":"carol","content":"hello","timestamp":5}"#,
        )
        .unwrap();
        match event {
            StreamEvent::Message(msg) => {
                assert_eq!(msg.sender, ActorId::new("carol"));
                assert_eq!(msg.content, "hello");
            }
            other => panic!("Expected message event, got {:?}", other),
        }
    }

    #[test]
    fn keepalive_event_encodes_as_marker() {
        assert_eq!(
            StreamEvent::Keepalive.to_json().unwrap(),
            r#"{"keepalive":true}"#
        );
    }

    #[test]
    fn now_millis_is_after_2020() {
        assert!(now_millis() > 1_577_836_800_000);
    }
}
