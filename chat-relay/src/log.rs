//! Bounded message log.

use std::collections::VecDeque;
use waffle_chat_types::Message;

/// The most recent messages, oldest first.
///
/// When full, the oldest entry is dropped before a new one is appended.
/// Messages are stored as received; the relay does not deduplicate.
#[derive(Debug, Clone)]
pub struct MessageLog {
    messages: VecDeque<Message>,
    capacity: usize,
}

impl MessageLog {
    /// Create an empty log. A capacity of 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            messages: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Append a message, returning the entry evicted to make room.
    pub fn append(&mut self, message: Message) -> Option<Message> {
        let evicted = if self.is_full() {
            self.messages.pop_front()
        } else {
            None
        };
        self.messages.push_back(message);
        evicted
    }

    /// All stored messages in arrival order.
    pub fn all(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if no messages are stored.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Check if the next append will evict.
    pub fn is_full(&self) -> bool {
        self.messages.len() >= self.capacity
    }

    /// Maximum number of messages kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
