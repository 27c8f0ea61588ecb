//! Deduplicated message store for Waffle.
//!
//! This module provides the single collection every ingestion path feeds:
//! - Dedup by message id (history, push stream and local sends overlap)
//! - Append-only storage (there is no deletion path)
//! - Timeline order derived on read, never at insert time
//!
//! Records arrive in arbitrary order relative to their own timestamps, so
//! the store keeps arrival order and sorts a copy each time a snapshot is
//! taken.

use std::collections::HashSet;
use waffle_chat_types::{Message, MessageId};

/// Append-only, id-deduplicated collection of messages.
///
/// Invariants:
/// - every id in `seen` has exactly one entry in `messages` and vice versa
/// - inserting a known id never changes state
/// - `messages` only grows
#[derive(Debug, Default, Clone)]
pub struct MessageStore {
    /// Every id ever accepted.
    seen: HashSet<MessageId>,
    /// Accepted messages in arrival order.
    messages: Vec<Message>,
}

impl MessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a message unless its id is already known.
    ///
    /// Returns `false` (and leaves the store untouched) for a duplicate.
    pub fn try_insert(&mut self, message: Message) -> bool {
        if self.seen.contains(&message.id) {
            return false;
        }
        self.seen.insert(message.id.clone());
        self.messages.push(message);
        true
    }

    /// Insert every message of a batch, returning how many were accepted.
    pub fn insert_batch<I>(&mut self, messages: I) -> usize
    where
        I: IntoIterator<Item = Message>,
    {
        messages
            .into_iter()
            .map(|msg| self.try_insert(msg))
            .filter(|accepted| *accepted)
            .count()
    }

    /// All messages sorted ascending by timestamp.
    ///
    /// The sort is stable, so equal timestamps keep their arrival order.
    /// Recomputed on every call.
    pub fn snapshot_ordered(&self) -> Vec<Message> {
        let mut ordered = self.messages.clone();
        ordered.sort_by_key(|msg| msg.timestamp);
        ordered
    }

    /// Check whether a message id has been accepted.
    pub fn contains(&self, id: &MessageId) -> bool {
        self.seen.contains(id)
    }

    /// Number of accepted messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages in arrival order (not timeline order).
    pub fn arrival_order(&self) -> &[Message] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str, sender: &str, timestamp: i64) -> Message {
        Message::new(id, sender, format!("content of {}", id), timestamp)
    }

    #[test]
    fn store_accepts_new_message() {
        let mut store = MessageStore::new();

        assert!(store.try_insert(msg("m1", "bob", 100)));

        assert_eq!(store.len(), 1);
        assert!(store.contains(&MessageId::new("m1")));
    }

    #[test]
    fn duplicate_insert_is_rejected_without_change() {
        let mut store = MessageStore::new();
        store.try_insert(msg("m1", "bob", 100));
        let before = store.snapshot_ordered();

        // Same id, different body: still a duplicate
        let accepted = store.try_insert(Message::new("m1", "mallory", "other", 1));

        assert!(!accepted);
        assert_eq!(store.len(), 1);
        assert_eq!(store.snapshot_ordered(), before);
    }

    #[test]
    fn seen_size_matches_distinct_ids() {
        let mut store = MessageStore::new();
        let mut distinct = HashSet::new();

        // Deterministic scatter with plenty of repeats
        let mut x: u64 = 7;
        for _ in 0..500 {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let id = format!("id-{}", (x >> 33) % 120);
            distinct.insert(id.clone());
            store.try_insert(msg(&id, "bob", (x % 1000) as i64));
        }

        assert_eq!(store.len(), distinct.len());
        assert_eq!(store.seen.len(), store.messages.len());
    }

    #[test]
    fn snapshot_sorts_by_timestamp() {
        let mut store = MessageStore::new();
        store.try_insert(msg("c", "bob", 300));
        store.try_insert(msg("a", "bob", 100));
        store.try_insert(msg("b", "bob", 200));

        let ids: Vec<_> = store
            .snapshot_ordered()
            .into_iter()
            .map(|m| m.id.to_string())
            .collect();

        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn snapshot_keeps_arrival_order_for_equal_timestamps() {
        let mut store = MessageStore::new();
        store.try_insert(msg("late", "bob", 500));
        store.try_insert(msg("first", "bob", 100));
        store.try_insert(msg("second", "alice", 100));
        store.try_insert(msg("third", "bob", 100));

        let ids: Vec<_> = store
            .snapshot_ordered()
            .into_iter()
            .map(|m| m.id.to_string())
            .collect();

        assert_eq!(ids, vec!["first", "second", "third", "late"]);
    }

    #[test]
    fn snapshot_is_non_decreasing() {
        let mut store = MessageStore::new();
        for (i, ts) in [5, 3, 9, 3, 1, 9, 0].iter().enumerate() {
            store.try_insert(msg(&i.to_string(), "bob", *ts));
        }

        let snapshot = store.snapshot_ordered();
        assert!(snapshot
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp));
    }

    #[test]
    fn snapshot_does_not_reorder_storage() {
        let mut store = MessageStore::new();
        store.try_insert(msg("b", "bob", 200));
        store.try_insert(msg("a", "bob", 100));

        let _ = store.snapshot_ordered();

        assert_eq!(store.arrival_order()[0].id, MessageId::new("b"));
    }

    #[test]
    fn insert_batch_counts_accepted() {
        let mut store = MessageStore::new();
        store.try_insert(msg("m1", "bob", 100));

        let accepted = store.insert_batch(vec![
            msg("m1", "bob", 100),
            msg("m2", "bob", 200),
            msg("m2", "bob", 200),
            msg("m3", "carol", 300),
        ]);

        assert_eq!(accepted, 2);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn is_empty_works() {
        let mut store = MessageStore::new();
        assert!(store.is_empty());

        store.try_insert(msg("m1", "bob", 1));
        assert!(!store.is_empty());
    }
}
