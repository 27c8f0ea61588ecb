//! Timeline rendering for Waffle.
//!
//! [`render`] maps an ordered timeline to the display model a presentation
//! layer draws. It is a pure function of its inputs and is recomputed in
//! full on every render pass.

use waffle_chat_types::{ActorId, Message, MessageId};

/// One line of the rendered timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    /// Id of the message this line shows.
    pub id: MessageId,
    /// Message text.
    pub text: String,
    /// Author label (the sender's actor id).
    pub author: String,
    /// Whether the local actor wrote this message.
    pub is_own: bool,
    /// Whether the author label should be hidden.
    pub hide_author: bool,
}

/// Build the display model for an ordered timeline.
///
/// `ordered` must already be in timeline order (see
/// [`MessageStore::snapshot_ordered`](crate::MessageStore::snapshot_ordered)).
/// An author label is hidden for the local actor's own messages and for any
/// message whose predecessor has the same sender.
pub fn render(ordered: &[Message], own: &ActorId) -> Vec<DisplayItem> {
    let mut previous: Option<&ActorId> = None;

    ordered
        .iter()
        .map(|msg| {
            let is_own = msg.sender == *own;
            let same_run = previous == Some(&msg.sender);
            previous = Some(&msg.sender);

            DisplayItem {
                id: msg.id.clone(),
                text: msg.content.clone(),
                author: msg.sender.to_string(),
                is_own,
                hide_author: is_own || same_run,
            }
        })
        .collect()
}
