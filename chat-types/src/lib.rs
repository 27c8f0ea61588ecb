//! # chat-types
//!
//! Wire format types for the Waffle chat protocol.
//!
//! This crate provides the foundational types used across all Waffle crates:
//! - [`ActorId`], [`MessageId`] - Identity types and the [`gen_id`] generator
//! - [`Message`] - A chat message record as it travels over the wire
//! - [`StreamEvent`] - Payload of one push-channel event
//! - [`WireError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod messages;

pub use error::WireError;
pub use ids::{
    collision_probability, gen_id, ActorId, MessageId, ACTOR_ID_KEY, ID_HEX_LEN, ID_SPACE,
};
pub use messages::{now_millis, Message, StreamEvent};
