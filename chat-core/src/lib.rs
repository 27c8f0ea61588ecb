//! # chat-core
//!
//! Pure logic for Waffle chat (no I/O, instant tests).
//!
//! This crate implements the timeline reconciliation rules and the session
//! lifecycle without any network or disk I/O, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects:
//! - [`MessageStore`] deduplicates and orders messages from every source
//! - [`render`] turns the ordered timeline into a grouped display model
//! - [`SessionState`] decides which steps a session runs next
//!
//! The actual I/O (history fetch, push stream, sends) is performed by
//! `chat-client`, which interprets the actions produced here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod render;
pub mod state;
pub mod store;

pub use render::{render, DisplayItem};
pub use state::{Action, Event, SessionEvent, SessionState};
pub use store::MessageStore;
