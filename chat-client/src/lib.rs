//! # chat-client
//!
//! Client library for the Waffle chat protocol.
//!
//! This is the library a front end uses to join the conversation.
//!
//! ## Features
//!
//! - **Three-way reconciliation**: history, push stream and local sends
//!   feed one deduplicated timeline
//! - **Optimistic sends**: own messages render before the server sees them
//! - **Transport Abstraction**: Pluggable transport layer (HTTP + SSE, mock)
//! - **Pure core**: Uses chat-core for dedup, ordering and rendering rules
//!
//! ## Example
//!
//! ```ignore
//! use waffle_chat_client::{
//!     ClientConfig, HttpTransport, IdentityProvider, MemoryIdentityStore,
//!     RecordingPresenter, SyncController,
//! };
//!
//! let config = ClientConfig::new("http://localhost:3000");
//! let transport = HttpTransport::new(config.clone())?;
//! let identity = IdentityProvider::new(MemoryIdentityStore::new());
//! let session = SyncController::new(transport, identity, RecordingPresenter::new());
//!
//! session.start().await?;
//! session.send("hello").await?;
//! session.run_stream().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod identity;
pub mod present;
pub mod transport;

pub use client::{ClientError, StartReport, SyncController};
pub use config::ClientConfig;
pub use identity::{IdentityError, IdentityProvider, IdentityStore, MemoryIdentityStore};
pub use present::{Presenter, RecordingPresenter};
pub use transport::{ChatTransport, EventStream, HttpTransport, MockTransport, TransportError};
