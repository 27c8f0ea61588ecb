//! # waffle-relay
//!
//! Message relay server for Waffle chat.
//!
//! This crate implements a relay server that:
//! - Keeps the most recent messages in a bounded in-memory log
//! - Serves the log as the conversation history
//! - Fans every new message out to all push-stream subscribers
//! - Sends periodic keepalive markers so idle streams stay open
//!
//! ## Architecture
//!
//! ```text
//! Client A ──┐   POST /api/messages   ┌── Client B
//!            ├───────────────────────►│
//!            │                        │  GET /sse
//!        ┌───┴────────────────────────┴───┐
//!        │          waffle-relay          │
//!        │  ┌────────────┐ ┌───────────┐  │
//!        │  │ MessageLog │ │  Broker   │  │
//!        │  └────────────┘ └───────────┘  │
//!        └────────────────────────────────┘
//! ```
//!
//! ## Endpoints
//!
//! - `GET /api/messages` → every stored message
//! - `POST /api/messages` → store, broadcast, echo
//! - `GET /sse` → `text/event-stream` of messages and keepalives
//! - `GET /health` → status and counters

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod broker;
pub mod config;
pub mod error;
pub mod http;
pub mod log;
pub mod server;

pub use config::Config;
pub use error::{ApiError, RelayError};
pub use server::ChatRelay;

use std::sync::Arc;
use tokio::net::TcpListener;

/// Bind the configured address and serve until `shutdown` completes.
pub async fn serve<F>(relay: Arc<ChatRelay>, shutdown: F) -> error::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let address = relay.config().server.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| RelayError::Bind {
            address: address.clone(),
            source,
        })?;

    serve_on(listener, relay, shutdown).await
}

/// Serve on an already bound listener until `shutdown` completes.
pub async fn serve_on<F>(
    listener: TcpListener,
    relay: Arc<ChatRelay>,
    shutdown: F,
) -> error::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    let keepalive = relay.spawn_keepalive();
    let app = http::build_router(relay);
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await;

    if let Some(task) = keepalive {
        task.abort();
    }
    result?;
    Ok(())
}
