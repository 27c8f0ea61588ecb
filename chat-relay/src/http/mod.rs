//! HTTP endpoints for waffle-relay.
//!
//! Provides the message API, the push stream and a health check.

pub mod health;
mod messages;
mod stream;

use crate::server::ChatRelay;
use axum::{routing::get, Extension, Router};
use std::sync::Arc;

pub use health::HealthStatus;

/// Build the HTTP router with all endpoints.
pub fn build_router(relay: Arc<ChatRelay>) -> Router {
    Router::new()
        .route(
            "/api/messages",
            get(messages::index_handler).post(messages::create_handler),
        )
        .route("/sse", get(stream::stream_handler))
        .route("/health", get(health::health_handler))
        .layer(Extension(relay))
}
