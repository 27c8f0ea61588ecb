//! Server-Sent Events push stream.

use crate::server::ChatRelay;
use axum::http::header;
use axum::response::sse::{Event, Sse};
use axum::response::IntoResponse;
use axum::Extension;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use waffle_chat_types::StreamEvent;

/// Stream every published event as `data: <json>`.
///
/// Keepalive markers come from the broker as ordinary events, not SSE
/// comments, so clients see them as `{"keepalive":true}`.
pub async fn stream_handler(Extension(relay): Extension<Arc<ChatRelay>>) -> impl IntoResponse {
    let events = BroadcastStream::new(relay.subscribe())
        .filter_map(|result| match result {
            Ok(event) => to_sse(&event),
            Err(err) => {
                tracing::warn!("Stream subscriber lagged: {}", err);
                None
            }
        })
        .map(Ok::<_, Infallible>);

    (
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Sse::new(events),
    )
}

fn to_sse(event: &StreamEvent) -> Option<Event> {
    match event.to_json() {
        Ok(data) => Some(Event::default().data(data)),
        Err(e) => {
            tracing::error!("Failed to encode stream event: {}", e);
            None
        }
    }
}
