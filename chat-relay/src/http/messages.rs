//! Message API: list and create.

use crate::error::ApiError;
use crate::server::ChatRelay;
use axum::body::Bytes;
use axum::{Extension, Json};
use std::sync::Arc;
use waffle_chat_types::Message;

/// Return every stored message in arrival order.
pub async fn index_handler(Extension(relay): Extension<Arc<ChatRelay>>) -> Json<Vec<Message>> {
    Json(relay.messages().await)
}

/// Store one message, broadcast it, and echo it back.
pub async fn create_handler(
    Extension(relay): Extension<Arc<ChatRelay>>,
    body: Bytes,
) -> Result<Json<Message>, ApiError> {
    let message = Message::from_json(&body)?;
    Ok(Json(relay.create_message(message).await))
}
