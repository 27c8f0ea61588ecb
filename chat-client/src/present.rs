//! Presentation adapter.
//!
//! The session hands every render pass to a [`Presenter`]. What the
//! presenter does with it (draw a terminal, update a widget tree) is not the
//! session's concern.

use std::sync::{Arc, Mutex};
use waffle_chat_core::DisplayItem;

/// Receives the display model after every render pass.
pub trait Presenter: Send + Sync {
    /// Show `items`, replacing whatever was shown before.
    fn present(&self, items: &[DisplayItem]);
}

/// Presenter that records every frame it is given.
///
/// Clones share the recording.
#[derive(Debug, Default, Clone)]
pub struct RecordingPresenter {
    frames: Arc<Mutex<Vec<Vec<DisplayItem>>>>,
}

impl RecordingPresenter {
    /// Create a presenter with no frames.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames presented.
    pub fn frame_count(&self) -> usize {
        self.lock().len()
    }

    /// The most recent frame, if any.
    pub fn last_frame(&self) -> Option<Vec<DisplayItem>> {
        self.lock().last().cloned()
    }

    /// All frames, oldest first.
    pub fn frames(&self) -> Vec<Vec<DisplayItem>> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<DisplayItem>>> {
        self.frames.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Presenter for RecordingPresenter {
    fn present(&self, items: &[DisplayItem]) {
        self.lock().push(items.to_vec());
    }
}
