//! CLI command implementations.

pub mod history;
pub mod init;
pub mod send;
pub mod status;
pub mod watch;

use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use waffle_chat_client::{
    ChatTransport, ClientConfig, IdentityProvider, MockTransport, Presenter, SyncController,
};
use waffle_chat_core::DisplayItem;
use waffle_chat_types::{now_millis, Message, MessageId, StreamEvent};

use crate::config::FileIdentityStore;

/// A session as the CLI runs it.
pub type Session<T> = SyncController<T, FileIdentityStore, TerminalPresenter>;

/// Build a session over `transport` using the identity in `data_dir`.
pub fn session<T: ChatTransport>(
    transport: T,
    data_dir: &Path,
    config: &ClientConfig,
    presenter: TerminalPresenter,
) -> Session<T> {
    let identity = IdentityProvider::with_key(FileIdentityStore::new(data_dir), &config.identity_key);
    SyncController::new(transport, identity, presenter)
}

/// Fail unless `init` has been run for `data_dir`.
pub fn ensure_initialized(data_dir: &Path) -> Result<()> {
    if !FileIdentityStore::new(data_dir).exists() {
        anyhow::bail!("Not initialized. Run 'waffle init' first.");
    }
    Ok(())
}

/// Mock transport preloaded with a short demo conversation.
///
/// The push stream delivers one more message and then ends, so commands
/// that follow the stream terminate.
pub fn demo_transport() -> MockTransport {
    let now = now_millis();
    let transport = MockTransport::new();
    transport.set_history(vec![
        Message::new("d3m0a0001", "waffle-bot", "Welcome to Waffle!", now - 2_000),
        Message::new("d3m0a0002", "waffle-bot", "This is a mock conversation.", now - 1_000),
    ]);
    transport
}

/// Feed the demo stream for a started mock session.
pub fn finish_demo_stream(transport: &MockTransport) {
    transport.push_event(StreamEvent::Keepalive);
    transport.push_event(StreamEvent::Message(Message::new(
        "d3m0a0003",
        "syrup",
        "Hello from the stream.",
        now_millis(),
    )));
    transport.end_streams();
}

/// Prints render passes to stdout.
///
/// Terminal output is append-only, so each pass prints only the messages
/// not printed before. A late message can sort into the middle of the
/// timeline; it is printed at the bottom with its author label restored.
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    printed: Mutex<Printed>,
    muted: bool,
}

#[derive(Debug, Default)]
struct Printed {
    ids: HashSet<MessageId>,
    last: Option<MessageId>,
}

impl TerminalPresenter {
    /// Presenter that prints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Presenter that prints nothing.
    pub fn muted() -> Self {
        Self {
            muted: true,
            ..Self::default()
        }
    }

    /// Number of messages printed (or skipped, when muted) so far.
    pub fn shown(&self) -> usize {
        self.lock().ids.len()
    }

    /// Lines for the messages in `items` not yet printed, marking them printed.
    pub fn pending_lines(&self, items: &[DisplayItem]) -> Vec<String> {
        let mut printed = self.lock();
        let mut lines = Vec::new();

        for (index, item) in items.iter().enumerate() {
            if printed.ids.contains(&item.id) {
                continue;
            }

            let follows_last = index > 0 && printed.last.as_ref() == Some(&items[index - 1].id);
            if item.hide_author && !item.is_own && !follows_last {
                let labelled = DisplayItem {
                    hide_author: false,
                    ..item.clone()
                };
                lines.push(format_item(&labelled));
            } else {
                lines.push(format_item(item));
            }

            printed.ids.insert(item.id.clone());
            printed.last = Some(item.id.clone());
        }

        lines
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Printed> {
        self.printed.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Presenter for TerminalPresenter {
    fn present(&self, items: &[DisplayItem]) {
        let lines = self.pending_lines(items);
        if !self.muted {
            for line in lines {
                println!("{}", line);
            }
        }
    }
}

/// Format one display item as a terminal line.
pub fn format_item(item: &DisplayItem) -> String {
    match (item.is_own, item.hide_author) {
        (true, _) => format!("  > {}", item.text),
        (false, true) => format!("    {}", item.text),
        (false, false) => format!("{}: {}", item.author, item.text),
    }
}
