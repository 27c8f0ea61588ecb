//! Follow the conversation live.

use anyhow::{Context, Result};
use std::path::Path;
use waffle_chat_client::{ChatTransport, ClientConfig, HttpTransport};

use super::{
    demo_transport, ensure_initialized, finish_demo_stream, session, Session, TerminalPresenter,
};

/// Run the watch command.
pub async fn run(data_dir: &Path, config: &ClientConfig, use_mock: bool) -> Result<()> {
    ensure_initialized(data_dir)?;

    let received = if use_mock {
        let transport = demo_transport();
        let session = session(transport.clone(), data_dir, config, TerminalPresenter::new());
        start(&session).await?;
        finish_demo_stream(&transport);
        follow(&session).await?
    } else {
        let transport = HttpTransport::new(config.clone()).context("Failed to build transport")?;
        let session = session(transport, data_dir, config, TerminalPresenter::new());
        start(&session).await?;
        follow(&session).await?
    };

    eprintln!("({} new messages)", received);
    Ok(())
}

async fn start<T: ChatTransport>(session: &Session<T>) -> Result<()> {
    let report = session.start().await.context("Failed to start session")?;
    if let Some(e) = report.stream_error {
        return Err(e).context("Failed to open push stream");
    }
    if let Some(e) = &report.history_error {
        eprintln!("warning: history unavailable: {}", e);
    }
    Ok(())
}

/// Follow the push stream until it ends or Ctrl-C is pressed.
async fn follow<T: ChatTransport>(session: &Session<T>) -> Result<usize> {
    let received = tokio::select! {
        result = session.run_stream() => result.context("Push stream failed")?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
            0
        }
    };

    session.close().await;
    Ok(received)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init;
    use tempfile::tempdir;
    use waffle_chat_client::MockTransport;
    use waffle_chat_types::{Message, StreamEvent};

    #[tokio::test]
    async fn watch_with_mock_terminates() {
        let dir = tempdir().unwrap();
        init::run(dir.path(), None).await.unwrap();

        run(dir.path(), &ClientConfig::default(), true).await.unwrap();
    }

    #[tokio::test]
    async fn follow_counts_new_messages() {
        let dir = tempdir().unwrap();
        init::run(dir.path(), None).await.unwrap();
        let config = ClientConfig::default();

        let transport = MockTransport::new();
        let session = session(transport.clone(), dir.path(), &config, TerminalPresenter::muted());
        start(&session).await.unwrap();

        transport.push_event(StreamEvent::Message(Message::new("m1", "bob", "a", 1)));
        transport.push_event(StreamEvent::Message(Message::new("m2", "bob", "b", 2)));
        transport.end_streams();

        assert_eq!(follow(&session).await.unwrap(), 2);
        assert_eq!(session.presenter().shown(), 2);
        assert!(session.state().await.is_closed());
    }

    #[tokio::test]
    async fn watch_fails_without_stream() {
        let dir = tempdir().unwrap();
        init::run(dir.path(), None).await.unwrap();
        let config = ClientConfig::default();

        let transport = MockTransport::new();
        transport.fail_next_subscribe("refused");
        let session = session(transport, dir.path(), &config, TerminalPresenter::muted());

        assert!(start(&session).await.is_err());
    }
}
