//! Send one message.

use anyhow::{Context, Result};
use std::path::Path;
use waffle_chat_client::{ChatTransport, ClientConfig, ClientError, HttpTransport};
use waffle_chat_types::Message;

use super::{demo_transport, ensure_initialized, session, Session, TerminalPresenter};

/// Run the send command.
pub async fn run(data_dir: &Path, config: &ClientConfig, content: &str, use_mock: bool) -> Result<()> {
    ensure_initialized(data_dir)?;

    let message = if use_mock {
        let session = session(demo_transport(), data_dir, config, TerminalPresenter::muted());
        do_send(session, content).await?
    } else {
        let transport = HttpTransport::new(config.clone()).context("Failed to build transport")?;
        let session = session(transport, data_dir, config, TerminalPresenter::muted());
        do_send(session, content).await?
    };

    println!("Sent successfully!");
    println!("  Message ID: {}", message.id);
    println!("  Sender:     {}", message.sender);

    Ok(())
}

async fn do_send<T: ChatTransport>(session: Session<T>, content: &str) -> Result<Message> {
    session.start().await.context("Failed to start session")?;
    let result = session.send(content).await;
    session.close().await;

    match result {
        Ok(message) => Ok(message),
        Err(ClientError::SendFailed { id, source }) => {
            Err(source).with_context(|| format!("Message {} was not delivered", id))
        }
        Err(e) => Err(e).context("Failed to send"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::init;
    use tempfile::tempdir;
    use waffle_chat_client::{IdentityStore, MockTransport};
    use waffle_chat_types::ACTOR_ID_KEY;

    use crate::config::FileIdentityStore;

    #[tokio::test]
    async fn send_requires_init() {
        let dir = tempdir().unwrap();
        let result = run(dir.path(), &ClientConfig::default(), "hi", true).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn send_uses_stored_identity() {
        let dir = tempdir().unwrap();
        init::run(dir.path(), None).await.unwrap();
        let actor = FileIdentityStore::new(dir.path())
            .get(ACTOR_ID_KEY)
            .unwrap()
            .unwrap();

        let transport = MockTransport::new();
        let config = ClientConfig::default();
        let session = session(transport.clone(), dir.path(), &config, TerminalPresenter::muted());

        let message = do_send(session, "hi").await.unwrap();

        assert_eq!(message.sender.as_str(), actor);
        assert_eq!(transport.last_posted(), Some(message));
    }

    #[tokio::test]
    async fn send_failure_is_reported() {
        let dir = tempdir().unwrap();
        init::run(dir.path(), None).await.unwrap();

        let transport = MockTransport::new();
        transport.fail_next_post("connection reset");
        let config = ClientConfig::default();
        let session = session(transport, dir.path(), &config, TerminalPresenter::muted());

        let err = do_send(session, "hi").await.unwrap_err();
        assert!(err.to_string().contains("was not delivered"));
    }
}
