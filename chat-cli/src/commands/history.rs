//! Print the conversation so far.

use anyhow::{Context, Result};
use std::path::Path;
use waffle_chat_client::{ChatTransport, ClientConfig, HttpTransport};

use super::{demo_transport, ensure_initialized, session, Session, TerminalPresenter};

/// Run the history command.
pub async fn run(data_dir: &Path, config: &ClientConfig, use_mock: bool) -> Result<()> {
    ensure_initialized(data_dir)?;

    if use_mock {
        let session = session(demo_transport(), data_dir, config, TerminalPresenter::new());
        print_history(session).await.map(|_| ())
    } else {
        let transport = HttpTransport::new(config.clone()).context("Failed to build transport")?;
        let session = session(transport, data_dir, config, TerminalPresenter::new());
        print_history(session).await.map(|_| ())
    }
}

async fn print_history<T: ChatTransport>(session: Session<T>) -> Result<usize> {
    // The history render pass prints the timeline
    let report = session.start().await.context("Failed to start session")?;
    session.close().await;

    if let Some(e) = report.history_error {
        return Err(e).context("Failed to load history");
    }

    let count = session.presenter().shown();
    if count == 0 {
        println!("(no messages)");
    }
    Ok(count)
}
