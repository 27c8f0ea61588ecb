//! SyncController - the main interface for Waffle.
//!
//! This module provides [`SyncController`], the session object that
//! reconciles the history fetch, the push stream and local sends into one
//! deduplicated timeline.
//!
//! # Architecture
//!
//! SyncController uses the pure session state machine (from chat-core) for
//! lifecycle logic and interprets its actions to perform the actual I/O via
//! the [`ChatTransport`] trait.
//!
//! ```text
//! Application → SyncController → ChatTransport → Network
//!                   ↓
//!              chat-core (state machine, MessageStore, render)
//!                   ↓
//!               Presenter
//! ```
//!
//! Every successful insert is followed by a full render pass handed to the
//! [`Presenter`]. Duplicates, keepalives and echoes of our own sends never
//! reach the store and never render.
//!
//! # Example
//!
//! ```ignore
//! let session = SyncController::new(transport, identity, presenter);
//! let report = session.start().await?;
//! session.send("hi").await?;
//! session.run_stream().await?;
//! session.close().await;
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::{Mutex, Notify};
use waffle_chat_core::{
    render, Action, DisplayItem, Event, MessageStore, SessionEvent, SessionState,
};
use waffle_chat_types::{now_millis, ActorId, Message, MessageId, StreamEvent};

use crate::identity::{IdentityError, IdentityProvider, IdentityStore};
use crate::present::Presenter;
use crate::transport::{ChatTransport, EventStream, TransportError};

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A locally minted id was already in the store. Nothing was sent.
    #[error("duplicate message id: {0}")]
    DuplicateMessage(MessageId),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The message was stored and rendered locally but not transmitted.
    #[error("send of {id} failed: {source}")]
    SendFailed {
        /// Id of the message that stays in the local timeline.
        id: MessageId,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },

    /// Identity could not be established.
    #[error("identity unavailable: {0}")]
    Identity(#[from] IdentityError),

    /// Session is not active.
    #[error("session not active")]
    NotActive,

    /// `start()` was called more than once.
    #[error("session already started")]
    AlreadyStarted,

    /// No push-stream subscription is held.
    #[error("not subscribed to the push stream")]
    NotSubscribed,
}

/// Outcome of [`SyncController::start`].
///
/// Only an identity failure makes start fail; stream and history failures
/// are recorded here and the session is active regardless.
#[derive(Debug)]
pub struct StartReport {
    /// The resolved local actor id.
    pub actor: ActorId,
    /// Whether the push stream was opened.
    pub stream_connected: bool,
    /// Number of history messages accepted, if the fetch succeeded.
    pub history_loaded: Option<usize>,
    /// Why the push stream could not be opened.
    pub stream_error: Option<ClientError>,
    /// Why the history could not be loaded.
    pub history_error: Option<ClientError>,
}

impl StartReport {
    fn new(actor: ActorId) -> Self {
        Self {
            actor,
            stream_connected: false,
            history_loaded: None,
            stream_error: None,
            history_error: None,
        }
    }

    /// Whether every ingestion path came up.
    pub fn is_complete(&self) -> bool {
        self.stream_connected && self.history_loaded.is_some()
    }
}

/// One chat session.
///
/// Owns the message store, the push-stream subscription and the resolved
/// actor id. Safe to share between tasks (e.g. behind an `Arc`): one task
/// runs [`run_stream`](Self::run_stream) while others send.
pub struct SyncController<T: ChatTransport, S: IdentityStore, P: Presenter> {
    transport: T,
    identity: IdentityProvider<S>,
    presenter: P,
    state: Mutex<SessionState>,
    store: Mutex<MessageStore>,
    stream: Mutex<Option<EventStream>>,
    events: Mutex<Vec<SessionEvent>>,
    shutdown: Notify,
    renders: AtomicU64,
}

impl<T: ChatTransport, S: IdentityStore, P: Presenter> SyncController<T, S, P> {
    /// Create a new session. Nothing happens until [`start`](Self::start).
    pub fn new(transport: T, identity: IdentityProvider<S>, presenter: P) -> Self {
        Self {
            transport,
            identity,
            presenter,
            state: Mutex::new(SessionState::new()),
            store: Mutex::new(MessageStore::new()),
            stream: Mutex::new(None),
            events: Mutex::new(Vec::new()),
            shutdown: Notify::new(),
            renders: AtomicU64::new(0),
        }
    }

    /// Start the session.
    ///
    /// Resolves the actor id, opens the push stream and loads history, in
    /// that order. The stream is opened first so nothing sent while history
    /// is in flight is missed; anything seen on both paths is deduplicated.
    pub async fn start(&self) -> Result<StartReport, ClientError> {
        let mut pending: VecDeque<Action> = self.apply(Event::StartRequested).await.into();
        if pending.is_empty() {
            return Err(ClientError::AlreadyStarted);
        }

        let mut report: Option<StartReport> = None;
        let mut failure: Option<IdentityError> = None;

        while let Some(action) = pending.pop_front() {
            match action {
                Action::ResolveIdentity => match self.identity.actor_id() {
                    Ok(actor) => {
                        report = Some(StartReport::new(actor.clone()));
                        pending.extend(self.apply(Event::IdentityResolved { actor }).await);
                    }
                    Err(e) => {
                        tracing::error!("Identity unavailable: {}", e);
                        let error = e.to_string();
                        failure = Some(e);
                        pending.extend(self.apply(Event::IdentityFailed { error }).await);
                    }
                },
                Action::Subscribe => {
                    let outcome = self.subscribe().await;
                    if let Some(report) = report.as_mut() {
                        match outcome {
                            Ok(()) => report.stream_connected = true,
                            Err(e) => {
                                tracing::warn!("Push stream unavailable: {}", e);
                                report.stream_error = Some(e);
                            }
                        }
                    }
                }
                Action::LoadHistory => {
                    let outcome = self.load_history().await;
                    if let Some(report) = report.as_mut() {
                        match outcome {
                            Ok(accepted) => report.history_loaded = Some(accepted),
                            Err(e) => {
                                tracing::warn!("History load failed: {}", e);
                                report.history_error = Some(e);
                            }
                        }
                    }
                }
                Action::ReleaseStream => self.release_stream().await,
                Action::Emit(event) => self.emit(event).await,
            }
        }

        match (failure, report) {
            (Some(e), _) => Err(e.into()),
            (None, Some(report)) => Ok(report),
            (None, None) => Err(ClientError::NotActive),
        }
    }

    /// Open (or reopen) the push-stream subscription.
    ///
    /// A previously held subscription is released.
    pub async fn subscribe(&self) -> Result<(), ClientError> {
        self.active_actor().await?;

        let stream = self.transport.subscribe().await?;
        let previous = self.stream.lock().await.replace(stream);
        if previous.is_some() {
            tracing::debug!("Replaced existing push-stream subscription");
        }
        tracing::info!("Subscribed to push stream");
        Ok(())
    }

    /// Fetch the full history once and merge it into the store.
    ///
    /// Exactly one render pass follows the batch. Returns how many records
    /// were new.
    pub async fn load_history(&self) -> Result<usize, ClientError> {
        let actor = self.active_actor().await?;

        let history = self.transport.fetch_history().await?;
        let offered = history.len();
        let accepted = self.store.lock().await.insert_batch(history);
        tracing::info!("Loaded history: {} of {} records new", accepted, offered);

        self.render_pass(&actor).await;
        Ok(accepted)
    }

    /// Handle one push-stream event.
    ///
    /// Returns `true` if a message was inserted (and rendered).
    pub async fn on_stream_event(&self, event: StreamEvent) -> Result<bool, ClientError> {
        let actor = self.active_actor().await?;

        let message = match event {
            StreamEvent::Keepalive => {
                tracing::trace!("Keepalive");
                return Ok(false);
            }
            StreamEvent::Message(message) => message,
        };

        if message.sender == actor {
            tracing::debug!("Dropping echo of own message {}", message.id);
            return Ok(false);
        }

        let id = message.id.clone();
        let inserted = self.store.lock().await.try_insert(message);
        if !inserted {
            tracing::debug!("Dropping duplicate message {}", id);
            return Ok(false);
        }

        self.render_pass(&actor).await;
        Ok(true)
    }

    /// Author and send a message.
    ///
    /// The message is inserted and rendered before it is transmitted. A
    /// transmission failure is returned as [`ClientError::SendFailed`] and
    /// the message stays in the timeline.
    pub async fn send(&self, content: &str) -> Result<Message, ClientError> {
        let actor = self.active_actor().await?;

        let timestamp = now_millis();
        let id = self.identity.gen_message_id()?;
        let message = Message::new(id.clone(), actor.clone(), content, timestamp);

        if !self.store.lock().await.try_insert(message.clone()) {
            tracing::warn!("Freshly minted id {} already stored", id);
            return Err(ClientError::DuplicateMessage(id));
        }
        self.render_pass(&actor).await;

        if let Err(source) = self.transport.post_message(&message).await {
            tracing::warn!("Send of {} failed: {}", id, source);
            return Err(ClientError::SendFailed { id, source });
        }

        tracing::debug!("Sent message {}", id);
        Ok(message)
    }

    /// Drain the push stream until it ends, fails, or the session closes.
    ///
    /// Undecodable events are logged and skipped. Returns how many messages
    /// were inserted.
    pub async fn run_stream(&self) -> Result<usize, ClientError> {
        self.active_actor().await?;

        let mut stream = self
            .stream
            .lock()
            .await
            .take()
            .ok_or(ClientError::NotSubscribed)?;
        let mut inserted = 0;

        loop {
            let next = tokio::select! {
                biased;
                _ = self.shutdown.notified() => {
                    tracing::debug!("Push stream released by close");
                    break;
                }
                next = stream.next() => next,
            };

            match next {
                Some(Ok(event)) => match self.on_stream_event(event).await {
                    Ok(true) => inserted += 1,
                    Ok(false) => {}
                    Err(ClientError::NotActive) => break,
                    Err(e) => return Err(e),
                },
                Some(Err(TransportError::Decode(e))) => {
                    tracing::warn!("Skipping malformed stream event: {}", e);
                }
                Some(Err(e)) => {
                    tracing::warn!("Push stream failed: {}", e);
                    return Err(e.into());
                }
                None => {
                    tracing::info!("Push stream ended");
                    break;
                }
            }
        }

        stream.close();
        Ok(inserted)
    }

    /// End the session and release the push-stream subscription.
    ///
    /// Idempotent.
    pub async fn close(&self) {
        for action in self.apply(Event::CloseRequested).await {
            match action {
                Action::ReleaseStream => self.release_stream().await,
                Action::Emit(event) => self.emit(event).await,
                other => tracing::debug!("Ignoring {:?} while closing", other),
            }
        }
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    /// The local actor id, once the session is active.
    pub async fn actor_id(&self) -> Option<ActorId> {
        self.state.lock().await.actor().cloned()
    }

    /// The timeline in display order.
    pub async fn timeline(&self) -> Vec<Message> {
        self.store.lock().await.snapshot_ordered()
    }

    /// The current display model. Does not count as a render pass.
    pub async fn display(&self) -> Vec<DisplayItem> {
        let Some(actor) = self.actor_id().await else {
            return Vec::new();
        };
        render(&self.timeline().await, &actor)
    }

    /// Session events emitted so far.
    pub async fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().await.clone()
    }

    /// Number of render passes handed to the presenter.
    pub fn render_count(&self) -> u64 {
        self.renders.load(Ordering::SeqCst)
    }

    /// Get a reference to the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a reference to the presenter.
    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    async fn apply(&self, event: Event) -> Vec<Action> {
        let mut state = self.state.lock().await;
        let from = state.name();
        let (next, actions) = state.clone().on_event(event);
        if next.name() != from {
            tracing::debug!("Session {} -> {}", from, next.name());
        }
        *state = next;
        actions
    }

    async fn active_actor(&self) -> Result<ActorId, ClientError> {
        self.state
            .lock()
            .await
            .actor()
            .cloned()
            .ok_or(ClientError::NotActive)
    }

    async fn release_stream(&self) {
        if let Some(mut stream) = self.stream.lock().await.take() {
            stream.close();
        }
        // Wakes a running run_stream, which holds the stream itself
        self.shutdown.notify_one();
        tracing::info!("Released push stream");
    }

    async fn emit(&self, event: SessionEvent) {
        match &event {
            SessionEvent::Ready { actor } => tracing::info!("Session ready as {}", actor),
            SessionEvent::IdentityUnavailable { error } => {
                tracing::error!("Session cannot start: {}", error)
            }
            SessionEvent::Closed => tracing::info!("Session closed"),
        }
        self.events.lock().await.push(event);
    }

    async fn render_pass(&self, actor: &ActorId) {
        let ordered = self.store.lock().await.snapshot_ordered();
        let items = render(&ordered, actor);
        self.presenter.present(&items);
        self.renders.fetch_add(1, Ordering::SeqCst);
    }
}
