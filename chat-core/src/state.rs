//! Session lifecycle state machine for Waffle.
//!
//! This module provides a pure, side-effect-free state machine for the
//! lifecycle of one chat session. The state machine takes events as input
//! and produces a new state plus a list of actions to execute.
//!
//! The actual I/O (identity lookup, stream subscription, history fetch) is
//! performed by chat-client, not by this module.
//!
//! ```text
//! Uninitialized → Identifying → Active → Closed
//! ```
//!
//! There is no way back from `Active` to `Identifying`, and `Closed` is
//! terminal.

use waffle_chat_types::ActorId;

/// Session state - NO I/O, just state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Created, nothing started yet.
    #[default]
    Uninitialized,
    /// Waiting for the local actor id.
    Identifying,
    /// Identity known; stream subscribed, history loaded, sends accepted.
    Active {
        /// The resolved local actor id.
        actor: ActorId,
    },
    /// Session ended and stream released. Terminal.
    Closed,
}

impl SessionState {
    /// Create a new state machine in the Uninitialized state.
    pub fn new() -> Self {
        Self::Uninitialized
    }

    /// Process an event and return the new state plus actions to execute.
    ///
    /// This is a pure function - no side effects. The caller (chat-client)
    /// is responsible for executing the returned actions in order.
    pub fn on_event(self, event: Event) -> (Self, Vec<Action>) {
        match (self, event) {
            (Self::Uninitialized, Event::StartRequested) => {
                (Self::Identifying, vec![Action::ResolveIdentity])
            }

            (Self::Identifying, Event::IdentityResolved { actor }) => (
                Self::Active {
                    actor: actor.clone(),
                },
                vec![
                    Action::Subscribe,
                    Action::LoadHistory,
                    Action::Emit(SessionEvent::Ready { actor }),
                ],
            ),
            (Self::Identifying, Event::IdentityFailed { error }) => (
                Self::Closed,
                vec![Action::Emit(SessionEvent::IdentityUnavailable { error })],
            ),

            (Self::Active { .. }, Event::CloseRequested) => (
                Self::Closed,
                vec![Action::ReleaseStream, Action::Emit(SessionEvent::Closed)],
            ),
            (Self::Uninitialized | Self::Identifying, Event::CloseRequested) => {
                (Self::Closed, vec![Action::Emit(SessionEvent::Closed)])
            }

            // Invalid transitions (including anything after Closed) - stay put
            (state, _) => (state, vec![]),
        }
    }

    /// Check if the session accepts sends and stream events.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    /// Check if the session has ended.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// The local actor id, once resolved.
    pub fn actor(&self) -> Option<&ActorId> {
        match self {
            Self::Active { actor } => Some(actor),
            _ => None,
        }
    }

    /// Short lowercase name for logs and status output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Identifying => "identifying",
            Self::Active { .. } => "active",
            Self::Closed => "closed",
        }
    }
}

/// Events that drive the session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Application asked the session to start.
    StartRequested,
    /// Actor id was loaded or minted.
    IdentityResolved {
        /// The local actor id.
        actor: ActorId,
    },
    /// Actor id could not be produced.
    IdentityFailed {
        /// Error message describing the failure.
        error: String,
    },
    /// Application asked the session to end.
    CloseRequested,
}

/// Actions to be executed by chat-client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Load or mint the local actor id.
    ResolveIdentity,
    /// Open the push-stream subscription.
    Subscribe,
    /// Fetch the message history once.
    LoadHistory,
    /// Drop the push-stream subscription.
    ReleaseStream,
    /// Emit an event to the application.
    Emit(SessionEvent),
}

/// Events emitted to the application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Session is interactive.
    Ready {
        /// The local actor id.
        actor: ActorId,
    },
    /// Identity could not be established; the session will not start.
    IdentityUnavailable {
        /// Error message describing the failure.
        error: String,
    },
    /// Session ended.
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> ActorId {
        ActorId::new("a1b2c3d4e")
    }

    fn active() -> SessionState {
        SessionState::Active { actor: actor() }
    }

    #[test]
    fn starts_uninitialized() {
        let state = SessionState::new();
        assert!(matches!(state, SessionState::Uninitialized));
        assert_eq!(state.name(), "uninitialized");
    }

    #[test]
    fn start_request_transitions_to_identifying() {
        let (state, actions) = SessionState::new().on_event(Event::StartRequested);

        assert!(matches!(state, SessionState::Identifying));
        assert_eq!(actions, vec![Action::ResolveIdentity]);
    }

    #[test]
    fn identity_resolved_activates_and_schedules_ingestion() {
        let (state, actions) =
            SessionState::Identifying.on_event(Event::IdentityResolved { actor: actor() });

        assert!(state.is_active());
        assert_eq!(state.actor(), Some(&actor()));
        assert_eq!(actions[0], Action::Subscribe);
        assert_eq!(actions[1], Action::LoadHistory);
        assert!(actions
            .iter()
            .any(|a| matches!(a, Action::Emit(SessionEvent::Ready { .. }))));
    }

    #[test]
    fn identity_failure_is_terminal() {
        let (state, actions) = SessionState::Identifying.on_event(Event::IdentityFailed {
            error: "no entropy".into(),
        });

        assert!(state.is_closed());
        assert!(actions.iter().any(|a| matches!(
            a,
            Action::Emit(SessionEvent::IdentityUnavailable { .. })
        )));
    }

    #[test]
    fn close_from_active_releases_stream() {
        let (state, actions) = active().on_event(Event::CloseRequested);

        assert!(state.is_closed());
        assert!(actions.contains(&Action::ReleaseStream));
        assert!(actions.contains(&Action::Emit(SessionEvent::Closed)));
    }

    #[test]
    fn close_before_active_has_nothing_to_release() {
        let (state, actions) = SessionState::Identifying.on_event(Event::CloseRequested);

        assert!(state.is_closed());
        assert!(!actions.contains(&Action::ReleaseStream));
    }

    #[test]
    fn closed_is_terminal() {
        for event in [
            Event::StartRequested,
            Event::IdentityResolved { actor: actor() },
            Event::CloseRequested,
        ] {
            let (state, actions) = SessionState::Closed.on_event(event);
            assert!(state.is_closed());
            assert!(actions.is_empty());
        }
    }

    #[test]
    fn active_never_returns_to_identifying() {
        let (state, actions) = active().on_event(Event::StartRequested);
        assert_eq!(state, active());
        assert!(actions.is_empty());

        let (state, _) = active().on_event(Event::IdentityResolved {
            actor: ActorId::new("other"),
        });
        assert_eq!(state.actor(), Some(&actor()));
    }

    #[test]
    fn start_twice_is_ignored() {
        let (state, _) = SessionState::new().on_event(Event::StartRequested);
        let (state, actions) = state.on_event(Event::StartRequested);

        assert!(matches!(state, SessionState::Identifying));
        assert!(actions.is_empty());
    }
}
