//! Local actor identity.
//!
//! The actor id is minted once per device and then read back from an
//! [`IdentityStore`] on every later session. Message ids are minted fresh
//! for every send.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use waffle_chat_types::{ActorId, MessageId, WireError, ACTOR_ID_KEY};

/// Identity errors. Both are fatal to session start.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The random source failed.
    #[error("entropy source unavailable: {0}")]
    Entropy(#[from] WireError),

    /// The backing store could not be read or written.
    #[error("identity store unavailable: {0}")]
    Persistence(String),
}

/// Durable string key-value storage for identity material.
pub trait IdentityStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, IdentityError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), IdentityError>;
}

/// In-memory identity store.
///
/// Clones share state. Useful for tests and for ephemeral sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryIdentityStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    values: HashMap<String, String>,
    unavailable: Option<String>,
    writes: usize,
}

impl MemoryIdentityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `value` under `key`.
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .lock()
            .values
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Make every subsequent read and write fail with `reason`.
    pub fn make_unavailable(&self, reason: &str) {
        self.lock().unavailable = Some(reason.to_string());
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryStoreInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn get(&self, key: &str) -> Result<Option<String>, IdentityError> {
        let inner = self.lock();
        if let Some(reason) = &inner.unavailable {
            return Err(IdentityError::Persistence(reason.clone()));
        }
        Ok(inner.values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), IdentityError> {
        let mut inner = self.lock();
        if let Some(reason) = &inner.unavailable {
            return Err(IdentityError::Persistence(reason.clone()));
        }
        inner.values.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }
}

/// Produces the local actor id and fresh message ids.
#[derive(Debug)]
pub struct IdentityProvider<S: IdentityStore> {
    store: S,
    key: String,
    cached: Mutex<Option<ActorId>>,
}

impl<S: IdentityStore> IdentityProvider<S> {
    /// Create a provider persisting under the well-known actor key.
    pub fn new(store: S) -> Self {
        Self::with_key(store, ACTOR_ID_KEY)
    }

    /// Create a provider persisting under a custom key.
    pub fn with_key(store: S, key: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
            cached: Mutex::new(None),
        }
    }

    /// Return the local actor id.
    ///
    /// The first call reads the store and, if nothing is there, mints and
    /// persists a new id before returning it. Later calls hit the cache.
    pub fn actor_id(&self) -> Result<ActorId, IdentityError> {
        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(actor) = cached.as_ref() {
            return Ok(actor.clone());
        }

        let actor = match self.store.get(&self.key)? {
            Some(existing) if !existing.is_empty() => {
                tracing::debug!("Loaded actor id {} from store", existing);
                ActorId::new(existing)
            }
            _ => {
                let fresh = ActorId::generate()?;
                self.store.set(&self.key, fresh.as_str())?;
                tracing::info!("Minted new actor id {}", fresh);
                fresh
            }
        };

        *cached = Some(actor.clone());
        Ok(actor)
    }

    /// Mint a fresh message id.
    pub fn gen_message_id(&self) -> Result<MessageId, IdentityError> {
        Ok(MessageId::generate()?)
    }

    /// The key the actor id is persisted under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Borrow the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_id(s: &str) -> bool {
        s.len() == 9 && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
    }

    #[test]
    fn mints_and_persists_on_first_use() {
        let store = MemoryIdentityStore::new();
        let provider = IdentityProvider::new(store.clone());

        let actor = provider.actor_id().unwrap();

        assert!(is_id(actor.as_str()));
        assert_eq!(
            store.get(ACTOR_ID_KEY).unwrap().as_deref(),
            Some(actor.as_str())
        );
    }

    #[test]
    fn reuses_persisted_id() {
        let store = MemoryIdentityStore::with_value(ACTOR_ID_KEY, "a1b2c3d4e");
        let provider = IdentityProvider::new(store.clone());

        assert_eq!(provider.actor_id().unwrap(), ActorId::new("a1b2c3d4e"));
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn survives_across_provider_instances() {
        let store = MemoryIdentityStore::new();
        let first = IdentityProvider::new(store.clone()).actor_id().unwrap();
        let second = IdentityProvider::new(store.clone()).actor_id().unwrap();

        assert_eq!(first, second);
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn caches_after_first_call() {
        let store = MemoryIdentityStore::new();
        let provider = IdentityProvider::new(store.clone());
        let actor = provider.actor_id().unwrap();

        // Store going away mid-session does not matter once cached
        store.make_unavailable("disk gone");

        assert_eq!(provider.actor_id().unwrap(), actor);
    }

    #[test]
    fn unavailable_store_is_an_error() {
        let store = MemoryIdentityStore::new();
        store.make_unavailable("read-only filesystem");
        let provider = IdentityProvider::new(store);

        assert!(matches!(
            provider.actor_id(),
            Err(IdentityError::Persistence(_))
        ));
    }

    #[test]
    fn custom_key_is_used() {
        let store = MemoryIdentityStore::new();
        let provider = IdentityProvider::with_key(store.clone(), "test:actor");
        provider.actor_id().unwrap();

        assert!(store.get("test:actor").unwrap().is_some());
        assert!(store.get(ACTOR_ID_KEY).unwrap().is_none());
    }

    #[test]
    fn message_ids_are_fresh() {
        let provider = IdentityProvider::new(MemoryIdentityStore::new());
        let a = provider.gen_message_id().unwrap();
        let b = provider.gen_message_id().unwrap();

        assert!(is_id(a.as_str()));
        assert_ne!(a, b);
    }
}
