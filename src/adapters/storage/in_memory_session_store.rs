//! In-Memory Session Store Adapter
//!
//! The map lock is held only to look up, insert or remove a handle. Turns
//! lock the individual session, never the map.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::dialogue::{prompts::DEFAULT_WELCOME, Session};
use crate::domain::foundation::{SessionKey, Timestamp};
use crate::ports::{SessionHandle, SessionStore, SessionStoreError};

/// In-memory storage for dialogue sessions
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionKey, SessionHandle>>>,
    welcome: Arc<str>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_welcome(DEFAULT_WELCOME)
    }

    /// Store whose new sessions open with `welcome`.
    pub fn with_welcome(welcome: impl Into<String>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            welcome: Arc::from(welcome.into()),
        }
    }

    /// Drops every session (useful for tests)
    pub async fn clear(&self) {
        let mut sessions = self.sessions.write().await;
        for handle in sessions.values() {
            handle.mark_evicted();
        }
        sessions.clear();
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, key: &SessionKey) -> Result<SessionHandle, SessionStoreError> {
        if let Some(handle) = self.sessions.read().await.get(key) {
            return Ok(handle.clone());
        }

        let mut sessions = self.sessions.write().await;
        let handle = sessions
            .entry(key.clone())
            .or_insert_with(|| {
                tracing::info!(session_id = %key, "Session created");
                SessionHandle::new(Session::new(key.clone(), self.welcome.as_ref()))
            })
            .clone();
        Ok(handle)
    }

    async fn reset(&self, key: &SessionKey) -> Result<(), SessionStoreError> {
        let handle = self
            .sessions
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| SessionStoreError::NotFound(key.clone()))?;

        handle.lock().await.reset();
        Ok(())
    }

    async fn delete(&self, key: &SessionKey) -> Result<bool, SessionStoreError> {
        let removed = self.sessions.write().await.remove(key);
        match removed {
            Some(handle) => {
                handle.mark_evicted();
                tracing::info!(session_id = %key, "Session deleted");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn exists(&self, key: &SessionKey) -> Result<bool, SessionStoreError> {
        Ok(self.sessions.read().await.contains_key(key))
    }

    async fn len(&self) -> Result<usize, SessionStoreError> {
        Ok(self.sessions.read().await.len())
    }

    async fn evict_idle(&self, max_idle: Duration) -> Result<usize, SessionStoreError> {
        let now = Timestamp::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|key, handle| {
            let idle = handle
                .try_lock()
                .map(|session| session.is_idle(now, max_idle))
                .unwrap_or(false);
            if idle {
                handle.mark_evicted();
                tracing::debug!(session_id = %key, "Idle session evicted");
            }
            !idle
        });

        Ok(before - sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dialogue::Role;

    fn key(s: &str) -> SessionKey {
        SessionKey::new(s).unwrap()
    }

    #[tokio::test]
    async fn first_contact_creates_session_with_welcome() {
        let store = InMemorySessionStore::with_welcome("Hi there");
        let handle = store.get_or_create(&key("a")).await.unwrap();

        let session = handle.lock().await;
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].role, Role::Assistant);
        assert_eq!(session.transcript()[0].text, "Hi there");
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn same_key_returns_same_session() {
        let store = InMemorySessionStore::new();
        let a = store.get_or_create(&key("a")).await.unwrap();
        let b = store.get_or_create(&key("a")).await.unwrap();
        assert!(a.same_as(&b));
    }

    #[tokio::test]
    async fn delete_flags_outstanding_handles() {
        let store = InMemorySessionStore::new();
        let handle = store.get_or_create(&key("a")).await.unwrap();

        assert!(store.delete(&key("a")).await.unwrap());
        assert!(handle.is_evicted());
        assert!(!store.exists(&key("a")).await.unwrap());
        assert!(!store.delete(&key("a")).await.unwrap());

        let fresh = store.get_or_create(&key("a")).await.unwrap();
        assert!(!fresh.same_as(&handle));
        assert!(!fresh.is_evicted());
    }

    #[tokio::test]
    async fn delete_does_not_wait_for_a_locked_session() {
        let store = InMemorySessionStore::new();
        let handle = store.get_or_create(&key("a")).await.unwrap();
        let _guard = handle.lock().await;

        assert!(store.delete(&key("a")).await.unwrap());
        assert!(handle.is_evicted());
    }

    #[tokio::test]
    async fn reset_clears_transcript() {
        let store = InMemorySessionStore::new();
        let handle = store.get_or_create(&key("a")).await.unwrap();
        handle.lock().await.push_user("hello");

        store.reset(&key("a")).await.unwrap();
        assert!(handle.lock().await.transcript().is_empty());
        assert!(matches!(
            store.reset(&key("missing")).await,
            Err(SessionStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn evict_idle_keeps_fresh_and_busy_sessions() {
        let store = InMemorySessionStore::new();
        let idle = store.get_or_create(&key("idle")).await.unwrap();
        let busy = store.get_or_create(&key("busy")).await.unwrap();
        let _guard = busy.lock().await;

        tokio::time::sleep(Duration::from_millis(1100)).await;
        store.get_or_create(&key("fresh")).await.unwrap();

        let evicted = store.evict_idle(Duration::from_secs(1)).await.unwrap();
        assert_eq!(evicted, 1);
        assert!(idle.is_evicted());
        assert!(!busy.is_evicted());
        assert!(store.exists(&key("fresh")).await.unwrap());
        assert!(store.exists(&key("busy")).await.unwrap());
    }

    #[tokio::test]
    async fn distinct_keys_are_independent() {
        let store = InMemorySessionStore::new();
        let a = store.get_or_create(&key("a")).await.unwrap();
        let b = store.get_or_create(&key("b")).await.unwrap();

        let _guard_a = a.lock().await;
        // b stays lockable while a is held
        assert!(b.try_lock().is_some());
    }
}
