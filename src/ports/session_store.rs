//! Session Store Port - Process-wide keyed dialogue state.
//!
//! Each session sits behind its own async mutex so turns for one session are
//! serialized while different sessions proceed concurrently. A handle that
//! has been deleted or evicted is flagged; holders must check the flag after
//! locking and drop any results instead of writing them back.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::dialogue::Session;
use crate::domain::foundation::SessionKey;

/// Errors that can occur in session store operations
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session not found: {0}")]
    NotFound(SessionKey),
}

struct SessionCell {
    session: Mutex<Session>,
    evicted: AtomicBool,
}

/// Shared, lockable reference to one live session.
#[derive(Clone)]
pub struct SessionHandle(Arc<SessionCell>);

impl SessionHandle {
    pub fn new(session: Session) -> Self {
        Self(Arc::new(SessionCell {
            session: Mutex::new(session),
            evicted: AtomicBool::new(false),
        }))
    }

    /// Waits for exclusive access to the session.
    pub async fn lock(&self) -> MutexGuard<'_, Session> {
        self.0.session.lock().await
    }

    /// Exclusive access without waiting. `None` while a turn holds the lock.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, Session>> {
        self.0.session.try_lock().ok()
    }

    /// True once the store has dropped this session.
    pub fn is_evicted(&self) -> bool {
        self.0.evicted.load(Ordering::Acquire)
    }

    /// Marks the session as gone. Called by the store when it removes the entry.
    pub fn mark_evicted(&self) {
        self.0.evicted.store(true, Ordering::Release);
    }

    /// True when both handles point at the same session.
    pub fn same_as(&self, other: &SessionHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("evicted", &self.is_evicted())
            .finish_non_exhaustive()
    }
}

/// Port for storing live dialogue sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the session for `key`, creating it with the welcome message on first contact.
    async fn get_or_create(&self, key: &SessionKey) -> Result<SessionHandle, SessionStoreError>;

    /// Empties slots and transcript and clears the failure count. Keeps the key.
    async fn reset(&self, key: &SessionKey) -> Result<(), SessionStoreError>;

    /// Removes the session. Returns false when it did not exist.
    ///
    /// Does not wait for an in-flight turn; the handle is flagged instead.
    async fn delete(&self, key: &SessionKey) -> Result<bool, SessionStoreError>;

    async fn exists(&self, key: &SessionKey) -> Result<bool, SessionStoreError>;

    /// Number of live sessions.
    async fn len(&self) -> Result<usize, SessionStoreError>;

    /// Removes sessions idle for longer than `max_idle`. Returns how many were removed.
    ///
    /// Sessions with a turn in progress are never idle.
    async fn evict_idle(&self, max_idle: Duration) -> Result<usize, SessionStoreError>;
}
