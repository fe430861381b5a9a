//! Per-session serialization.
//!
//! At most one operation runs against a session at a time. Locks are held
//! weakly in the map so idle sessions cost nothing once their guard drops.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::foundation::SessionId;

/// Map entries past this count trigger pruning of dead locks.
const PRUNE_THRESHOLD: usize = 128;

/// Guard proving exclusive access to one session.
pub type SessionGuard = OwnedMutexGuard<()>;

/// Registry of per-session async mutexes.
#[derive(Debug, Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<SessionId, Weak<AsyncMutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other operation holds `session_id`.
    pub async fn acquire(&self, session_id: &SessionId) -> SessionGuard {
        self.lock_for(session_id).lock_owned().await
    }

    /// Number of sessions with a live lock.
    pub fn active(&self) -> usize {
        let locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
        locks.values().filter(|w| w.strong_count() > 0).count()
    }

    fn lock_for(&self, session_id: &SessionId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());

        if locks.len() > PRUNE_THRESHOLD {
            locks.retain(|_, weak| weak.strong_count() > 0);
        }

        if let Some(existing) = locks.get(session_id).and_then(Weak::upgrade) {
            return existing;
        }

        let lock = Arc::new(AsyncMutex::new(()));
        locks.insert(*session_id, Arc::downgrade(&lock));
        lock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_session_is_exclusive() {
        let locks = Arc::new(SessionLocks::new());
        let id = SessionId::new();

        let guard = locks.acquire(&id).await;
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move { locks.acquire(&id).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        let second = tokio::time::timeout(Duration::from_secs(1), contender).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn distinct_sessions_do_not_block() {
        let locks = SessionLocks::new();
        let _a = locks.acquire(&SessionId::new()).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(&SessionId::new()))
            .await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn dropped_guards_release_entries() {
        let locks = SessionLocks::new();
        let id = SessionId::new();
        {
            let _guard = locks.acquire(&id).await;
            assert_eq!(locks.active(), 1);
        }
        assert_eq!(locks.active(), 0);
    }
}
