//! In-Memory Transcript Store Adapter
//!
//! Keeps sessions in a map guarded by a tokio `RwLock`. Every write is checked
//! against the session's transcript rules before it is kept. Useful for tests,
//! development, and deployments without a database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{SessionId, SessionStatus};
use crate::domain::interrogation::{Insight, Message, RoundCommit, Session};
use crate::ports::{StoreError, TranscriptStore};

/// In-memory transcript store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTranscriptStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
    /// Number of upcoming writes that fail with `Unavailable`.
    failing_writes: Arc<AtomicUsize>,
}

impl InMemoryTranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` write calls fail with a transient error.
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn injected_failure(&self) -> Result<(), StoreError> {
        let outcome = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match outcome {
            Ok(_) => Err(StoreError::unavailable("injected write failure")),
            Err(_) => Ok(()),
        }
    }

    async fn mutate<F>(&self, session_id: &SessionId, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Session) -> Result<(), StoreError>,
    {
        self.injected_failure()?;
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or(StoreError::NotFound(*session_id))?;
        apply(session)
    }
}

#[async_trait]
impl TranscriptStore for InMemoryTranscriptStore {
    async fn create_session(&self, session: &Session) -> Result<(), StoreError> {
        self.injected_failure()?;
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(session.id()) {
            return Err(StoreError::Constraint(format!(
                "session {} already exists",
                session.id()
            )));
        }
        sessions.insert(*session.id(), session.clone());
        Ok(())
    }

    async fn append_message(&self, message: &Message) -> Result<(), StoreError> {
        self.mutate(&message.session_id, |session| {
            session.append_message(message.clone()).map_err(Into::into)
        })
        .await
    }

    async fn append_insight(&self, insight: &Insight) -> Result<(), StoreError> {
        self.mutate(&insight.session_id, |session| {
            session.append_insight(insight.clone()).map_err(Into::into)
        })
        .await
    }

    async fn update_status(
        &self,
        session_id: &SessionId,
        status: SessionStatus,
    ) -> Result<(), StoreError> {
        self.mutate(session_id, |session| {
            session.transition_to(status).map_err(Into::into)
        })
        .await
    }

    async fn commit_round(&self, commit: &RoundCommit) -> Result<(), StoreError> {
        self.mutate(&commit.session_id, |session| {
            session.apply_commit(commit).map_err(Into::into)
        })
        .await
    }

    async fn load_session(&self, session_id: &SessionId) -> Result<Session, StoreError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or(StoreError::NotFound(*session_id))
    }
}
