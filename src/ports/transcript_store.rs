//! Transcript store port.
//!
//! Durable home of sessions, their messages and their insights. Every write
//! is validated against the session's transcript rules before it lands, so
//! adapters share one definition of a well-formed transcript.
//!
//! # Design
//!
//! - **Ordered**: `load_session` returns entries in append order
//! - **Atomic rounds**: `commit_round` lands a whole round or nothing
//! - **Transient vs. permanent**: only `Unavailable` is worth retrying

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{SessionId, SessionStatus};
use crate::domain::interrogation::{Insight, Message, RoundCommit, Session, TranscriptViolation};

/// Transcript store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("session not found: {0}")]
    NotFound(SessionId),

    /// The write would break a transcript rule. Never retried.
    #[error("constraint violated: {0}")]
    Constraint(String),

    /// Backend could not be reached or failed mid-operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        StoreError::Unavailable(message.into())
    }

    /// True when repeating the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<TranscriptViolation> for StoreError {
    fn from(violation: TranscriptViolation) -> Self {
        StoreError::Constraint(violation.to_string())
    }
}

/// Port for session transcript persistence.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Persist a new session together with any entries it already holds.
    ///
    /// Either the session and all of its entries land, or nothing does.
    ///
    /// # Errors
    ///
    /// - `Constraint` if a session with the same id exists
    async fn create_session(&self, session: &Session) -> Result<(), StoreError>;

    /// Append one message.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown session
    /// - `Constraint` if the message breaks turn order or round limits
    async fn append_message(&self, message: &Message) -> Result<(), StoreError>;

    /// Append the insight for the latest answer.
    async fn append_insight(&self, insight: &Insight) -> Result<(), StoreError>;

    /// Move a session to a terminal status.
    async fn update_status(
        &self,
        session_id: &SessionId,
        status: SessionStatus,
    ) -> Result<(), StoreError>;

    /// Apply every entry of `commit` plus its status change atomically.
    async fn commit_round(&self, commit: &RoundCommit) -> Result<(), StoreError>;

    /// Load a session with its full transcript in append order.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown session
    async fn load_session(&self, session_id: &SessionId) -> Result<Session, StoreError>;
}
