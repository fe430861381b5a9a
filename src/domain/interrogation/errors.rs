//! Interrogation error types.

use thiserror::Error;

use crate::domain::foundation::{ErrorCode, SessionId, SessionStatus, ValidationError};
use crate::ports::{GatewayError, StoreError};

use super::message::MessageRole;

/// A write that would break the transcript rules of a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranscriptViolation {
    #[error("session {0} is {1} and accepts no further writes")]
    Closed(SessionId, SessionStatus),

    #[error("entry for session {entry} cannot be written to session {target}")]
    ForeignEntry { entry: SessionId, target: SessionId },

    #[error("transcript content cannot be empty")]
    EmptyContent,

    #[error("expected {expected} message next, got {actual}")]
    OutOfTurn {
        expected: MessageRole,
        actual: MessageRole,
    },

    #[error("session already has {0} answers")]
    RoundLimit(usize),

    #[error("answer {0} has no insight yet")]
    MissingInsight(usize),

    #[error("insight must follow an answer that has not been analysed")]
    OrphanInsight,

    #[error("cannot move session from {from} to {to}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },
}

/// Errors surfaced by the session orchestrator.
///
/// Every facade call either succeeds or fails with exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterrogationError {
    /// Bad caller input. Never retried.
    #[error("validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    /// Operation not legal for the session's current phase.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Unknown session.
    #[error("session not found: {0}")]
    NotFound(SessionId),

    /// Model provider failure that could not be masked.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Persistence failure after the retry budget.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl InterrogationError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        InterrogationError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        InterrogationError::InvalidState(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            InterrogationError::Validation { .. } => ErrorCode::ValidationFailed,
            InterrogationError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            InterrogationError::NotFound(_) => ErrorCode::SessionNotFound,
            InterrogationError::Gateway(_) => ErrorCode::GatewayFailed,
            InterrogationError::Store(_) => ErrorCode::StoreFailed,
        }
    }
}

impl From<ValidationError> for InterrogationError {
    fn from(err: ValidationError) -> Self {
        InterrogationError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for InterrogationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => InterrogationError::NotFound(id),
            other => InterrogationError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_becomes_not_found() {
        let id = SessionId::new();
        let err: InterrogationError = StoreError::NotFound(id).into();
        assert_eq!(err, InterrogationError::NotFound(id));
        assert_eq!(err.code(), ErrorCode::SessionNotFound);
    }

    #[test]
    fn other_store_errors_stay_store_errors() {
        let err: InterrogationError = StoreError::Unavailable("pool closed".into()).into();
        assert!(matches!(err, InterrogationError::Store(_)));
        assert_eq!(err.code(), ErrorCode::StoreFailed);
    }

    #[test]
    fn validation_error_keeps_field_name() {
        let err: InterrogationError = ValidationError::empty_field("goal").into();
        match err {
            InterrogationError::Validation { field, message } => {
                assert_eq!(field, "goal");
                assert_eq!(message, "Field 'goal' cannot be empty");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn transcript_violation_displays_context() {
        let err = TranscriptViolation::OutOfTurn {
            expected: MessageRole::Ai,
            actual: MessageRole::User,
        };
        assert_eq!(err.to_string(), "expected ai message next, got user");
    }
}
