//! Transcript records: messages exchanged in a session and the insights
//! derived from each answer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{InsightId, MessageId, SessionId, Timestamp, ValidationError};

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The person being interrogated.
    User,
    /// Generated question or closing report.
    Ai,
}

impl MessageRole {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Ai => "ai",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(MessageRole::User),
            "ai" => Ok(MessageRole::Ai),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown message role '{}'", other),
            )),
        }
    }
}

/// One entry of a session transcript.
///
/// Messages are append-only and belong to exactly one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub session_id: SessionId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: Timestamp,
}

impl Message {
    /// Creates a message, rejecting blank content.
    pub fn new(
        session_id: SessionId,
        role: MessageRole,
        content: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ValidationError::empty_field("content"));
        }
        Ok(Self {
            id: MessageId::new(),
            session_id,
            role,
            content,
            created_at: Timestamp::now(),
        })
    }

    /// Creates an ai-authored message.
    pub fn ai(session_id: SessionId, content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(session_id, MessageRole::Ai, content)
    }

    /// Creates a user-authored message.
    pub fn user(
        session_id: SessionId,
        content: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(session_id, MessageRole::User, content)
    }
}

/// Analysis derived from a single answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub id: InsightId,
    pub session_id: SessionId,
    pub content: String,
    pub created_at: Timestamp,
}

impl Insight {
    /// Creates an insight, rejecting blank content.
    pub fn new(session_id: SessionId, content: impl Into<String>) -> Result<Self, ValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ValidationError::empty_field("insight"));
        }
        Ok(Self {
            id: InsightId::new(),
            session_id,
            content,
            created_at: Timestamp::now(),
        })
    }
}
