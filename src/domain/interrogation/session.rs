//! Session aggregate.
//!
//! A session is one interrogation: a goal, five question/answer rounds, one
//! insight per answer and, once finished, a closing report. The transcript
//! rules live here so every store enforces the same ones.
//!
//! # Invariants
//!
//! - `goal` is non-blank and never changes
//! - messages alternate `ai, user, ai, user, ...` starting with `ai`
//! - at most 5 user messages; at most 6 ai messages (5 questions + report)
//! - insights ≤ user messages, and round n's insight is stored before round
//!   n+1's question
//! - `Completed` and `Abandoned` sessions accept no further writes

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    SessionId, SessionStatus, StateMachine, Timestamp, UserId, ValidationError,
};

use super::errors::TranscriptViolation;
use super::message::{Insight, Message, MessageRole};
use super::phase::{RoundProgress, SessionPhase};

/// Number of question/answer rounds in every session.
pub const ROUNDS_PER_SESSION: usize = 5;

/// Maximum length for a goal statement.
pub const MAX_GOAL_LENGTH: usize = 2_000;

/// One write destined for a session transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    Message(Message),
    Insight(Insight),
}

/// Ordered batch of transcript writes that must land together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundCommit {
    pub session_id: SessionId,
    pub entries: Vec<TranscriptEntry>,
    /// Status to move to once all entries are applied.
    pub status: Option<SessionStatus>,
}

impl RoundCommit {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            entries: Vec::new(),
            status: None,
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.entries.push(TranscriptEntry::Message(message));
        self
    }

    pub fn with_insight(mut self, insight: Insight) -> Self {
        self.entries.push(TranscriptEntry::Insight(insight));
        self
    }

    pub fn with_status(mut self, status: SessionStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Session aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    user_id: Option<UserId>,
    goal: String,
    /// Model key chosen at start; reused for every later round.
    model: String,
    status: SessionStatus,
    created_at: Timestamp,
    messages: Vec<Message>,
    insights: Vec<Insight>,
}

impl Session {
    /// Create a new active session with an empty transcript.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the goal is blank
    /// - `OutOfRange` if the goal is longer than [`MAX_GOAL_LENGTH`]
    pub fn new(
        user_id: Option<UserId>,
        goal: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let goal = goal.into().trim().to_string();
        if goal.is_empty() {
            return Err(ValidationError::empty_field("goal"));
        }
        let length = goal.chars().count();
        if length > MAX_GOAL_LENGTH {
            return Err(ValidationError::out_of_range(
                "goal",
                1,
                MAX_GOAL_LENGTH as i32,
                length as i32,
            ));
        }

        Ok(Self {
            id: SessionId::new(),
            user_id,
            goal,
            model: model.into(),
            status: SessionStatus::Active,
            created_at: Timestamp::now(),
            messages: Vec::new(),
            insights: Vec::new(),
        })
    }

    /// Reconstitute a session from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        user_id: Option<UserId>,
        goal: String,
        model: String,
        status: SessionStatus,
        created_at: Timestamp,
        messages: Vec<Message>,
        insights: Vec<Insight>,
    ) -> Self {
        Self {
            id,
            user_id,
            goal,
            model,
            status,
            created_at,
            messages,
            insights,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn insights(&self) -> &[Insight] {
        &self.insights
    }

    pub fn user_message_count(&self) -> usize {
        self.count_role(MessageRole::User)
    }

    pub fn ai_message_count(&self) -> usize {
        self.count_role(MessageRole::Ai)
    }

    fn count_role(&self, role: MessageRole) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }

    /// Questions asked so far, in round order.
    pub fn questions(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.role == MessageRole::Ai)
            .take(ROUNDS_PER_SESSION)
            .map(|m| m.content.as_str())
            .collect()
    }

    /// Answers given so far, in round order.
    pub fn answers(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .collect()
    }

    /// Question for a 1-based round.
    pub fn question(&self, round: usize) -> Option<&str> {
        round
            .checked_sub(1)
            .and_then(|idx| self.questions().get(idx).copied())
    }

    /// Answer for a 1-based round.
    pub fn answer(&self, round: usize) -> Option<&str> {
        round
            .checked_sub(1)
            .and_then(|idx| self.answers().get(idx).copied())
    }

    /// Insight for a 1-based round.
    pub fn insight(&self, round: usize) -> Option<&Insight> {
        round.checked_sub(1).and_then(|idx| self.insights.get(idx))
    }

    /// The closing ai message, if the session got that far.
    pub fn closing_report(&self) -> Option<&Message> {
        self.messages
            .iter()
            .filter(|m| m.role == MessageRole::Ai)
            .nth(ROUNDS_PER_SESSION)
    }

    /// Derives the orchestration phase from status and transcript shape.
    pub fn phase(&self) -> SessionPhase {
        match self.status {
            SessionStatus::Completed => return SessionPhase::Completed,
            SessionStatus::Abandoned => return SessionPhase::Abandoned,
            SessionStatus::Active => {}
        }

        let asked = self.ai_message_count();
        let answered = self.user_message_count();
        let analysed = self.insights.len();

        if asked == 0 {
            return SessionPhase::Created;
        }
        if asked > ROUNDS_PER_SESSION {
            // Report stored, status update still pending.
            return SessionPhase::Synthesizing;
        }
        if answered < asked {
            return SessionPhase::Questioning {
                round: asked as u8,
                progress: RoundProgress::AwaitingAnswer,
            };
        }
        if analysed < answered {
            return SessionPhase::Questioning {
                round: answered as u8,
                progress: RoundProgress::AnswerRecorded,
            };
        }
        if answered < ROUNDS_PER_SESSION {
            return SessionPhase::Questioning {
                round: answered as u8,
                progress: RoundProgress::AnalysisRecorded,
            };
        }
        SessionPhase::Synthesizing
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a message after checking turn order and round limits.
    pub fn append_message(&mut self, message: Message) -> Result<(), TranscriptViolation> {
        self.ensure_mutable()?;
        self.ensure_owned(&message.session_id)?;
        if message.content.trim().is_empty() {
            return Err(TranscriptViolation::EmptyContent);
        }

        let expected = match self.messages.last() {
            Some(last) if last.role == MessageRole::Ai => MessageRole::User,
            _ => MessageRole::Ai,
        };
        if message.role != expected {
            return Err(TranscriptViolation::OutOfTurn {
                expected,
                actual: message.role,
            });
        }

        let answered = self.user_message_count();
        match message.role {
            MessageRole::User if answered >= ROUNDS_PER_SESSION => {
                return Err(TranscriptViolation::RoundLimit(ROUNDS_PER_SESSION));
            }
            MessageRole::Ai if self.insights.len() < answered => {
                return Err(TranscriptViolation::MissingInsight(answered));
            }
            _ => {}
        }

        self.messages.push(message);
        Ok(())
    }

    /// Append the insight for the latest, not yet analysed answer.
    pub fn append_insight(&mut self, insight: Insight) -> Result<(), TranscriptViolation> {
        self.ensure_mutable()?;
        self.ensure_owned(&insight.session_id)?;
        if insight.content.trim().is_empty() {
            return Err(TranscriptViolation::EmptyContent);
        }

        let follows_answer = matches!(self.messages.last(), Some(m) if m.role == MessageRole::User);
        if !follows_answer || self.insights.len() + 1 != self.user_message_count() {
            return Err(TranscriptViolation::OrphanInsight);
        }

        self.insights.push(insight);
        Ok(())
    }

    /// Move to a terminal status.
    pub fn transition_to(&mut self, target: SessionStatus) -> Result<(), TranscriptViolation> {
        self.ensure_mutable()?;
        let from = self.status;
        self.status = from
            .transition_to(target)
            .map_err(|_| TranscriptViolation::InvalidTransition { from, to: target })?;
        Ok(())
    }

    /// Apply a whole batch or nothing.
    pub fn apply_commit(&mut self, commit: &RoundCommit) -> Result<(), TranscriptViolation> {
        self.ensure_owned(&commit.session_id)?;

        let mut staged = self.clone();
        for entry in &commit.entries {
            match entry {
                TranscriptEntry::Message(message) => staged.append_message(message.clone())?,
                TranscriptEntry::Insight(insight) => staged.append_insight(insight.clone())?,
            }
        }
        if let Some(status) = commit.status {
            staged.transition_to(status)?;
        }

        *self = staged;
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<(), TranscriptViolation> {
        if self.status.is_mutable() {
            Ok(())
        } else {
            Err(TranscriptViolation::Closed(self.id, self.status))
        }
    }

    fn ensure_owned(&self, session_id: &SessionId) -> Result<(), TranscriptViolation> {
        if session_id == &self.id {
            Ok(())
        } else {
            Err(TranscriptViolation::ForeignEntry {
                entry: *session_id,
                target: self.id,
            })
        }
    }
}
