//! Model Gateway Port - the single seam through which text is generated.
//!
//! The orchestrator never talks to a provider directly. It asks the gateway
//! for one of four kinds of text and gets back either the text or a
//! [`GatewayError`] after the gateway's own timeout and retry budget.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

use crate::domain::foundation::SessionId;

/// Which piece of a session is being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationKind {
    FirstQuestion,
    AnswerAnalysis,
    NextQuestion,
    /// Returns canonical report JSON (`{"title","summary","insights"}`).
    FinalReport,
}

impl GenerationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationKind::FirstQuestion => "first_question",
            GenerationKind::AnswerAnalysis => "answer_analysis",
            GenerationKind::NextQuestion => "next_question",
            GenerationKind::FinalReport => "final_report",
        }
    }
}

impl fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub question: String,
    pub answer: String,
}

/// Everything a generation may look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationContext {
    pub session_id: SessionId,
    pub goal: String,
    /// Model key stored on the session.
    pub model: String,
    /// Answered rounds in order, including the one being analysed.
    pub exchanges: Vec<Exchange>,
    /// Answer being analysed, for `AnswerAnalysis`.
    pub current_answer: Option<String>,
}

impl GenerationContext {
    pub fn new(session_id: SessionId, goal: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            session_id,
            goal: goal.into(),
            model: model.into(),
            exchanges: Vec::new(),
            current_answer: None,
        }
    }

    pub fn with_exchanges(mut self, exchanges: Vec<Exchange>) -> Self {
        self.exchanges = exchanges;
        self
    }

    pub fn with_current_answer(mut self, answer: impl Into<String>) -> Self {
        self.current_answer = Some(answer.into());
        self
    }

    /// Round of the next question, counting from 1.
    pub fn round(&self) -> usize {
        self.exchanges.len() + 1
    }
}

/// Terminal gateway failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("generation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("provider error: {0}")]
    Provider(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl GatewayError {
    /// Short cause label used in logs and error bodies.
    pub fn cause(&self) -> &'static str {
        match self {
            GatewayError::Timeout { .. } => "timeout",
            GatewayError::Provider(_) => "provider-error",
            GatewayError::MalformedResponse(_) => "malformed-response",
        }
    }
}

/// Port for bounded, retried text generation.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Generate text of `kind` for `context`.
    ///
    /// # Errors
    ///
    /// - `Timeout` when every attempt exceeded the per-attempt deadline
    /// - `Provider` when the provider failed in a non-retryable way or the
    ///   retry budget ran out
    /// - `MalformedResponse` when a `FinalReport` could not be parsed after
    ///   the stricter follow-up attempt
    async fn generate(
        &self,
        kind: GenerationKind,
        context: &GenerationContext,
    ) -> Result<String, GatewayError>;
}
