//! Orchestration phase derived from a session's transcript.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How far the current round has progressed in storage.
///
/// Anything past `AwaitingAnswer` only shows up when a round was written
/// with individual appends and the process stopped part-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundProgress {
    /// The question is out, no answer stored yet.
    AwaitingAnswer,
    /// Answer stored, analysis missing.
    AnswerRecorded,
    /// Answer and analysis stored, next question missing.
    AnalysisRecorded,
}

/// Where a session sits in the `Created → Questioning(1..=5) → Synthesizing
/// → Completed` machine. `Abandoned` is reachable from any non-terminal
/// phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SessionPhase {
    /// Session exists but no question has been stored.
    Created,
    /// Round `round` is open.
    Questioning { round: u8, progress: RoundProgress },
    /// All five rounds answered and analysed; report pending.
    Synthesizing,
    Completed,
    Abandoned,
}

impl SessionPhase {
    /// Round number while questioning.
    pub fn round(&self) -> Option<u8> {
        match self {
            SessionPhase::Questioning { round, .. } => Some(*round),
            _ => None,
        }
    }

    /// True once the session can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Completed | SessionPhase::Abandoned)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Created => write!(f, "Created"),
            SessionPhase::Questioning { round, .. } => write!(f, "Questioning(round={})", round),
            SessionPhase::Synthesizing => write!(f, "Synthesizing"),
            SessionPhase::Completed => write!(f, "Completed"),
            SessionPhase::Abandoned => write!(f, "Abandoned"),
        }
    }
}
