//! Interrogation module - sessions, transcripts and reports.
//!
//! A session takes a goal through exactly five question/answer rounds and
//! closes with a synthesized report.

mod errors;
pub mod fallback;
mod message;
mod phase;
mod report;
mod session;

pub use errors::{InterrogationError, TranscriptViolation};
pub use message::{Insight, Message, MessageRole};
pub use phase::{RoundProgress, SessionPhase};
pub use report::{FinalReport, ReportParseError, MAX_REPORT_INSIGHTS};
pub use session::{
    RoundCommit, Session, TranscriptEntry, MAX_GOAL_LENGTH, ROUNDS_PER_SESSION,
};
