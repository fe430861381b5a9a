//! Interrogation handlers.
//!
//! - `StartSessionHandler` - create a session and ask the first question
//! - `SubmitAnswerHandler` - record an answer and advance the round
//! - `GetSessionHandler` - read the transcript
//! - `SessionOrchestrator` - the three above sharing one lock registry

mod get_session;
mod orchestrator;
mod session_locks;
mod start_session;
mod store_retry;
mod submit_answer;

#[cfg(test)]
pub(crate) mod test_support;

pub use get_session::{GetSessionHandler, GetSessionQuery};
pub use orchestrator::SessionOrchestrator;
pub use session_locks::{SessionGuard, SessionLocks};
pub use start_session::{StartSessionCommand, StartSessionHandler, StartSessionResult};
pub use submit_answer::{
    RoundOutcome, SubmitAnswerCommand, SubmitAnswerHandler, SubmitAnswerResult,
};
