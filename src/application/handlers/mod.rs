//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod interrogation;

pub use interrogation::{
    // Facade
    SessionOrchestrator,
    SessionLocks,
    SessionGuard,
    // Commands, queries and results
    StartSessionCommand,
    StartSessionResult,
    SubmitAnswerCommand,
    SubmitAnswerResult,
    RoundOutcome,
    GetSessionQuery,
    // Handlers
    StartSessionHandler,
    SubmitAnswerHandler,
    GetSessionHandler,
};
