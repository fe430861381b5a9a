//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Writes (start, answer) and reads (get) are separate handlers.

pub mod handlers;

pub use handlers::{
    GetSessionHandler, GetSessionQuery, RoundOutcome, SessionOrchestrator, StartSessionCommand,
    StartSessionHandler, StartSessionResult, SubmitAnswerCommand, SubmitAnswerHandler,
    SubmitAnswerResult,
};
