//! SessionOrchestrator - the facade the HTTP layer and tests drive.
//!
//! Bundles the three handlers around one store, one gateway and one shared
//! lock registry so every entry point serializes on the same session locks.

use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::domain::interrogation::{InterrogationError, Session};
use crate::ports::{ModelGateway, TranscriptStore};

use super::get_session::{GetSessionHandler, GetSessionQuery};
use super::session_locks::SessionLocks;
use super::start_session::{StartSessionCommand, StartSessionHandler, StartSessionResult};
use super::submit_answer::{SubmitAnswerCommand, SubmitAnswerHandler, SubmitAnswerResult};

pub struct SessionOrchestrator {
    start: StartSessionHandler,
    submit: SubmitAnswerHandler,
    get: GetSessionHandler,
    locks: Arc<SessionLocks>,
}

impl SessionOrchestrator {
    pub fn new(
        store: Arc<dyn TranscriptStore>,
        gateway: Arc<dyn ModelGateway>,
        default_model: impl Into<String>,
    ) -> Self {
        let locks = Arc::new(SessionLocks::new());
        Self {
            start: StartSessionHandler::new(store.clone(), gateway.clone(), default_model),
            submit: SubmitAnswerHandler::new(store.clone(), gateway, locks.clone()),
            get: GetSessionHandler::new(store),
            locks,
        }
    }

    pub async fn start_session(
        &self,
        cmd: StartSessionCommand,
    ) -> Result<StartSessionResult, InterrogationError> {
        self.start.handle(cmd).await
    }

    pub async fn submit_answer(
        &self,
        cmd: SubmitAnswerCommand,
    ) -> Result<SubmitAnswerResult, InterrogationError> {
        self.submit.handle(cmd).await
    }

    pub async fn get_session(&self, session_id: SessionId) -> Result<Session, InterrogationError> {
        self.get.handle(GetSessionQuery { session_id }).await
    }

    /// Sessions with an operation in flight.
    pub fn sessions_in_flight(&self) -> usize {
        self.locks.active()
    }
}
