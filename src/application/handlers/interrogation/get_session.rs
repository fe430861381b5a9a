//! GetSessionHandler - Query handler for reading a session transcript.

use std::sync::Arc;

use crate::domain::foundation::SessionId;
use crate::domain::interrogation::{InterrogationError, Session};
use crate::ports::TranscriptStore;

use super::store_retry::with_store_retry;

/// Query for one session.
#[derive(Debug, Clone)]
pub struct GetSessionQuery {
    pub session_id: SessionId,
}

/// Handler for reading sessions.
pub struct GetSessionHandler {
    store: Arc<dyn TranscriptStore>,
}

impl GetSessionHandler {
    pub fn new(store: Arc<dyn TranscriptStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetSessionQuery) -> Result<Session, InterrogationError> {
        let session_id = query.session_id;
        let session = with_store_retry("load_session", &session_id, || {
            self.store.load_session(&session_id)
        })
        .await?;
        Ok(session)
    }
}
