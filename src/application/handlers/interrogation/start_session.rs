//! StartSessionHandler - opens a session and asks the first question.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, UserId};
use crate::domain::interrogation::{fallback, InterrogationError, Message, Session};
use crate::ports::{GenerationContext, GenerationKind, ModelGateway, TranscriptStore};

use super::store_retry::with_store_retry;

/// Command to start a session.
#[derive(Debug, Clone)]
pub struct StartSessionCommand {
    pub goal: String,
    /// Catalog key or provider model id; blank selects the default.
    pub model_choice: Option<String>,
    pub user_id: Option<String>,
}

impl StartSessionCommand {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            model_choice: None,
            user_id: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_choice = Some(model.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// Result of a started session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSessionResult {
    pub session_id: SessionId,
    pub question: String,
    pub round: u8,
    /// The model stored on the session.
    pub model: String,
    /// True when `question` is the fixed substitute.
    pub used_fallback: bool,
}

/// Handler for starting sessions.
pub struct StartSessionHandler {
    store: Arc<dyn TranscriptStore>,
    gateway: Arc<dyn ModelGateway>,
    default_model: String,
}

impl StartSessionHandler {
    pub fn new(
        store: Arc<dyn TranscriptStore>,
        gateway: Arc<dyn ModelGateway>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            store,
            gateway,
            default_model: default_model.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: StartSessionCommand,
    ) -> Result<StartSessionResult, InterrogationError> {
        // 1. Validate input and build the aggregate
        let user_id = cmd.user_id.map(UserId::new).transpose()?;
        let model = match cmd.model_choice.as_deref().map(str::trim) {
            Some(choice) if !choice.is_empty() => choice.to_string(),
            _ => self.default_model.clone(),
        };
        let mut session = Session::new(user_id, cmd.goal, model)?;
        let session_id = *session.id();

        // 2. Ask for the first question, substituting on failure
        let context = GenerationContext::new(session_id, session.goal(), session.model());
        let (question, used_fallback) =
            match self.gateway.generate(GenerationKind::FirstQuestion, &context).await {
                Ok(text) => (text, false),
                Err(err) => {
                    tracing::warn!(
                        session_id = %session_id,
                        cause = err.cause(),
                        error = %err,
                        "First question unavailable, using fallback"
                    );
                    (fallback::first_question(session.goal()), true)
                }
            };

        // 3. Seed round 1 and persist session and question in one write
        session
            .append_message(Message::ai(session_id, question.clone())?)
            .map_err(|violation| InterrogationError::invalid_state(violation.to_string()))?;
        with_store_retry("create_session", &session_id, || {
            self.store.create_session(&session)
        })
        .await?;

        tracing::info!(
            session_id = %session_id,
            model = %session.model(),
            used_fallback,
            "Session created"
        );

        Ok(StartSessionResult {
            session_id,
            question,
            round: 1,
            model: session.model().to_string(),
            used_fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryTranscriptStore;
    use crate::application::handlers::interrogation::test_support::ScriptedGateway;
    use crate::domain::foundation::SessionStatus;
    use crate::domain::interrogation::{Insight, RoundCommit, RoundProgress, SessionPhase};
    use crate::ports::{GatewayError, StoreError};

    fn handler(
        store: &InMemoryTranscriptStore,
        gateway: ScriptedGateway,
    ) -> (StartSessionHandler, Arc<ScriptedGateway>) {
        let gateway = Arc::new(gateway);
        let handler = StartSessionHandler::new(
            Arc::new(store.clone()),
            gateway.clone(),
            "gpt-4.1-nano",
        );
        (handler, gateway)
    }

    #[tokio::test]
    async fn stores_generated_first_question() {
        let store = InMemoryTranscriptStore::new();
        let (handler, gateway) =
            handler(&store, ScriptedGateway::new().then_ok("Why haven't you started?"));

        let result = handler
            .handle(StartSessionCommand::new("start a business").with_model("model-x"))
            .await
            .unwrap();

        assert_eq!(result.question, "Why haven't you started?");
        assert_eq!(result.round, 1);
        assert_eq!(result.model, "model-x");
        assert!(!result.used_fallback);
        assert_eq!(gateway.kinds(), vec![GenerationKind::FirstQuestion]);

        let session = store.load_session(&result.session_id).await.unwrap();
        assert_eq!(session.question(1), Some("Why haven't you started?"));
        assert_eq!(
            session.phase(),
            SessionPhase::Questioning {
                round: 1,
                progress: RoundProgress::AwaitingAnswer
            }
        );
    }

    #[tokio::test]
    async fn gateway_failure_seeds_fallback_question() {
        let store = InMemoryTranscriptStore::new();
        let (handler, _) = handler(
            &store,
            ScriptedGateway::new().then_err(GatewayError::Timeout { timeout_secs: 8 }),
        );

        let result = handler
            .handle(StartSessionCommand::new("get jacked").with_model("model-x"))
            .await
            .unwrap();

        assert!(result.used_fallback);
        assert_eq!(result.question, fallback::first_question("get jacked"));
        let session = store.load_session(&result.session_id).await.unwrap();
        assert_eq!(session.phase().round(), Some(1));
    }

    #[tokio::test]
    async fn blank_model_choice_uses_default() {
        let store = InMemoryTranscriptStore::new();
        let (handler, _) = handler(&store, ScriptedGateway::new().then_ok("Q"));

        let result = handler
            .handle(StartSessionCommand::new("learn piano").with_model("  "))
            .await
            .unwrap();

        assert_eq!(result.model, "gpt-4.1-nano");
    }

    #[tokio::test]
    async fn empty_goal_is_rejected_before_anything_is_stored() {
        let store = InMemoryTranscriptStore::new();
        let (handler, gateway) = handler(&store, ScriptedGateway::new());

        let err = handler
            .handle(StartSessionCommand::new("   "))
            .await
            .unwrap_err();

        assert!(matches!(err, InterrogationError::Validation { .. }));
        assert_eq!(store.session_count().await, 0);
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn blank_user_id_is_rejected() {
        let store = InMemoryTranscriptStore::new();
        let (handler, _) = handler(&store, ScriptedGateway::new());

        let err = handler
            .handle(StartSessionCommand::new("run").with_user(""))
            .await
            .unwrap_err();

        assert!(matches!(err, InterrogationError::Validation { .. }));
    }

    #[tokio::test]
    async fn transient_store_failure_is_retried_once() {
        let store = InMemoryTranscriptStore::new();
        store.fail_next_writes(1);
        let (handler, _) = handler(&store, ScriptedGateway::new().then_ok("Q"));

        let result = handler.handle(StartSessionCommand::new("write a novel")).await;

        assert!(result.is_ok());
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn persistent_store_failure_surfaces() {
        let store = InMemoryTranscriptStore::new();
        store.fail_next_writes(2);
        let (handler, gateway) = handler(&store, ScriptedGateway::new());

        let err = handler
            .handle(StartSessionCommand::new("write a novel"))
            .await
            .unwrap_err();

        assert!(matches!(err, InterrogationError::Store(_)));
        assert_eq!(gateway.kinds(), vec![GenerationKind::FirstQuestion]);
        assert_eq!(store.session_count().await, 0);
    }

    /// Delegates to the in-memory store but refuses single-message appends.
    struct NoAppendStore(InMemoryTranscriptStore);

    #[async_trait::async_trait]
    impl TranscriptStore for NoAppendStore {
        async fn create_session(&self, session: &Session) -> Result<(), StoreError> {
            self.0.create_session(session).await
        }

        async fn append_message(&self, _message: &Message) -> Result<(), StoreError> {
            Err(StoreError::unavailable("appends disabled"))
        }

        async fn append_insight(&self, insight: &Insight) -> Result<(), StoreError> {
            self.0.append_insight(insight).await
        }

        async fn update_status(
            &self,
            session_id: &SessionId,
            status: SessionStatus,
        ) -> Result<(), StoreError> {
            self.0.update_status(session_id, status).await
        }

        async fn commit_round(&self, commit: &RoundCommit) -> Result<(), StoreError> {
            self.0.commit_round(commit).await
        }

        async fn load_session(&self, session_id: &SessionId) -> Result<Session, StoreError> {
            self.0.load_session(session_id).await
        }
    }

    #[tokio::test]
    async fn session_is_stored_with_its_first_question_in_one_write() {
        let inner = InMemoryTranscriptStore::new();
        let handler = StartSessionHandler::new(
            Arc::new(NoAppendStore(inner.clone())),
            Arc::new(ScriptedGateway::new().then_ok("What stops you?")),
            "gpt-4.1-nano",
        );

        let result = handler
            .handle(StartSessionCommand::new("learn guitar"))
            .await
            .unwrap();

        let session = inner.load_session(&result.session_id).await.unwrap();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.question(1), Some("What stops you?"));
        assert_ne!(session.phase(), SessionPhase::Created);
    }
}
