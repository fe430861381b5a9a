//! SubmitAnswerHandler - records an answer and advances the round.
//!
//! The round being answered is derived from the stored transcript. Every
//! write for a round (answer, insight, next question or report, status) goes
//! to the store as one [`RoundCommit`], so a failed call leaves the session
//! exactly as it was and the caller can simply submit again.
//!
//! # Resubmission
//!
//! | Stored state for round n            | Same text          | Other text     |
//! |-------------------------------------|--------------------|----------------|
//! | question only                       | advance            | advance        |
//! | answer, no insight (partial writes) | resume             | InvalidState   |
//!
//! Replay only happens through a `round` hint below the current round: the
//! stored outcome comes back when that round's answer matches, anything else
//! is rejected. Without a hint the text always answers the open round.

use std::sync::Arc;

use crate::domain::foundation::{SessionId, SessionStatus};
use crate::domain::interrogation::{
    fallback, FinalReport, Insight, InterrogationError, Message, RoundCommit, RoundProgress,
    Session, SessionPhase, ROUNDS_PER_SESSION,
};
use crate::ports::{Exchange, GenerationContext, GenerationKind, ModelGateway, TranscriptStore};

use super::session_locks::SessionLocks;
use super::store_retry::with_store_retry;

/// Command to answer the open question of a session.
#[derive(Debug, Clone)]
pub struct SubmitAnswerCommand {
    pub session_id: SessionId,
    pub answer_text: String,
    /// Round the caller believes it is answering.
    pub round: Option<u8>,
}

impl SubmitAnswerCommand {
    pub fn new(session_id: SessionId, answer_text: impl Into<String>) -> Self {
        Self {
            session_id,
            answer_text: answer_text.into(),
            round: None,
        }
    }

    pub fn for_round(mut self, round: u8) -> Self {
        self.round = Some(round);
        self
    }
}

/// What follows an answered round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    NextQuestion { round: u8, question: String },
    Report { report: FinalReport, status: SessionStatus },
}

/// Result of an answered round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitAnswerResult {
    pub session_id: SessionId,
    /// Round the answer belongs to.
    pub round: u8,
    pub analysis: String,
    pub outcome: RoundOutcome,
    /// True when any part of the outcome is a fixed substitute.
    pub used_fallback: bool,
    /// True when nothing was written because the round was already done.
    pub replayed: bool,
}

impl SubmitAnswerResult {
    pub fn next_question(&self) -> Option<&str> {
        match &self.outcome {
            RoundOutcome::NextQuestion { question, .. } => Some(question),
            RoundOutcome::Report { .. } => None,
        }
    }

    pub fn report(&self) -> Option<&FinalReport> {
        match &self.outcome {
            RoundOutcome::Report { report, .. } => Some(report),
            RoundOutcome::NextQuestion { .. } => None,
        }
    }
}

/// How to handle a submission against the stored transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    /// Round already finished with this answer.
    Replay(u8),
    /// Write whatever round `round` is still missing.
    Advance {
        round: u8,
        answer_stored: bool,
        analysed: bool,
    },
}

/// Handler for answering rounds.
pub struct SubmitAnswerHandler {
    store: Arc<dyn TranscriptStore>,
    gateway: Arc<dyn ModelGateway>,
    locks: Arc<SessionLocks>,
}

impl SubmitAnswerHandler {
    pub fn new(
        store: Arc<dyn TranscriptStore>,
        gateway: Arc<dyn ModelGateway>,
        locks: Arc<SessionLocks>,
    ) -> Self {
        Self {
            store,
            gateway,
            locks,
        }
    }

    pub async fn handle(
        &self,
        cmd: SubmitAnswerCommand,
    ) -> Result<SubmitAnswerResult, InterrogationError> {
        // 1. Validate input
        let answer = cmd.answer_text.trim().to_string();
        if answer.is_empty() {
            return Err(InterrogationError::validation(
                "answer_text",
                "Answer cannot be empty",
            ));
        }
        if let Some(round) = cmd.round {
            if round == 0 || round as usize > ROUNDS_PER_SESSION {
                return Err(InterrogationError::validation(
                    "round",
                    format!("Round must be between 1 and {}", ROUNDS_PER_SESSION),
                ));
            }
        }

        // 2. One operation per session at a time
        let session_id = cmd.session_id;
        let _guard = self.locks.acquire(&session_id).await;

        // 3. Load the current transcript
        let session = with_store_retry("load_session", &session_id, || {
            self.store.load_session(&session_id)
        })
        .await?;

        // 4. Decide between replay and advance
        match plan(&session, &answer, cmd.round)? {
            Plan::Replay(round) => {
                tracing::debug!(session_id = %session_id, round, "Replaying answered round");
                replay(&session, round)
            }
            Plan::Advance {
                round,
                answer_stored,
                analysed,
            } => {
                self.advance(&session, answer, round, answer_stored, analysed)
                    .await
            }
        }
    }

    async fn advance(
        &self,
        session: &Session,
        answer: String,
        round: u8,
        answer_stored: bool,
        analysed: bool,
    ) -> Result<SubmitAnswerResult, InterrogationError> {
        let session_id = *session.id();
        let mut commit = RoundCommit::new(session_id);
        let mut used_fallback = false;

        if !answer_stored {
            commit = commit.with_message(Message::user(session_id, answer.clone())?);
        }

        let context = GenerationContext::new(session_id, session.goal(), session.model())
            .with_exchanges(exchanges_through(session, round, &answer))
            .with_current_answer(answer);

        // Analysis always lands before the next question is generated.
        let analysis = if analysed {
            stored_insight(session, round)?
        } else {
            let (text, substituted) = self
                .generate_or(GenerationKind::AnswerAnalysis, &context, fallback::analysis(round))
                .await;
            used_fallback |= substituted;
            commit = commit.with_insight(Insight::new(session_id, text.clone())?);
            text
        };

        let outcome = if (round as usize) < ROUNDS_PER_SESSION {
            let next = round + 1;
            let (question, substituted) = self
                .generate_or(
                    GenerationKind::NextQuestion,
                    &context,
                    fallback::next_question(next),
                )
                .await;
            used_fallback |= substituted;
            commit = commit.with_message(Message::ai(session_id, question.clone())?);
            RoundOutcome::NextQuestion {
                round: next,
                question,
            }
        } else {
            let (report, status) = match session.closing_report() {
                Some(stored) => match FinalReport::parse(&stored.content) {
                    Ok(report) => (report, SessionStatus::Completed),
                    Err(_) => (FinalReport::fallback(session.goal()), SessionStatus::Abandoned),
                },
                None => {
                    let (report, status) = self.synthesize(&context).await;
                    commit = commit.with_message(Message::ai(session_id, report.to_json())?);
                    (report, status)
                }
            };
            used_fallback |= status == SessionStatus::Abandoned;
            commit = commit.with_status(status);
            RoundOutcome::Report { report, status }
        };

        with_store_retry("commit_round", &session_id, || {
            self.store.commit_round(&commit)
        })
        .await?;

        match &outcome {
            RoundOutcome::NextQuestion { round: next, .. } => tracing::info!(
                session_id = %session_id,
                round = *next,
                used_fallback,
                "Round advanced"
            ),
            RoundOutcome::Report { status, .. } => tracing::info!(
                session_id = %session_id,
                status = %status,
                "Session closed"
            ),
        }

        Ok(SubmitAnswerResult {
            session_id,
            round,
            analysis,
            outcome,
            used_fallback,
            replayed: false,
        })
    }

    /// Generated text, or `fallback` once the gateway has given up.
    async fn generate_or(
        &self,
        kind: GenerationKind,
        context: &GenerationContext,
        fallback: String,
    ) -> (String, bool) {
        match self.gateway.generate(kind, context).await {
            Ok(text) => (text, false),
            Err(err) => {
                tracing::warn!(
                    session_id = %context.session_id,
                    kind = %kind,
                    cause = err.cause(),
                    error = %err,
                    "Generation failed, using fallback"
                );
                (fallback, true)
            }
        }
    }

    async fn synthesize(&self, context: &GenerationContext) -> (FinalReport, SessionStatus) {
        let generated = self
            .gateway
            .generate(GenerationKind::FinalReport, context)
            .await
            .map_err(|e| e.to_string())
            .and_then(|json| FinalReport::parse(&json).map_err(|e| e.to_string()));

        match generated {
            Ok(report) => (report, SessionStatus::Completed),
            Err(error) => {
                tracing::error!(
                    session_id = %context.session_id,
                    error = %error,
                    "Report synthesis failed, abandoning session"
                );
                (FinalReport::fallback(&context.goal), SessionStatus::Abandoned)
            }
        }
    }
}

fn plan(session: &Session, answer: &str, hint: Option<u8>) -> Result<Plan, InterrogationError> {
    let (round, answer_stored, analysed) = match session.phase() {
        SessionPhase::Created => {
            return Err(InterrogationError::invalid_state(format!(
                "session {} has no open question",
                session.id()
            )));
        }
        phase @ (SessionPhase::Completed | SessionPhase::Abandoned) => {
            return Err(InterrogationError::invalid_state(format!(
                "session {} is {}",
                session.id(),
                phase
            )));
        }
        SessionPhase::Questioning { round, progress } => match progress {
            RoundProgress::AwaitingAnswer => (round, false, false),
            RoundProgress::AnswerRecorded => (round, true, false),
            RoundProgress::AnalysisRecorded => (round, true, true),
        },
        SessionPhase::Synthesizing => (ROUNDS_PER_SESSION as u8, true, true),
    };

    match hint {
        Some(hinted) if hinted > round => Err(InterrogationError::invalid_state(format!(
            "round {} is not open, session is on round {}",
            hinted, round
        ))),
        Some(hinted) if hinted < round => {
            if session.answer(hinted as usize) == Some(answer) {
                Ok(Plan::Replay(hinted))
            } else {
                Err(InterrogationError::invalid_state(format!(
                    "round {} was already answered differently",
                    hinted
                )))
            }
        }
        _ if answer_stored => {
            if session.answer(round as usize) == Some(answer) {
                Ok(Plan::Advance {
                    round,
                    answer_stored,
                    analysed,
                })
            } else {
                Err(InterrogationError::invalid_state(format!(
                    "round {} was already answered differently",
                    round
                )))
            }
        }
        _ => Ok(Plan::Advance {
            round,
            answer_stored: false,
            analysed: false,
        }),
    }
}

/// Stored outcome of a finished, non-final round.
fn replay(session: &Session, round: u8) -> Result<SubmitAnswerResult, InterrogationError> {
    let analysis = stored_insight(session, round)?;
    let next = round + 1;
    let question = session
        .question(next as usize)
        .ok_or_else(|| {
            InterrogationError::invalid_state(format!("round {} has no stored question", next))
        })?
        .to_string();

    Ok(SubmitAnswerResult {
        session_id: *session.id(),
        round,
        analysis,
        outcome: RoundOutcome::NextQuestion {
            round: next,
            question,
        },
        used_fallback: false,
        replayed: true,
    })
}

fn stored_insight(session: &Session, round: u8) -> Result<String, InterrogationError> {
    session
        .insight(round as usize)
        .map(|insight| insight.content.clone())
        .ok_or_else(|| {
            InterrogationError::invalid_state(format!("round {} has no stored analysis", round))
        })
}

/// Question/answer pairs for rounds `1..=round`, with `answer` for the last.
fn exchanges_through(session: &Session, round: u8, answer: &str) -> Vec<Exchange> {
    let questions = session.questions();
    let answers = session.answers();
    let round = round as usize;

    (1..=round)
        .filter_map(|r| {
            let question = questions.get(r - 1)?;
            let answer = if r == round {
                answer
            } else {
                answers.get(r - 1)?
            };
            Some(Exchange {
                question: question.to_string(),
                answer: answer.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryTranscriptStore;
    use crate::application::handlers::interrogation::test_support::ScriptedGateway;
    use crate::domain::interrogation::MessageRole;
    use crate::ports::GatewayError;

    const REPORT: &str = r#"{"title":"The Excuse Report","summary":"Lots of reasons.","insights":["One","Two","Three"]}"#;

    /// Session with `answered` complete rounds and the next question open.
    async fn seeded(store: &InMemoryTranscriptStore, answered: u8) -> SessionId {
        let session = Session::new(None, "start a business", "model-x").unwrap();
        let id = *session.id();
        store.create_session(&session).await.unwrap();
        store
            .append_message(&Message::ai(id, "Question 1").unwrap())
            .await
            .unwrap();
        for round in 1..=answered {
            store
                .append_message(&Message::user(id, format!("Answer {}", round)).unwrap())
                .await
                .unwrap();
            store
                .append_insight(&Insight::new(id, format!("Insight {}", round)).unwrap())
                .await
                .unwrap();
            store
                .append_message(&Message::ai(id, format!("Question {}", round + 1)).unwrap())
                .await
                .unwrap();
        }
        id
    }

    fn handler(
        store: &InMemoryTranscriptStore,
        gateway: ScriptedGateway,
    ) -> (SubmitAnswerHandler, Arc<ScriptedGateway>) {
        let gateway = Arc::new(gateway);
        let handler = SubmitAnswerHandler::new(
            Arc::new(store.clone()),
            gateway.clone(),
            Arc::new(SessionLocks::new()),
        );
        (handler, gateway)
    }

    #[tokio::test]
    async fn answer_records_analysis_then_next_question() {
        let store = InMemoryTranscriptStore::new();
        let id = seeded(&store, 0).await;
        let (handler, gateway) = handler(
            &store,
            ScriptedGateway::new()
                .then_ok("You are stalling.")
                .then_ok("What scares you?"),
        );

        let result = handler
            .handle(SubmitAnswerCommand::new(id, "  No money  "))
            .await
            .unwrap();

        assert_eq!(result.round, 1);
        assert_eq!(result.analysis, "You are stalling.");
        assert_eq!(result.next_question(), Some("What scares you?"));
        assert!(!result.used_fallback && !result.replayed);
        assert_eq!(
            gateway.kinds(),
            vec![GenerationKind::AnswerAnalysis, GenerationKind::NextQuestion]
        );

        let session = store.load_session(&id).await.unwrap();
        assert_eq!(session.answer(1), Some("No money"));
        assert_eq!(session.insight(1).unwrap().content, "You are stalling.");
        assert_eq!(session.question(2), Some("What scares you?"));
    }

    #[tokio::test]
    async fn analysis_sees_full_history_and_current_answer() {
        let store = InMemoryTranscriptStore::new();
        let id = seeded(&store, 2).await;
        let (handler, gateway) = handler(&store, ScriptedGateway::new().then_ok("A").then_ok("Q"));

        handler
            .handle(SubmitAnswerCommand::new(id, "Answer 3").for_round(3))
            .await
            .unwrap();

        let (_, context) = &gateway.calls()[0];
        assert_eq!(context.exchanges.len(), 3);
        assert_eq!(context.exchanges[0].answer, "Answer 1");
        assert_eq!(context.exchanges[2].question, "Question 3");
        assert_eq!(context.current_answer.as_deref(), Some("Answer 3"));
        assert_eq!(context.model, "model-x");
    }

    #[tokio::test]
    async fn gateway_failure_advances_with_fallbacks() {
        let store = InMemoryTranscriptStore::new();
        let id = seeded(&store, 1).await;
        let (handler, _) = handler(&store, ScriptedGateway::new());

        let result = handler
            .handle(SubmitAnswerCommand::new(id, "I keep waiting"))
            .await
            .unwrap();

        assert!(result.used_fallback);
        assert_eq!(result.analysis, fallback::analysis(2));
        assert_eq!(result.next_question(), Some(fallback::next_question(3).as_str()));
        let session = store.load_session(&id).await.unwrap();
        assert_eq!(session.phase().round(), Some(3));
    }

    #[tokio::test]
    async fn final_round_completes_with_report() {
        let store = InMemoryTranscriptStore::new();
        let id = seeded(&store, 4).await;
        let (handler, gateway) =
            handler(&store, ScriptedGateway::new().then_ok("Last one.").then_ok(REPORT));

        let result = handler
            .handle(SubmitAnswerCommand::new(id, "Answer 5"))
            .await
            .unwrap();

        assert_eq!(result.round, 5);
        let report = result.report().unwrap();
        assert_eq!(report.title, "The Excuse Report");
        assert!(matches!(
            result.outcome,
            RoundOutcome::Report {
                status: SessionStatus::Completed,
                ..
            }
        ));
        assert_eq!(
            gateway.kinds(),
            vec![GenerationKind::AnswerAnalysis, GenerationKind::FinalReport]
        );
        assert_eq!(gateway.calls()[1].1.exchanges.len(), 5);

        let session = store.load_session(&id).await.unwrap();
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.insights().len(), 5);
        let closing = session.closing_report().unwrap();
        assert_eq!(closing.role, MessageRole::Ai);
        assert_eq!(FinalReport::parse(&closing.content).unwrap(), *report);
    }

    #[tokio::test]
    async fn failed_synthesis_abandons_with_fallback_report() {
        let store = InMemoryTranscriptStore::new();
        let id = seeded(&store, 4).await;
        let (handler, _) = handler(
            &store,
            ScriptedGateway::new()
                .then_ok("Last one.")
                .then_err(GatewayError::MalformedResponse("no json".into())),
        );

        let result = handler
            .handle(SubmitAnswerCommand::new(id, "Answer 5"))
            .await
            .unwrap();

        assert!(result.used_fallback);
        assert_eq!(
            result.report(),
            Some(&FinalReport::fallback("start a business"))
        );
        let session = store.load_session(&id).await.unwrap();
        assert_eq!(session.status(), SessionStatus::Abandoned);
        assert!(session.closing_report().is_some());
    }

    #[tokio::test]
    async fn blank_answer_is_rejected_without_writes() {
        let store = InMemoryTranscriptStore::new();
        let id = seeded(&store, 0).await;
        let (handler, gateway) = handler(&store, ScriptedGateway::new());

        let err = handler
            .handle(SubmitAnswerCommand::new(id, " \n "))
            .await
            .unwrap_err();

        assert!(matches!(err, InterrogationError::Validation { .. }));
        assert!(gateway.calls().is_empty());
        assert_eq!(store.load_session(&id).await.unwrap().messages().len(), 1);
    }

    #[tokio::test]
    async fn round_hint_out_of_range_is_validation_error() {
        let store = InMemoryTranscriptStore::new();
        let id = seeded(&store, 0).await;
        let (handler, _) = handler(&store, ScriptedGateway::new());

        for round in [0, 6] {
            let err = handler
                .handle(SubmitAnswerCommand::new(id, "x").for_round(round))
                .await
                .unwrap_err();
            assert!(matches!(err, InterrogationError::Validation { .. }));
        }
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let store = InMemoryTranscriptStore::new();
        let (handler, _) = handler(&store, ScriptedGateway::new());
        let id = SessionId::new();

        let err = handler
            .handle(SubmitAnswerCommand::new(id, "hello"))
            .await
            .unwrap_err();

        assert_eq!(err, InterrogationError::NotFound(id));
    }

    #[tokio::test]
    async fn closed_session_rejects_answers() {
        let store = InMemoryTranscriptStore::new();
        let id = seeded(&store, 2).await;
        store
            .update_status(&id, SessionStatus::Abandoned)
            .await
            .unwrap();
        let (handler, gateway) = handler(&store, ScriptedGateway::new());

        let err = handler
            .handle(SubmitAnswerCommand::new(id, "Answer 3"))
            .await
            .unwrap_err();

        assert!(matches!(err, InterrogationError::InvalidState(_)));
        assert!(gateway.calls().is_empty());
        assert_eq!(store.load_session(&id).await.unwrap().messages().len(), 5);
    }

    #[tokio::test]
    async fn session_without_question_rejects_answers() {
        let store = InMemoryTranscriptStore::new();
        let session = Session::new(None, "learn rust", "model-x").unwrap();
        store.create_session(&session).await.unwrap();
        let (handler, _) = handler(&store, ScriptedGateway::new());

        let err = handler
            .handle(SubmitAnswerCommand::new(*session.id(), "hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, InterrogationError::InvalidState(_)));
    }

    #[tokio::test]
    async fn same_answer_for_consecutive_rounds_advances_each_time() {
        let store = InMemoryTranscriptStore::new();
        let id = seeded(&store, 1).await;
        let (handler, gateway) = handler(
            &store,
            ScriptedGateway::new()
                .then_ok("Still vague")
                .then_ok("Question 3"),
        );

        let result = handler
            .handle(SubmitAnswerCommand::new(id, "Answer 1"))
            .await
            .unwrap();

        assert!(!result.replayed);
        assert_eq!(result.round, 2);
        assert_eq!(result.analysis, "Still vague");
        assert_eq!(result.next_question(), Some("Question 3"));
        assert_eq!(gateway.calls().len(), 2);

        let session = store.load_session(&id).await.unwrap();
        assert_eq!(session.user_message_count(), 2);
        assert_eq!(session.answer(2), Some("Answer 1"));
    }

    #[tokio::test]
    async fn earlier_round_hint_replays_or_rejects() {
        let store = InMemoryTranscriptStore::new();
        let id = seeded(&store, 3).await;
        let (handler, _) = handler(&store, ScriptedGateway::new());

        let replayed = handler
            .handle(SubmitAnswerCommand::new(id, "Answer 2").for_round(2))
            .await
            .unwrap();
        assert!(replayed.replayed);
        assert_eq!(replayed.next_question(), Some("Question 3"));

        let err = handler
            .handle(SubmitAnswerCommand::new(id, "Something else").for_round(2))
            .await
            .unwrap_err();
        assert!(matches!(err, InterrogationError::InvalidState(_)));
    }

    #[tokio::test]
    async fn future_round_hint_is_invalid_state() {
        let store = InMemoryTranscriptStore::new();
        let id = seeded(&store, 0).await;
        let (handler, _) = handler(&store, ScriptedGateway::new());

        let err = handler
            .handle(SubmitAnswerCommand::new(id, "Jumping ahead").for_round(3))
            .await
            .unwrap_err();

        assert!(matches!(err, InterrogationError::InvalidState(_)));
    }

    #[tokio::test]
    async fn failed_commit_leaves_round_open_for_resubmission() {
        let store = InMemoryTranscriptStore::new();
        let id = seeded(&store, 0).await;
        let (handler, _) = handler(
            &store,
            ScriptedGateway::new()
                .then_ok("A1")
                .then_ok("Q2")
                .then_ok("A1 again")
                .then_ok("Q2 again"),
        );

        store.fail_next_writes(2);
        let err = handler
            .handle(SubmitAnswerCommand::new(id, "No time").for_round(1))
            .await
            .unwrap_err();
        assert!(matches!(err, InterrogationError::Store(_)));
        assert_eq!(store.load_session(&id).await.unwrap().messages().len(), 1);

        let result = handler
            .handle(SubmitAnswerCommand::new(id, "No time").for_round(1))
            .await
            .unwrap();
        assert!(!result.replayed);

        let session = store.load_session(&id).await.unwrap();
        assert_eq!(session.user_message_count(), 1);
        assert_eq!(session.insights().len(), 1);
    }

    #[tokio::test]
    async fn partially_written_round_resumes_without_duplicates() {
        let store = InMemoryTranscriptStore::new();
        let id = seeded(&store, 0).await;
        store
            .append_message(&Message::user(id, "Stored answer").unwrap())
            .await
            .unwrap();
        let (handler, gateway) =
            handler(&store, ScriptedGateway::new().then_ok("A1").then_ok("Q2"));

        handler
            .handle(SubmitAnswerCommand::new(id, "Stored answer"))
            .await
            .unwrap();

        let session = store.load_session(&id).await.unwrap();
        assert_eq!(session.user_message_count(), 1);
        assert_eq!(session.insights().len(), 1);
        assert_eq!(session.question(2), Some("Q2"));
        assert_eq!(gateway.calls().len(), 2);
    }

    #[tokio::test]
    async fn partially_written_round_rejects_different_answer() {
        let store = InMemoryTranscriptStore::new();
        let id = seeded(&store, 0).await;
        store
            .append_message(&Message::user(id, "Stored answer").unwrap())
            .await
            .unwrap();
        let (handler, _) = handler(&store, ScriptedGateway::new());

        let err = handler
            .handle(SubmitAnswerCommand::new(id, "Different answer"))
            .await
            .unwrap_err();

        assert!(matches!(err, InterrogationError::InvalidState(_)));
    }

    #[tokio::test]
    async fn stored_report_with_pending_status_is_closed() {
        let store = InMemoryTranscriptStore::new();
        let id = seeded(&store, 4).await;
        store
            .append_message(&Message::user(id, "Answer 5").unwrap())
            .await
            .unwrap();
        store
            .append_insight(&Insight::new(id, "Insight 5").unwrap())
            .await
            .unwrap();
        store
            .append_message(&Message::ai(id, REPORT).unwrap())
            .await
            .unwrap();
        let (handler, gateway) = handler(&store, ScriptedGateway::new());

        let result = handler
            .handle(SubmitAnswerCommand::new(id, "Answer 5"))
            .await
            .unwrap();

        assert_eq!(result.analysis, "Insight 5");
        assert_eq!(result.report().unwrap().title, "The Excuse Report");
        assert!(gateway.calls().is_empty());
        let session = store.load_session(&id).await.unwrap();
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.ai_message_count(), 6);
    }
}
