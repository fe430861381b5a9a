//! HTTP DTOs for session endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::adapters::gateway::ModelSpec;
use crate::application::{RoundOutcome, StartSessionResult, SubmitAnswerResult};
use crate::domain::foundation::SessionStatus;
use crate::domain::interrogation::{
    FinalReport, Insight, Message, MessageRole, Session, SessionPhase,
};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to start a session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    pub goal: String,
    #[serde(default)]
    pub model_choice: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Request to answer the open question.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    pub session_id: String,
    pub answer_text: String,
    #[serde(default)]
    pub round: Option<u8>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResponse {
    pub session_id: String,
    pub question: String,
    pub round: u8,
    pub fallback: bool,
}

impl From<StartSessionResult> for StartSessionResponse {
    fn from(result: StartSessionResult) -> Self {
        Self {
            session_id: result.session_id.to_string(),
            question: result.question,
            round: result.round,
            fallback: result.used_fallback,
        }
    }
}

/// `nextQuestion` for rounds 1-4, `report` and `status` for round 5.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    pub round: u8,
    pub analysis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<FinalReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SessionStatus>,
    pub fallback: bool,
    pub replayed: bool,
}

impl From<SubmitAnswerResult> for SubmitAnswerResponse {
    fn from(result: SubmitAnswerResult) -> Self {
        let (next_question, report, status) = match result.outcome {
            RoundOutcome::NextQuestion { question, .. } => (Some(question), None, None),
            RoundOutcome::Report { report, status } => (None, Some(report), Some(status)),
        };
        Self {
            round: result.round,
            analysis: result.analysis,
            next_question,
            report,
            status,
            fallback: result.used_fallback,
            replayed: result.replayed,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: String,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            role: message.role,
            content: message.content.clone(),
            created_at: message.created_at.as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightResponse {
    pub id: String,
    pub content: String,
    pub created_at: String,
}

impl From<&Insight> for InsightResponse {
    fn from(insight: &Insight) -> Self {
        Self {
            id: insight.id.to_string(),
            content: insight.content.clone(),
            created_at: insight.created_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Full transcript view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
    pub goal: String,
    pub model: String,
    pub status: SessionStatus,
    pub phase: SessionPhase,
    pub messages: Vec<MessageResponse>,
    pub insights: Vec<InsightResponse>,
    pub created_at: String,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id().to_string(),
            goal: session.goal().to_string(),
            model: session.model().to_string(),
            status: session.status(),
            phase: session.phase(),
            messages: session.messages().iter().map(Into::into).collect(),
            insights: session.insights().iter().map(Into::into).collect(),
            created_at: session.created_at().as_datetime().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    pub models: BTreeMap<String, ModelSpec>,
}

impl ModelsResponse {
    pub fn from_catalog(catalog: &BTreeMap<&'static str, ModelSpec>) -> Self {
        Self {
            models: catalog
                .iter()
                .map(|(key, spec)| (key.to_string(), spec.clone()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl ToString, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;

    #[test]
    fn start_request_uses_camel_case() {
        let json = r#"{"goal": "get jacked", "modelChoice": "gpt-4.1"}"#;
        let req: StartSessionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.goal, "get jacked");
        assert_eq!(req.model_choice.as_deref(), Some("gpt-4.1"));
        assert!(req.user_id.is_none());
    }

    #[test]
    fn answer_request_round_is_optional() {
        let json = r#"{"sessionId": "abc", "answerText": "no time"}"#;
        let req: SubmitAnswerRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.answer_text, "no time");
        assert!(req.round.is_none());
    }

    #[test]
    fn mid_session_answer_omits_report_fields() {
        let response = SubmitAnswerResponse::from(SubmitAnswerResult {
            session_id: SessionId::new(),
            round: 2,
            analysis: "Hm".into(),
            outcome: RoundOutcome::NextQuestion {
                round: 3,
                question: "And?".into(),
            },
            used_fallback: false,
            replayed: false,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["nextQuestion"], "And?");
        assert!(json.get("report").is_none());
        assert!(json.get("status").is_none());
    }

    #[test]
    fn final_answer_carries_report_and_status() {
        let response = SubmitAnswerResponse::from(SubmitAnswerResult {
            session_id: SessionId::new(),
            round: 5,
            analysis: "Done".into(),
            outcome: RoundOutcome::Report {
                report: FinalReport::fallback("run"),
                status: SessionStatus::Abandoned,
            },
            used_fallback: true,
            replayed: false,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("nextQuestion").is_none());
        assert_eq!(json["report"]["title"], "The Real Talk Report");
        assert_eq!(json["status"], "abandoned");
    }

    #[test]
    fn session_response_includes_phase() {
        let session = Session::new(None, "write a book", "gpt-4.1-nano").unwrap();
        let json = serde_json::to_value(SessionResponse::from(&session)).unwrap();
        assert_eq!(json["goal"], "write a book");
        assert_eq!(json["status"], "active");
        assert_eq!(json["phase"]["phase"], "created");
        assert_eq!(json["messages"].as_array().unwrap().len(), 0);
    }
}
