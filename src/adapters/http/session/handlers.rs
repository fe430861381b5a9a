//! HTTP handlers for session endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::gateway::model_catalog;
use crate::application::{SessionOrchestrator, StartSessionCommand, SubmitAnswerCommand};
use crate::domain::foundation::SessionId;
use crate::domain::interrogation::InterrogationError;

use super::dto::{
    ErrorResponse, HealthResponse, ModelsResponse, SessionResponse, StartSessionRequest,
    StartSessionResponse, SubmitAnswerRequest, SubmitAnswerResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct SessionHandlers {
    orchestrator: Arc<SessionOrchestrator>,
}

impl SessionHandlers {
    pub fn new(orchestrator: Arc<SessionOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/sessions/start - Open a session and get the first question
pub async fn start_session(
    State(handlers): State<SessionHandlers>,
    Json(req): Json<StartSessionRequest>,
) -> Response {
    let cmd = StartSessionCommand {
        goal: req.goal,
        model_choice: req.model_choice,
        user_id: req.user_id,
    };

    match handlers.orchestrator.start_session(cmd).await {
        Ok(result) => {
            let response: StartSessionResponse = result.into();
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => handle_interrogation_error(e),
    }
}

/// POST /api/sessions/answer - Answer the open question
pub async fn submit_answer(
    State(handlers): State<SessionHandlers>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Response {
    let session_id = match req.session_id.parse::<SessionId>() {
        Ok(id) => id,
        Err(_) => return invalid_session_id(),
    };

    let cmd = SubmitAnswerCommand {
        session_id,
        answer_text: req.answer_text,
        round: req.round,
    };

    match handlers.orchestrator.submit_answer(cmd).await {
        Ok(result) => {
            let response: SubmitAnswerResponse = result.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_interrogation_error(e),
    }
}

/// GET /api/sessions/:id - Full transcript
pub async fn get_session(
    State(handlers): State<SessionHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match session_id.parse::<SessionId>() {
        Ok(id) => id,
        Err(_) => return invalid_session_id(),
    };

    match handlers.orchestrator.get_session(session_id).await {
        Ok(session) => {
            let response = SessionResponse::from(&session);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_interrogation_error(e),
    }
}

/// GET /api/models - Selectable models
pub async fn list_models() -> Json<ModelsResponse> {
    Json(ModelsResponse::from_catalog(model_catalog::catalog()))
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn invalid_session_id() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::bad_request("Invalid session ID")),
    )
        .into_response()
}

fn handle_interrogation_error(error: InterrogationError) -> Response {
    let status = match &error {
        InterrogationError::Validation { .. } => StatusCode::BAD_REQUEST,
        InterrogationError::NotFound(_) => StatusCode::NOT_FOUND,
        InterrogationError::InvalidState(_) => StatusCode::CONFLICT,
        InterrogationError::Gateway(_) => StatusCode::BAD_GATEWAY,
        InterrogationError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    };

    if status.is_server_error() {
        tracing::error!(error = %error, "Session request failed");
    }

    (
        status,
        Json(ErrorResponse::new(error.code(), error.to_string())),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{GatewayError, StoreError};

    #[test]
    fn validation_maps_to_400() {
        let response =
            handle_interrogation_error(InterrogationError::validation("goal", "empty"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = handle_interrogation_error(InterrogationError::NotFound(SessionId::new()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_state_maps_to_409() {
        let response = handle_interrogation_error(InterrogationError::invalid_state("closed"));
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn gateway_maps_to_502() {
        let response = handle_interrogation_error(InterrogationError::Gateway(
            GatewayError::Timeout { timeout_secs: 8 },
        ));
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn store_maps_to_503() {
        let response =
            handle_interrogation_error(InterrogationError::Store(StoreError::unavailable("down")));
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
