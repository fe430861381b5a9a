//! HTTP routes for session endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    get_session, health, list_models, start_session, submit_answer, SessionHandlers,
};

/// Session endpoints, to be nested under `/api/sessions`.
pub fn session_routes(handlers: SessionHandlers) -> Router {
    Router::new()
        .route("/start", post(start_session))
        .route("/answer", post(submit_answer))
        .route("/:id", get(get_session))
        .with_state(handlers)
}

/// Full API: sessions, model listing and health.
pub fn api_router(handlers: SessionHandlers) -> Router {
    Router::new()
        .nest("/api/sessions", session_routes(handlers))
        .route("/api/models", get(list_models))
        .route("/health", get(health))
}
