//! HTTP adapter for session endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ErrorResponse, HealthResponse, InsightResponse, MessageResponse, ModelsResponse,
    SessionResponse, StartSessionRequest, StartSessionResponse, SubmitAnswerRequest,
    SubmitAnswerResponse,
};
pub use handlers::SessionHandlers;
pub use routes::{api_router, session_routes};
