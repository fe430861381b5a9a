//! HTTP adapters - REST API implementations.
//!
//! The session facade is the only HTTP surface.

pub mod session;

// Re-export key types for convenience
pub use session::{api_router, session_routes, SessionHandlers};
