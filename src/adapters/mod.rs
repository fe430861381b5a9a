//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - completion providers (OpenAI-compatible, mock, failover)
//! - `gateway` - the model gateway over a provider
//! - `storage` - in-memory transcript store
//! - `postgres` - PostgreSQL transcript store
//! - `http` - axum session facade

pub mod ai;
pub mod gateway;
pub mod http;
pub mod postgres;
pub mod storage;

pub use ai::{FailoverAIProvider, MockAIProvider, OpenAIConfig, OpenAIProvider};
pub use gateway::{GatewaySettings, ProviderModelGateway};
pub use http::{api_router, SessionHandlers};
pub use postgres::PostgresTranscriptStore;
pub use storage::InMemoryTranscriptStore;
