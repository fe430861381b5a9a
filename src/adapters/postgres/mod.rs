//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresTranscriptStore` - sessions, messages and insights with
//!   transactional round commits (schema in `migrations/`)

mod transcript_store;

pub use transcript_store::PostgresTranscriptStore;
