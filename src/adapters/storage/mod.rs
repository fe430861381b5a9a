//! Storage Adapters
//!
//! In-process implementation of the TranscriptStore port.
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::InMemoryTranscriptStore;
//!
//! let store = Arc::new(InMemoryTranscriptStore::new());
//! ```

mod in_memory_transcript_store;

pub use in_memory_transcript_store::InMemoryTranscriptStore;
