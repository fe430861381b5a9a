//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Chat completion against an LLM provider
//! - `ModelGateway` - Bounded, retried generation of questions, analyses and reports
//! - `TranscriptStore` - Durable sessions, messages and insights

mod ai_provider;
mod model_gateway;
mod transcript_store;

pub use ai_provider::{
    AIError, AIProvider, ChatMessage, ChatRole, CompletionRequest, CompletionResponse,
    FinishReason, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use model_gateway::{
    Exchange, GatewayError, GenerationContext, GenerationKind, ModelGateway,
};
pub use transcript_store::{StoreError, TranscriptStore};
