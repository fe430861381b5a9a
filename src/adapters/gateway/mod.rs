//! Model gateway adapter.
//!
//! - `ProviderModelGateway` - timeout, retry and report parsing over an `AIProvider`
//! - `model_catalog` - selectable models and key resolution
//! - `prompts` - prompt templates per generation kind

pub mod model_catalog;
mod prompts;
mod provider_gateway;

pub use model_catalog::{ModelSpec, DEFAULT_MODEL};
pub use provider_gateway::{GatewaySettings, ProviderModelGateway, MAX_GATEWAY_RETRIES};
