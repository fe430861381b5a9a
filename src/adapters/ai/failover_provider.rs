//! Failover AI Provider - Wrapper that provides automatic failover between providers.
//!
//! When the primary provider fails with a transient error (rate limit,
//! unavailable, network, timeout), the request is repeated once against the
//! secondary provider if one is configured.
//!
//! # Example
//!
//! ```ignore
//! let primary = Arc::new(OpenAIProvider::new(primary_config)?);
//! let secondary = Arc::new(OpenAIProvider::new(secondary_config)?);
//!
//! let provider = FailoverAIProvider::new(primary).with_fallback(secondary);
//! ```

use async_trait::async_trait;
use std::sync::Arc;

use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, ProviderInfo};

/// AI provider wrapper with automatic failover support.
pub struct FailoverAIProvider {
    primary: Arc<dyn AIProvider>,
    fallback: Option<Arc<dyn AIProvider>>,
}

impl FailoverAIProvider {
    pub fn new(primary: Arc<dyn AIProvider>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn AIProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    fn record_usage(
        &self,
        provider: &str,
        request: &CompletionRequest,
        response: &CompletionResponse,
    ) {
        tracing::debug!(
            session_id = %request.metadata.session_id,
            trace_id = %request.metadata.trace_id,
            provider,
            model = %response.model,
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            cost_micros = response.usage.estimated_cost_micros,
            "AI tokens used"
        );
    }
}

#[async_trait]
impl AIProvider for FailoverAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let primary_name = self.primary.provider_info().name;

        match (self.primary.complete(request.clone()).await, &self.fallback) {
            (Ok(response), _) => {
                self.record_usage(&primary_name, &request, &response);
                Ok(response)
            }
            (Err(err), Some(fallback)) if err.is_retryable() => {
                let fallback_name = fallback.provider_info().name;
                tracing::warn!(
                    session_id = %request.metadata.session_id,
                    primary = %primary_name,
                    fallback = %fallback_name,
                    reason = %err,
                    "Primary AI provider failed, using fallback"
                );

                let response = fallback.complete(request.clone()).await?;
                self.record_usage(&fallback_name, &request, &response);
                Ok(response)
            }
            (Err(err), _) => Err(err),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.primary.provider_info()
    }
}
