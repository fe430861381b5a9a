//! ModelGateway backed by an [`AIProvider`].
//!
//! Each attempt runs under a deadline. Transient failures (provider errors
//! classified retryable, and deadline hits) are retried with exponential
//! backoff up to `max_retries` times. Reports are parsed here; unparseable
//! output earns one more request with a stricter instruction.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::domain::interrogation::FinalReport;
use crate::ports::{
    AIError, AIProvider, ChatRole, CompletionRequest, GatewayError, GenerationContext,
    GenerationKind, ModelGateway, RequestMetadata,
};

use super::model_catalog;
use super::prompts;

/// Upper bound for the retry budget.
pub const MAX_GATEWAY_RETRIES: u32 = 2;

/// Timeout, retry and sampling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewaySettings {
    /// Deadline for a single provider attempt.
    pub timeout: Duration,
    /// Retries after the first attempt, capped at [`MAX_GATEWAY_RETRIES`].
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each further retry.
    pub retry_backoff: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
    pub report_max_tokens: u32,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(8),
            max_retries: MAX_GATEWAY_RETRIES,
            retry_backoff: Duration::from_millis(250),
            temperature: 0.9,
            max_tokens: 200,
            report_max_tokens: 400,
        }
    }
}

impl GatewaySettings {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.min(MAX_GATEWAY_RETRIES);
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }
}

/// Why one attempt failed.
enum AttemptFailure {
    DeadlineExceeded,
    Provider(AIError),
}

impl AttemptFailure {
    fn is_retryable(&self) -> bool {
        match self {
            AttemptFailure::DeadlineExceeded => true,
            AttemptFailure::Provider(err) => err.is_retryable(),
        }
    }

    fn into_gateway_error(self, timeout: Duration) -> GatewayError {
        match self {
            AttemptFailure::DeadlineExceeded
            | AttemptFailure::Provider(AIError::Timeout { .. }) => GatewayError::Timeout {
                timeout_secs: timeout.as_secs().max(1),
            },
            AttemptFailure::Provider(AIError::Parse(message)) => {
                GatewayError::MalformedResponse(message)
            }
            AttemptFailure::Provider(err) => GatewayError::Provider(err.to_string()),
        }
    }

    fn describe(&self) -> String {
        match self {
            AttemptFailure::DeadlineExceeded => "deadline exceeded".to_string(),
            AttemptFailure::Provider(err) => err.to_string(),
        }
    }
}

/// Gateway that turns generation requests into provider completions.
pub struct ProviderModelGateway {
    provider: Arc<dyn AIProvider>,
    settings: GatewaySettings,
}

impl ProviderModelGateway {
    pub fn new(provider: Arc<dyn AIProvider>, settings: GatewaySettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    fn build_request(
        &self,
        kind: GenerationKind,
        context: &GenerationContext,
        strict: bool,
    ) -> CompletionRequest {
        let metadata = RequestMetadata::new(context.session_id, uuid::Uuid::new_v4().to_string());
        let max_tokens = match kind {
            GenerationKind::FinalReport => self.settings.report_max_tokens,
            _ => self.settings.max_tokens,
        };

        let mut request = CompletionRequest::new(metadata)
            .with_system_prompt(prompts::system_prompt_for(kind))
            .with_model(model_catalog::resolve(&context.model))
            .with_max_tokens(max_tokens)
            .with_temperature(self.settings.temperature)
            .with_message(ChatRole::User, prompts::user_prompt_for(kind, context));

        if strict {
            request = request
                .with_message(ChatRole::User, prompts::strict_report_instruction())
                .with_temperature(0.2);
        }
        request
    }

    /// Runs one request through the timeout and retry policy.
    async fn complete_with_retries(
        &self,
        kind: GenerationKind,
        request: CompletionRequest,
    ) -> Result<String, GatewayError> {
        let session_id = request.metadata.session_id;
        let mut retry_count = 0;

        loop {
            let failure =
                match timeout(self.settings.timeout, self.provider.complete(request.clone())).await
                {
                    Ok(Ok(response)) => {
                        let content = response.content.trim();
                        if content.is_empty() {
                            AttemptFailure::Provider(AIError::parse("empty completion"))
                        } else {
                            return Ok(content.to_string());
                        }
                    }
                    Ok(Err(err)) => AttemptFailure::Provider(err),
                    Err(_) => AttemptFailure::DeadlineExceeded,
                };

            tracing::warn!(
                session_id = %session_id,
                kind = %kind,
                attempt = retry_count + 1,
                error = %failure.describe(),
                "Model gateway attempt failed"
            );

            if !failure.is_retryable() || retry_count >= self.settings.max_retries {
                return Err(failure.into_gateway_error(self.settings.timeout));
            }

            // Exponential backoff: b, 2b, 4b, ...
            sleep(self.settings.retry_backoff * (1 << retry_count)).await;
            retry_count += 1;
        }
    }

    async fn generate_report(&self, context: &GenerationContext) -> Result<String, GatewayError> {
        let kind = GenerationKind::FinalReport;
        let raw = self
            .complete_with_retries(kind, self.build_request(kind, context, false))
            .await?;

        match FinalReport::parse(&raw) {
            Ok(report) => Ok(report.to_json()),
            Err(first) => {
                tracing::warn!(
                    session_id = %context.session_id,
                    error = %first,
                    "Report unparseable, retrying with strict instruction"
                );
                let raw = self
                    .complete_with_retries(kind, self.build_request(kind, context, true))
                    .await?;
                FinalReport::parse(&raw)
                    .map(|report| report.to_json())
                    .map_err(|e| GatewayError::MalformedResponse(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl ModelGateway for ProviderModelGateway {
    async fn generate(
        &self,
        kind: GenerationKind,
        context: &GenerationContext,
    ) -> Result<String, GatewayError> {
        match kind {
            GenerationKind::FinalReport => self.generate_report(context).await,
            _ => {
                self.complete_with_retries(kind, self.build_request(kind, context, false))
                    .await
            }
        }
    }
}
