//! Model gateway configuration

use serde::Deserialize;
use std::time::Duration;

use crate::adapters::gateway::{GatewaySettings, MAX_GATEWAY_RETRIES};

use super::ai::AiConfig;
use super::error::ValidationError;

/// Timeout and retry policy for model calls
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Deadline per provider attempt in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries after the first attempt
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Delay before the first retry; doubles per retry
    #[serde(default = "default_backoff")]
    pub retry_backoff_ms: u64,
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Gateway settings combining this policy with the sampling options
    pub fn settings(&self, ai: &AiConfig) -> GatewaySettings {
        GatewaySettings {
            temperature: ai.temperature,
            max_tokens: ai.max_tokens,
            report_max_tokens: ai.report_max_tokens,
            ..GatewaySettings::default()
        }
        .with_timeout(self.timeout())
        .with_max_retries(self.max_retries)
        .with_retry_backoff(self.retry_backoff())
    }

    /// Validate gateway configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 30 {
            return Err(ValidationError::InvalidGatewayTimeout);
        }
        if self.max_retries > MAX_GATEWAY_RETRIES {
            return Err(ValidationError::TooManyRetries(MAX_GATEWAY_RETRIES));
        }
        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            retry_backoff_ms: default_backoff(),
        }
    }
}

fn default_timeout() -> u64 {
    8
}

fn default_retries() -> u32 {
    2
}

fn default_backoff() -> u64 {
    250
}
