//! AI provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;

/// AI provider configuration
///
/// The primary endpoint is any OpenAI-compatible chat completions API. An
/// optional secondary endpoint takes over on retryable failures.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API key for the primary endpoint
    pub openai_api_key: Option<Secret<String>>,

    /// Primary endpoint base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used when a session names none
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Secondary endpoint base URL
    pub fallback_base_url: Option<String>,

    /// Secondary endpoint API key (defaults to the primary key)
    pub fallback_api_key: Option<Secret<String>>,

    /// Sampling temperature for questions and analysis
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion limit for questions and analysis
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Completion limit for the closing report
    #[serde(default = "default_report_max_tokens")]
    pub report_max_tokens: u32,
}

impl AiConfig {
    /// Check if the primary endpoint has a key
    pub fn has_openai(&self) -> bool {
        self.openai_api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Check if a secondary endpoint is configured
    pub fn has_fallback(&self) -> bool {
        self.fallback_base_url
            .as_ref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// Key for the secondary endpoint, falling back to the primary key
    pub fn fallback_key(&self) -> Option<&Secret<String>> {
        self.fallback_api_key
            .as_ref()
            .or(self.openai_api_key.as_ref())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_openai() {
            return Err(ValidationError::MissingRequired("OPENAI_API_KEY"));
        }
        check_url(&self.base_url)?;
        if let Some(url) = self.fallback_base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            check_url(url)?;
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        if self.max_tokens == 0 || self.report_max_tokens == 0 {
            return Err(ValidationError::InvalidTokenLimit);
        }
        Ok(())
    }
}

fn check_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(ValidationError::InvalidBaseUrl(url.to_string()))
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            base_url: default_base_url(),
            default_model: default_model(),
            fallback_base_url: None,
            fallback_api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            report_max_tokens: default_report_max_tokens(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4.1-nano".to_string()
}

fn default_temperature() -> f32 {
    0.9
}

fn default_max_tokens() -> u32 {
    200
}

fn default_report_max_tokens() -> u32 {
    400
}
