//! HTTP validators for providers with a live check
//!
//! Each validator calls one cheap authenticated endpoint with the candidate
//! secret and maps the response onto a `ValidationResult`:
//!
//! - 2xx: valid, with whatever metadata the provider exposes
//! - 401: invalid, "Invalid <provider> ..."
//! - anything else: invalid, message carries the status code
//! - transport failure: invalid, message carries the error text
//!
//! Anthropic alone treats 429 as valid (see `AnthropicValidator`).

pub mod anthropic;
pub mod github;
pub mod openai;

pub use anthropic::AnthropicValidator;
pub use github::GithubValidator;
pub use openai::OpenAiValidator;

use reqwest::header::HeaderMap;
use reqwest::{Client as HttpClient, StatusCode};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ValidationConfig;
use crate::domain::credential::{CredentialType, CredentialValidator, ValidationResult};
use crate::error::{Error, Result};

/// Build the HTTP client validators share
pub fn build_http_client(config: &ValidationConfig) -> Result<HttpClient> {
    HttpClient::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(Error::NetworkError)
}

impl CredentialValidator {
    /// Registry with the GitHub, Anthropic, and OpenAI validators
    pub fn from_config(config: &ValidationConfig) -> Result<Self> {
        let client = build_http_client(config)?;
        Ok(Self::with_http_client(client, config))
    }

    /// Same as `from_config`, reusing a client supplied by the host
    pub fn with_http_client(client: HttpClient, config: &ValidationConfig) -> Self {
        Self::new()
            .with_validator(
                CredentialType::Github,
                Arc::new(GithubValidator::new(client.clone(), &config.github_api_url)),
            )
            .with_validator(
                CredentialType::Anthropic,
                Arc::new(AnthropicValidator::new(
                    client.clone(),
                    &config.anthropic_api_url,
                    &config.anthropic_version,
                )),
            )
            .with_validator(
                CredentialType::Openai,
                Arc::new(OpenAiValidator::new(client, &config.openai_api_url)),
            )
    }
}

pub(crate) fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

pub(crate) fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    header_str(headers, name).and_then(|value| value.trim().parse().ok())
}

/// Result for a status with no provider-specific meaning
pub(crate) fn unexpected_status(provider: &str, status: StatusCode) -> ValidationResult {
    ValidationResult::invalid(format!("{} API error: {}", provider, status.as_u16()))
}

/// Fold a failed check into an invalid result
pub(crate) fn check_failed(provider: &str, error: Error) -> ValidationResult {
    tracing::warn!(provider, code = error.code(), error = %error, "Credential validation request failed");
    ValidationResult::from(&error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_header_helpers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-count", HeaderValue::from_static(" 42 "));
        headers.insert("x-word", HeaderValue::from_static("many"));

        assert_eq!(header_u64(&headers, "x-count"), Some(42));
        assert_eq!(header_u64(&headers, "x-word"), None);
        assert_eq!(header_u64(&headers, "x-missing"), None);
        assert_eq!(header_str(&headers, "x-word"), Some("many"));
    }

    #[test]
    fn test_unexpected_status_mentions_code() {
        let result = unexpected_status("GitHub", StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!result.is_valid);
        assert_eq!(result.message, "GitHub API error: 500");
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("https://api.github.com/"), "https://api.github.com");
    }

    #[test]
    fn test_from_config_registers_three_providers() {
        let validator = CredentialValidator::from_config(&ValidationConfig::default()).unwrap();
        assert!(validator.has_live_validator(CredentialType::Github));
        assert!(validator.has_live_validator(CredentialType::Anthropic));
        assert!(validator.has_live_validator(CredentialType::Openai));
        assert!(!validator.has_live_validator(CredentialType::Gitlab));
        assert!(!validator.has_live_validator(CredentialType::McpServer));
    }
}
