//! Anthropic API key validation
//!
//! A 429 here counts as valid: the key authenticated, only the check itself
//! was throttled. GitHub and OpenAI do not get this treatment.

use async_trait::async_trait;
use reqwest::Client as HttpClient;

use super::{check_failed, header_u64, normalize_base_url, unexpected_status};
use crate::domain::credential::{ProviderMetadata, ProviderValidator, ValidationResult};
use crate::error::Result;

const PROVIDER: &str = "Anthropic";

const REQUESTS_REMAINING_HEADER: &str = "anthropic-ratelimit-requests-remaining";
const TOKENS_REMAINING_HEADER: &str = "anthropic-ratelimit-tokens-remaining";

/// Live check for Anthropic API keys
#[derive(Debug, Clone)]
pub struct AnthropicValidator {
    http_client: HttpClient,
    base_url: String,
    api_version: String,
}

impl AnthropicValidator {
    pub fn new(http_client: HttpClient, base_url: &str, api_version: &str) -> Self {
        Self {
            http_client,
            base_url: normalize_base_url(base_url),
            api_version: api_version.to_string(),
        }
    }

    async fn check(&self, secret: &str) -> Result<ValidationResult> {
        let response = self
            .http_client
            .get(format!("{}/v1/models", self.base_url))
            .header("x-api-key", secret)
            .header("anthropic-version", &self.api_version)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = %status, "Anthropic validation response");

        let headers = response.headers();
        let metadata = ProviderMetadata::Anthropic {
            requests_remaining: header_u64(headers, REQUESTS_REMAINING_HEADER),
            tokens_remaining: header_u64(headers, TOKENS_REMAINING_HEADER),
        };

        let result = match status.as_u16() {
            200..=299 => {
                ValidationResult::valid("Anthropic API key is valid").with_metadata(metadata)
            }
            401 => ValidationResult::invalid("Invalid Anthropic API key"),
            429 => {
                tracing::info!("Anthropic validation was rate limited; accepting key");
                ValidationResult::valid("Anthropic API key is valid but rate limited")
                    .with_metadata(metadata)
            }
            _ => unexpected_status(PROVIDER, status),
        };
        Ok(result)
    }
}

#[async_trait]
impl ProviderValidator for AnthropicValidator {
    async fn validate(&self, secret: &str) -> ValidationResult {
        match self.check(secret).await {
            Ok(result) => result,
            Err(e) => check_failed(PROVIDER, e),
        }
    }
}
