//! OpenAI API key validation

use async_trait::async_trait;
use reqwest::Client as HttpClient;

use super::{check_failed, header_u64, normalize_base_url, unexpected_status};
use crate::domain::credential::{ProviderMetadata, ProviderValidator, ValidationResult};
use crate::error::Result;

const PROVIDER: &str = "OpenAI";

const REQUESTS_REMAINING_HEADER: &str = "x-ratelimit-remaining-requests";
const TOKENS_REMAINING_HEADER: &str = "x-ratelimit-remaining-tokens";

/// Live check for OpenAI API keys
#[derive(Debug, Clone)]
pub struct OpenAiValidator {
    http_client: HttpClient,
    base_url: String,
}

impl OpenAiValidator {
    pub fn new(http_client: HttpClient, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: normalize_base_url(base_url),
        }
    }

    async fn check(&self, secret: &str) -> Result<ValidationResult> {
        let response = self
            .http_client
            .get(format!("{}/v1/models", self.base_url))
            .bearer_auth(secret)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = %status, "OpenAI validation response");

        let result = match status.as_u16() {
            200..=299 => {
                let headers = response.headers();
                ValidationResult::valid("OpenAI API key is valid").with_metadata(
                    ProviderMetadata::Openai {
                        requests_remaining: header_u64(headers, REQUESTS_REMAINING_HEADER),
                        tokens_remaining: header_u64(headers, TOKENS_REMAINING_HEADER),
                    },
                )
            }
            401 => ValidationResult::invalid("Invalid OpenAI API key"),
            _ => unexpected_status(PROVIDER, status),
        };
        Ok(result)
    }
}

#[async_trait]
impl ProviderValidator for OpenAiValidator {
    async fn validate(&self, secret: &str) -> ValidationResult {
        match self.check(secret).await {
            Ok(result) => result,
            Err(e) => check_failed(PROVIDER, e),
        }
    }
}
