//! GitHub token validation against the authenticated-user endpoint

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client as HttpClient;
use reqwest::header::ACCEPT;
use serde::Deserialize;

use super::{check_failed, header_str, normalize_base_url, unexpected_status};
use crate::domain::credential::{ProviderMetadata, ProviderValidator, ValidationResult};
use crate::error::Result;

const PROVIDER: &str = "GitHub";

/// Comma-separated OAuth scopes granted to the token
const SCOPES_HEADER: &str = "x-oauth-scopes";

/// Present only for tokens with an expiry
const EXPIRATION_HEADER: &str = "github-authentication-token-expiration";

#[derive(Debug, Deserialize)]
struct GithubUser {
    #[serde(default)]
    login: String,
    avatar_url: Option<String>,
}

/// Live check for GitHub tokens
#[derive(Debug, Clone)]
pub struct GithubValidator {
    http_client: HttpClient,
    base_url: String,
}

impl GithubValidator {
    pub fn new(http_client: HttpClient, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: normalize_base_url(base_url),
        }
    }

    async fn check(&self, secret: &str) -> Result<ValidationResult> {
        let response = self
            .http_client
            .get(format!("{}/user", self.base_url))
            .bearer_auth(secret)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = %status, "GitHub validation response");

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(ValidationResult::invalid("Invalid GitHub token"));
        }
        if !status.is_success() {
            return Ok(unexpected_status(PROVIDER, status));
        }

        let scopes = header_str(response.headers(), SCOPES_HEADER)
            .map(parse_scopes)
            .unwrap_or_default();
        let expires_at = header_str(response.headers(), EXPIRATION_HEADER).and_then(parse_expiration);

        let user: GithubUser = response.json().await?;

        Ok(ValidationResult::valid("GitHub token is valid")
            .with_expiry(expires_at)
            .with_metadata(ProviderMetadata::Github {
                username: user.login,
                avatar: user.avatar_url,
                scopes,
            }))
    }
}

#[async_trait]
impl ProviderValidator for GithubValidator {
    async fn validate(&self, secret: &str) -> ValidationResult {
        match self.check(secret).await {
            Ok(result) => result,
            Err(e) => check_failed(PROVIDER, e),
        }
    }
}

/// Split the scopes header, dropping blanks
fn parse_scopes(header: &str) -> Vec<String> {
    header
        .split(',')
        .map(str::trim)
        .filter(|scope| !scope.is_empty())
        .map(String::from)
        .collect()
}

/// Parse GitHub's expiration header, e.g. `2025-03-01 12:00:00 UTC` or
/// `2025-03-01 12:00:00 -0800`
fn parse_expiration(header: &str) -> Option<DateTime<Utc>> {
    let header = header.trim();

    if let Some(naive) = header.strip_suffix(" UTC") {
        return NaiveDateTime::parse_from_str(naive, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|dt| dt.and_utc());
    }

    DateTime::parse_from_str(header, "%Y-%m-%d %H:%M:%S %z")
        .or_else(|_| DateTime::parse_from_rfc3339(header))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
