//! Local format checks
//!
//! The first gate in `store`: pure, synchronous, no I/O. A secret that fails
//! here never reaches the network or a storage backend.

use regex::Regex;
use std::sync::LazyLock;

use super::entity::CredentialType;

static GITHUB_CLASSIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(ghp|gho|ghu|ghs|ghr)_[A-Za-z0-9]{36}$").expect("valid regex"));

static GITHUB_FINE_GRAINED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^github_pat_[A-Za-z0-9_]{82}$").expect("valid regex"));

static ANTHROPIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^sk-ant-[A-Za-z0-9_-]{20,}$").expect("valid regex"));

static OPENAI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^sk-[A-Za-z0-9_-]{20,}$").expect("valid regex"));

static GITLAB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^glpat-[A-Za-z0-9_-]{20,}$").expect("valid regex"));

static BITBUCKET_API_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ATBB[A-Za-z0-9_=-]{24,}$").expect("valid regex"));

static BITBUCKET_APP_PASSWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{20}$").expect("valid regex"));

/// Per-type shape rules
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatValidator;

impl FormatValidator {
    pub fn new() -> Self {
        Self
    }

    /// Check whether `secret` has the shape expected for `credential_type`
    ///
    /// Types without a documented shape (`mcp_server`, `mcp_signing_secret`)
    /// always pass.
    pub fn validate(&self, credential_type: CredentialType, secret: &str) -> bool {
        match credential_type {
            CredentialType::Github => {
                GITHUB_CLASSIC.is_match(secret) || GITHUB_FINE_GRAINED.is_match(secret)
            }
            CredentialType::Anthropic => ANTHROPIC.is_match(secret),
            CredentialType::Openai => OPENAI.is_match(secret),
            CredentialType::Gitlab => GITLAB.is_match(secret),
            CredentialType::Bitbucket => {
                BITBUCKET_API_TOKEN.is_match(secret) || BITBUCKET_APP_PASSWORD.is_match(secret)
            }
            CredentialType::McpServer | CredentialType::McpSigningSecret => true,
        }
    }
}
