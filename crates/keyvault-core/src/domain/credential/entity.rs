//! Credential domain entities
//!
//! The persisted payload (`SecureCredential`), the result shapes handed back to
//! callers, and the closed set of credential types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::Error;

/// Kind of secret the core knows how to validate and store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialType {
    Github,
    Anthropic,
    Openai,
    Gitlab,
    Bitbucket,
    McpServer,
    McpSigningSecret,
}

impl CredentialType {
    /// Every credential type, in a fixed order
    pub const ALL: [CredentialType; 7] = [
        Self::Github,
        Self::Anthropic,
        Self::Openai,
        Self::Gitlab,
        Self::Bitbucket,
        Self::McpServer,
        Self::McpSigningSecret,
    ];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Anthropic => "anthropic",
            Self::Openai => "openai",
            Self::Gitlab => "gitlab",
            Self::Bitbucket => "bitbucket",
            Self::McpServer => "mcp_server",
            Self::McpSigningSecret => "mcp_signing_secret",
        }
    }

    /// Human-readable provider name used in messages and prompts
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Github => "GitHub",
            Self::Anthropic => "Anthropic",
            Self::Openai => "OpenAI",
            Self::Gitlab => "GitLab",
            Self::Bitbucket => "Bitbucket",
            Self::McpServer => "MCP server",
            Self::McpSigningSecret => "MCP signing secret",
        }
    }

    /// Storage key for this type under the given namespace prefix
    ///
    /// Native and web backends share the same naming scheme.
    pub fn storage_key(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.as_str())
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CredentialType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == normalized)
            .ok_or_else(|| Error::UnknownCredentialType(s.to_string()))
    }
}

/// A string that is securely zeroed when dropped
///
/// Serializes as a plain JSON string so persisted payloads stay readable by
/// any backend, but never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    /// Create a new secure string
    pub fn new(s: impl Into<String>) -> Self {
        Self { inner: s.into() }
    }

    /// Get the string value
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("inner", &"[REDACTED]")
            .finish()
    }
}

impl AsRef<str> for SecureString {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Serialize for SecureString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner)
    }
}

impl<'de> Deserialize<'de> for SecureString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// The persisted payload
///
/// Created only by `KeyStorage::store`, overwritten wholesale by a later store
/// of the same type, destroyed by delete or by the web session ending.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecureCredential {
    pub secret: SecureString,
    pub stored_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub credential_type: CredentialType,
}

impl SecureCredential {
    /// Wrap a secret, stamping it with the current time
    pub fn new(credential_type: CredentialType, secret: &str) -> Self {
        Self {
            secret: SecureString::new(secret),
            stored_at: Utc::now(),
            credential_type,
        }
    }

    /// Serialize to the JSON payload; the buffer is wiped when dropped
    pub fn to_payload(&self) -> crate::error::Result<Zeroizing<String>> {
        Ok(Zeroizing::new(serde_json::to_string(self)?))
    }

    /// Parse a JSON payload, wiping the plaintext buffer afterwards
    pub fn from_payload(payload: Zeroizing<String>) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(&payload)?)
    }

    pub fn metadata(&self) -> StoredMetadata {
        StoredMetadata {
            stored_at: self.stored_at,
            credential_type: self.credential_type,
        }
    }
}

/// Provider-specific details extracted from a successful live validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum ProviderMetadata {
    Github {
        username: String,
        avatar: Option<String>,
        scopes: Vec<String>,
    },
    Anthropic {
        requests_remaining: Option<u64>,
        tokens_remaining: Option<u64>,
    },
    Openai {
        requests_remaining: Option<u64>,
        tokens_remaining: Option<u64>,
    },
}

/// Outcome of a format check, a live check, or a store
///
/// The shape is the same whichever step produced it; only `message` tells
/// them apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ProviderMetadata>,
}

impl ValidationResult {
    pub fn valid(message: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            message: message.into(),
            expires_at: None,
            metadata: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
            expires_at: None,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: ProviderMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_expiry(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }
}

impl From<&Error> for ValidationResult {
    fn from(error: &Error) -> Self {
        Self::invalid(error.to_string())
    }
}

/// Non-secret facts about a stored credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMetadata {
    pub stored_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub credential_type: CredentialType,
}

/// Outcome of a retrieve
///
/// `secret` is `None` on every failure path; callers should not try to tell
/// those paths apart.
#[derive(Debug, Clone, Default)]
pub struct RetrieveResult {
    pub secret: Option<SecureString>,
    pub metadata: Option<StoredMetadata>,
}

impl RetrieveResult {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn found(credential: SecureCredential) -> Self {
        let metadata = credential.metadata();
        Self {
            secret: Some(credential.secret),
            metadata: Some(metadata),
        }
    }

    pub fn is_available(&self) -> bool {
        self.secret.is_some()
    }
}

/// Options for `KeyStorage::store`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    pub require_biometric: bool,
    pub skip_validation: bool,
}

impl StoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_biometric(mut self, required: bool) -> Self {
        self.require_biometric = required;
        self
    }

    pub fn skip_validation(mut self, skip: bool) -> Self {
        self.skip_validation = skip;
        self
    }
}

/// Options for `KeyStorage::retrieve`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetrieveOptions {
    pub require_biometric: bool,
}

impl RetrieveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_biometric(mut self, required: bool) -> Self {
        self.require_biometric = required;
        self
    }
}
