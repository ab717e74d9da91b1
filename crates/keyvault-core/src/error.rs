//! Error types for Keyvault

use thiserror::Error;

/// Result type alias using Keyvault's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Keyvault error types
///
/// None of these carry secret material. Public `KeyStorage` operations never
/// return them directly; they are folded into `ValidationResult`,
/// `RetrieveResult`, or `bool` at the operation boundary.
#[derive(Error, Debug)]
pub enum Error {
    // Local checks (E001-E099)
    #[error("Invalid credential format")]
    FormatInvalid,

    #[error("Unknown credential type '{0}'. Run `keyvault --help` to see supported types.")]
    UnknownCredentialType(String),

    // Authentication (E100-E199)
    #[error("{0}")]
    BiometricDenied(String),

    // Remote validation (E200-E299)
    #[error("{0}")]
    ValidationRejected(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    // Persistence (E300-E399)
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailure(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::FormatInvalid => "E001",
            Self::UnknownCredentialType(_) => "E002",
            Self::BiometricDenied(_) => "E100",
            Self::ValidationRejected(_) => "E200",
            Self::NetworkError(_) => "E201",
            Self::StorageError(_) => "E300",
            Self::DecryptionFailure(_) => "E301",
            Self::Serialization(_) => "E302",
            Self::ConfigError(_) => "E600",
            Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::FormatInvalid => {
                Some("Check that the full key was pasted, including its prefix".to_string())
            }
            Self::UnknownCredentialType(_) => Some(
                "Use one of: github, anthropic, openai, gitlab, bitbucket, mcp_server, mcp_signing_secret"
                    .to_string(),
            ),
            Self::NetworkError(_) => Some("Check internet connection".to_string()),
            Self::DecryptionFailure(_) => {
                Some("Store the credential again; session-scoped data cannot be recovered".to_string())
            }
            Self::ConfigError(_) => Some("keyvault config list".to_string()),
            _ => None,
        }
    }

    /// Create a storage error from anything displayable
    pub fn storage(message: impl std::fmt::Display) -> Self {
        Self::StorageError(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_invalid_message() {
        let error = Error::FormatInvalid;
        assert_eq!(error.to_string(), "Invalid credential format");
        assert_eq!(error.code(), "E001");
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_biometric_denied_passes_message_through() {
        let error = Error::BiometricDenied("Biometric authentication failed".to_string());
        assert_eq!(error.to_string(), "Biometric authentication failed");
        assert_eq!(error.code(), "E100");
        assert_eq!(error.suggestion(), None);
    }

    #[test]
    fn test_storage_helper() {
        let error = Error::storage("quota exceeded");
        assert_eq!(error.code(), "E300");
        assert!(error.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_serialization_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = parse_err.into();
        assert_eq!(error.code(), "E302");
    }

    #[test]
    fn test_unknown_type_suggestion_lists_types() {
        let error = Error::UnknownCredentialType("dropbox".to_string());
        assert!(error.to_string().contains("dropbox"));
        assert!(error.suggestion().unwrap().contains("mcp_signing_secret"));
    }
}
