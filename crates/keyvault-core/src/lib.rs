//! Keyvault Core Library
//!
//! Secure credential storage and validation for AI-provider API keys, OAuth
//! tokens, and MCP server credentials:
//! - Format checks and display masking per credential type
//! - Live validation against GitHub, Anthropic, and OpenAI
//! - Storage in the OS keystore (native) or an encrypted session store (web)
//! - Optional biometric gating of store and retrieve

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::credential::{
    CredentialType, CredentialValidator, KeyStorage, RetrieveOptions, RetrieveResult,
    StoreOptions, ValidationResult, mask_secret,
};
pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::credential::{
        CredentialType, CredentialValidator, KeyStorage, PlatformKind, RetrieveOptions,
        RetrieveResult, StoreOptions, ValidationResult, mask_secret,
    };
    pub use crate::error::{Error, Result};
    pub use crate::infrastructure::{NativePlatform, WebPlatform};
}
