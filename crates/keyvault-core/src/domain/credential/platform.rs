//! Platform seams
//!
//! Everything platform-conditional sits behind these traits. The host picks a
//! `PlatformCapabilities` implementation once, at construction, and the
//! façade never asks which platform it is running on.
//!
//! Two layers:
//!
//! - **Host facilities** (`SecureKeystore`, `SessionStorage`, `BiometricApi`):
//!   the raw primitives a shell provides.
//! - **Core abstractions** (`SecretBackend`, `BiometricGate`): what the façade
//!   consumes, built on top of the facilities.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::entity::{CredentialType, SecureCredential};
use crate::error::Result;

/// Which shell the core is running in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformKind {
    Native,
    Web,
}

impl PlatformKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Web => "web",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A biometric or device-credential method the device can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiometricMethod {
    Fingerprint,
    FaceRecognition,
    Iris,
    DeviceCredential,
}

/// Hardware and enrollment state reported by the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BiometricAvailability {
    pub is_available: bool,
    pub method: Option<BiometricMethod>,
}

/// Outcome of a biometric prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    pub success: bool,
    pub error: Option<String>,
}

impl AuthenticationResult {
    pub fn success() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// OS keystore facility (Keychain, Android Keystore, Secret Service, ...)
///
/// Absence is an explicit `None`, never an error.
#[async_trait]
pub trait SecureKeystore: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Remove a value. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Session-scoped key/value storage, cleared when the session ends
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// OS biometric prompt facility
#[async_trait]
pub trait BiometricApi: Send + Sync {
    async fn check_availability(&self) -> Result<BiometricAvailability>;

    /// Show the prompt. Any error means the user was not authenticated.
    async fn authenticate(&self, prompt: &str) -> Result<()>;
}

/// Where credential payloads live
#[async_trait]
pub trait SecretBackend: Send + Sync {
    /// Persist a credential, replacing any previous one of the same type
    async fn write(&self, credential: &SecureCredential) -> Result<()>;

    /// Load a credential; `Ok(None)` means nothing is stored for this type
    async fn read(&self, credential_type: CredentialType) -> Result<Option<SecureCredential>>;

    async fn remove(&self, credential_type: CredentialType) -> Result<()>;
}

/// Biometric checkpoint in front of storage operations
#[async_trait]
pub trait BiometricGate: Send + Sync {
    async fn is_available(&self) -> bool;

    async fn supported_methods(&self) -> Vec<BiometricMethod>;

    async fn authenticate(&self, prompt: &str) -> AuthenticationResult;
}

/// The platform-specific half of the subsystem, resolved once by the host
pub trait PlatformCapabilities: Send + Sync {
    fn kind(&self) -> PlatformKind;

    fn biometric_gate(&self) -> &dyn BiometricGate;

    fn secret_backend(&self) -> &dyn SecretBackend;
}
