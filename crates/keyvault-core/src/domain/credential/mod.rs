//! Credential domain module
//!
//! Accepts user-supplied secrets, checks them locally and against the
//! provider, and persists them behind a platform-appropriate boundary.
//!
//! # Architecture
//!
//! - **Entities**: `CredentialType`, `SecureCredential`, `SecureString`,
//!   `ValidationResult`, `RetrieveResult`
//! - **Pure logic**: `FormatValidator`, `mask_secret`
//! - **Platform seams**: `SecretBackend`, `BiometricGate`, `PlatformCapabilities`
//!   and the host facilities beneath them
//! - **Validation**: `CredentialValidator` registry of `ProviderValidator`s
//! - **Service**: `KeyStorage`, the façade the application calls
//!
//! # Flow
//!
//! ```text
//! store:    format gate -> [biometric] -> [live validation] -> backend.write
//! retrieve: [biometric] -> backend.read (web: decrypt) -> payload
//! ```

pub mod entity;
pub mod format;
pub mod mask;
pub mod platform;
pub mod service;
pub mod validator;

pub use entity::{
    CredentialType, ProviderMetadata, RetrieveOptions, RetrieveResult, SecureCredential,
    SecureString, StoreOptions, StoredMetadata, ValidationResult,
};
pub use format::FormatValidator;
pub use mask::{mask_secret, prefix_len};
pub use platform::{
    AuthenticationResult, BiometricApi, BiometricAvailability, BiometricGate, BiometricMethod,
    PlatformCapabilities, PlatformKind, SecretBackend, SecureKeystore, SessionStorage,
};
pub use service::{KeyStorage, STORED_SUCCESSFULLY};
pub use validator::{CredentialValidator, PassthroughValidator, ProviderValidator};
