//! Credential storage façade
//!
//! `KeyStorage` composes the format gate, the biometric gate, live
//! validation, and the platform secret backend into the operations the rest
//! of the application calls.
//!
//! No operation here returns an error or panics on an internal failure.
//! Failures become `isValid: false`, `secret: None`, or `false`, with details
//! going to the log (never the secret itself).

use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::entity::{
    CredentialType, RetrieveOptions, RetrieveResult, SecureCredential, StoreOptions,
    ValidationResult,
};
use super::format::FormatValidator;
use super::mask::mask_secret;
use super::platform::{BiometricMethod, PlatformCapabilities, PlatformKind};
use super::validator::CredentialValidator;
use crate::error::{Error, Result};

/// Message returned by a successful store
pub const STORED_SUCCESSFULLY: &str = "Credential stored successfully";

/// Fallback when a gate reports failure without a reason
const BIOMETRIC_FALLBACK_ERROR: &str = "Biometric authentication failed";

/// Public entry point for secure credential storage
///
/// # Example
///
/// ```ignore
/// let platform = Arc::new(WebPlatform::ephemeral(&config.storage));
/// let validator = CredentialValidator::from_config(&config.validation)?;
/// let storage = KeyStorage::new(platform, validator);
///
/// let result = storage
///     .store(CredentialType::Openai, "sk-proj-...", StoreOptions::default())
///     .await;
/// if result.is_valid {
///     let secret = storage.retrieve(CredentialType::Openai, RetrieveOptions::default()).await;
/// }
/// ```
pub struct KeyStorage {
    platform: Arc<dyn PlatformCapabilities>,
    validator: CredentialValidator,
    format: FormatValidator,
}

impl std::fmt::Debug for KeyStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStorage")
            .field("platform", &self.platform.kind())
            .field("validator", &self.validator)
            .finish()
    }
}

impl KeyStorage {
    pub fn new(platform: Arc<dyn PlatformCapabilities>, validator: CredentialValidator) -> Self {
        Self {
            platform,
            validator,
            format: FormatValidator::new(),
        }
    }

    /// Which platform implementation this instance was built with
    pub fn platform(&self) -> PlatformKind {
        self.platform.kind()
    }

    /// Display-safe rendering of a secret
    pub fn mask(&self, credential_type: CredentialType, secret: &str) -> String {
        mask_secret(secret, credential_type)
    }

    pub async fn biometric_available(&self) -> bool {
        self.platform.biometric_gate().is_available().await
    }

    pub async fn supported_biometric_methods(&self) -> Vec<BiometricMethod> {
        self.platform.biometric_gate().supported_methods().await
    }

    /// Validate and persist a secret
    ///
    /// Steps, each failing closed: format gate, biometric gate (if requested),
    /// live validation (unless skipped), backend write. A later store of the
    /// same type overwrites the earlier one.
    pub async fn store(
        &self,
        credential_type: CredentialType,
        secret: &str,
        options: StoreOptions,
    ) -> ValidationResult {
        match self.try_store(credential_type, secret, options).await {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    credential_type = %credential_type,
                    code = e.code(),
                    error = %e,
                    "Credential not stored"
                );
                ValidationResult::from(&e)
            }
        }
    }

    async fn try_store(
        &self,
        credential_type: CredentialType,
        secret: &str,
        options: StoreOptions,
    ) -> Result<ValidationResult> {
        if !self.format.validate(credential_type, secret) {
            return Err(Error::FormatInvalid);
        }

        if options.require_biometric {
            let prompt = format!(
                "Authenticate to store {} credential",
                credential_type.display_name()
            );
            self.authorize(&prompt).await?;
        }

        let mut validation = None;
        if !options.skip_validation {
            let result = self
                .validator
                .validate_credential(credential_type, secret)
                .await;
            if !result.is_valid {
                return Err(Error::ValidationRejected(result.message));
            }
            validation = Some(result);
        }

        let credential = SecureCredential::new(credential_type, secret);
        self.platform.secret_backend().write(&credential).await?;

        info!(credential_type = %credential_type, platform = %self.platform.kind(), "Stored credential");

        let mut result = ValidationResult::valid(STORED_SUCCESSFULLY);
        if let Some(validation) = validation {
            result.expires_at = validation.expires_at;
            result.metadata = validation.metadata;
        }
        Ok(result)
    }

    /// Load a stored secret
    ///
    /// Returns `secret: None` when nothing is stored, when the biometric gate
    /// refuses, or when the payload cannot be read or decrypted.
    pub async fn retrieve(
        &self,
        credential_type: CredentialType,
        options: RetrieveOptions,
    ) -> RetrieveResult {
        if options.require_biometric {
            let prompt = format!(
                "Authenticate to access {} credential",
                credential_type.display_name()
            );
            if let Err(e) = self.authorize(&prompt).await {
                warn!(credential_type = %credential_type, error = %e, "Retrieve refused by biometric gate");
                return RetrieveResult::unavailable();
            }
        }

        match self.platform.secret_backend().read(credential_type).await {
            Ok(Some(credential)) if credential.credential_type == credential_type => {
                RetrieveResult::found(credential)
            }
            Ok(Some(credential)) => {
                warn!(
                    credential_type = %credential_type,
                    stored_type = %credential.credential_type,
                    "Stored payload belongs to a different credential type"
                );
                RetrieveResult::unavailable()
            }
            Ok(None) => {
                debug!(credential_type = %credential_type, "No credential stored");
                RetrieveResult::unavailable()
            }
            Err(e) => {
                warn!(
                    credential_type = %credential_type,
                    code = e.code(),
                    error = %e,
                    "Failed to read credential"
                );
                RetrieveResult::unavailable()
            }
        }
    }

    /// Remove a stored secret; `false` only if the backend failed
    pub async fn delete(&self, credential_type: CredentialType) -> bool {
        match self.platform.secret_backend().remove(credential_type).await {
            Ok(()) => {
                info!(credential_type = %credential_type, "Deleted credential");
                true
            }
            Err(e) => {
                warn!(
                    credential_type = %credential_type,
                    code = e.code(),
                    error = %e,
                    "Failed to delete credential"
                );
                false
            }
        }
    }

    /// Whether a readable credential is stored for this type
    ///
    /// Agrees with `retrieve`: a payload belonging to another type counts as
    /// absent.
    pub async fn exists(&self, credential_type: CredentialType) -> bool {
        match self.platform.secret_backend().read(credential_type).await {
            Ok(found) => {
                found.is_some_and(|credential| credential.credential_type == credential_type)
            }
            Err(e) => {
                debug!(credential_type = %credential_type, code = e.code(), "Existence check failed");
                false
            }
        }
    }

    /// Every credential type currently stored, checked concurrently
    pub async fn stored_credential_types(&self) -> Vec<CredentialType> {
        let checks = CredentialType::ALL.map(|ty| async move { (ty, self.exists(ty).await) });

        join_all(checks)
            .await
            .into_iter()
            .filter_map(|(ty, present)| present.then_some(ty))
            .collect()
    }

    /// Re-run live validation for one stored credential
    ///
    /// `None` when no readable secret is stored for this type. Only this
    /// type's validator is consulted.
    pub async fn validate_stored(&self, credential_type: CredentialType) -> Option<ValidationResult> {
        let retrieved = self.retrieve(credential_type, RetrieveOptions::default()).await;
        let secret = retrieved.secret?;
        Some(
            self.validator
                .validate_credential(credential_type, secret.as_str())
                .await,
        )
    }

    /// Re-run live validation for every stored credential, concurrently
    ///
    /// Types whose secret cannot be retrieved are left out of the map.
    pub async fn validate_all_stored(&self) -> HashMap<CredentialType, ValidationResult> {
        let stored = self.stored_credential_types().await;

        let checks = stored.into_iter().map(|ty| async move {
            let result = self.validate_stored(ty).await?;
            Some((ty, result))
        });

        join_all(checks).await.into_iter().flatten().collect()
    }

    async fn authorize(&self, prompt: &str) -> Result<()> {
        let outcome = self.platform.biometric_gate().authenticate(prompt).await;
        if outcome.success {
            Ok(())
        } else {
            Err(Error::BiometricDenied(
                outcome
                    .error
                    .unwrap_or_else(|| BIOMETRIC_FALLBACK_ERROR.to_string()),
            ))
        }
    }
}
