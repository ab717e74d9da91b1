//! Live validation dispatch
//!
//! `CredentialValidator` is a registry from credential type to a
//! `ProviderValidator`. Types with no registered entry fall through to
//! `PassthroughValidator`, which accepts without touching the network.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use super::entity::{CredentialType, ValidationResult};

/// One provider's live check
///
/// Implementations never fail: transport and protocol problems become an
/// invalid `ValidationResult` whose message describes the problem.
#[async_trait]
pub trait ProviderValidator: Send + Sync {
    async fn validate(&self, secret: &str) -> ValidationResult;
}

/// Accepts every secret for kinds without a discoverable validation endpoint
#[derive(Debug, Clone, Copy)]
pub struct PassthroughValidator {
    credential_type: CredentialType,
}

impl PassthroughValidator {
    pub fn new(credential_type: CredentialType) -> Self {
        Self { credential_type }
    }
}

#[async_trait]
impl ProviderValidator for PassthroughValidator {
    async fn validate(&self, _secret: &str) -> ValidationResult {
        ValidationResult::valid(format!(
            "No remote validation available for {}; format accepted",
            self.credential_type
        ))
    }
}

/// Registry of live validators keyed by credential type
#[derive(Clone, Default)]
pub struct CredentialValidator {
    validators: HashMap<CredentialType, Arc<dyn ProviderValidator>>,
}

impl std::fmt::Debug for CredentialValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut registered: Vec<_> = self.validators.keys().map(|ty| ty.as_str()).collect();
        registered.sort_unstable();
        f.debug_struct("CredentialValidator")
            .field("registered", &registered)
            .finish()
    }
}

impl CredentialValidator {
    /// An empty registry; every type passes through
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the validator for a type
    pub fn with_validator(
        mut self,
        credential_type: CredentialType,
        validator: Arc<dyn ProviderValidator>,
    ) -> Self {
        self.validators.insert(credential_type, validator);
        self
    }

    pub fn has_live_validator(&self, credential_type: CredentialType) -> bool {
        self.validators.contains_key(&credential_type)
    }

    /// Run the live check for `credential_type`
    ///
    /// Assumes the format gate already passed.
    pub async fn validate_credential(
        &self,
        credential_type: CredentialType,
        secret: &str,
    ) -> ValidationResult {
        match self.validators.get(&credential_type) {
            Some(validator) => {
                tracing::debug!(credential_type = %credential_type, "Running live credential validation");
                validator.validate(secret).await
            }
            None => PassthroughValidator::new(credential_type).validate(secret).await,
        }
    }
}
