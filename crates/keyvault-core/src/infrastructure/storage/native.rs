//! Native secret backend
//!
//! Payloads go to the hardware-backed keystore as plaintext JSON; the
//! keystore itself is the security boundary.

use async_trait::async_trait;
use std::sync::Arc;
use zeroize::Zeroizing;

use crate::domain::credential::{CredentialType, SecretBackend, SecureCredential, SecureKeystore};
use crate::error::Result;

/// `SecretBackend` over an OS keystore
pub struct NativeSecureBackend {
    keystore: Arc<dyn SecureKeystore>,
    key_prefix: String,
}

impl std::fmt::Debug for NativeSecureBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeSecureBackend")
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

impl NativeSecureBackend {
    pub fn new(keystore: Arc<dyn SecureKeystore>, key_prefix: impl Into<String>) -> Self {
        Self {
            keystore,
            key_prefix: key_prefix.into(),
        }
    }
}

#[async_trait]
impl SecretBackend for NativeSecureBackend {
    async fn write(&self, credential: &SecureCredential) -> Result<()> {
        let key = credential.credential_type.storage_key(&self.key_prefix);
        let payload = credential.to_payload()?;
        self.keystore.set(&key, &payload).await
    }

    async fn read(&self, credential_type: CredentialType) -> Result<Option<SecureCredential>> {
        let key = credential_type.storage_key(&self.key_prefix);
        match self.keystore.get(&key).await? {
            Some(payload) => Ok(Some(SecureCredential::from_payload(Zeroizing::new(payload))?)),
            None => Ok(None),
        }
    }

    async fn remove(&self, credential_type: CredentialType) -> Result<()> {
        let key = credential_type.storage_key(&self.key_prefix);
        self.keystore.remove(&key).await
    }
}
