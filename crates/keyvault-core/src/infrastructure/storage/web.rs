//! Web fallback secret backend
//!
//! Payloads are encrypted with the session cipher and kept in session
//! storage, one entry per credential type.

use async_trait::async_trait;
use std::sync::Arc;
use zeroize::Zeroizing;

use crate::domain::credential::{CredentialType, SecretBackend, SecureCredential, SessionStorage};
use crate::error::{Error, Result};
use crate::infrastructure::crypto::SessionCipher;

/// `SecretBackend` over session storage plus `SessionCipher`
pub struct WebSessionBackend {
    storage: Arc<dyn SessionStorage>,
    cipher: SessionCipher,
    key_prefix: String,
}

impl WebSessionBackend {
    /// Build a backend whose cipher key lives in the same session storage
    pub fn new(
        storage: Arc<dyn SessionStorage>,
        key_prefix: impl Into<String>,
        cipher_key_name: impl Into<String>,
    ) -> Self {
        let cipher = SessionCipher::new(storage.clone(), cipher_key_name);
        Self {
            storage,
            cipher,
            key_prefix: key_prefix.into(),
        }
    }
}

impl std::fmt::Debug for WebSessionBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSessionBackend")
            .field("key_prefix", &self.key_prefix)
            .field("cipher", &self.cipher)
            .finish()
    }
}

#[async_trait]
impl SecretBackend for WebSessionBackend {
    async fn write(&self, credential: &SecureCredential) -> Result<()> {
        let key = credential.credential_type.storage_key(&self.key_prefix);
        let payload = credential.to_payload()?;
        let blob = self.cipher.encrypt(&payload)?;
        self.storage.set(&key, &blob)
    }

    async fn read(&self, credential_type: CredentialType) -> Result<Option<SecureCredential>> {
        let key = credential_type.storage_key(&self.key_prefix);
        let Some(blob) = self.storage.get(&key)? else {
            return Ok(None);
        };

        let payload = self.cipher.decrypt(&blob).map(Zeroizing::new).ok_or_else(|| {
            Error::DecryptionFailure(format!("Stored {} credential is unreadable", credential_type))
        })?;
        Ok(Some(SecureCredential::from_payload(payload)?))
    }

    async fn remove(&self, credential_type: CredentialType) -> Result<()> {
        let key = credential_type.storage_key(&self.key_prefix);
        self.storage.remove(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::InMemorySessionStorage;

    fn backend() -> (WebSessionBackend, Arc<InMemorySessionStorage>) {
        let storage = Arc::new(InMemorySessionStorage::new());
        (
            WebSessionBackend::new(storage.clone(), "credential", "session_key"),
            storage,
        )
    }

    #[tokio::test]
    async fn test_roundtrip() {
        let (backend, _) = backend();
        let credential = SecureCredential::new(CredentialType::Openai, "sk-abc");
        backend.write(&credential).await.unwrap();

        let read = backend.read(CredentialType::Openai).await.unwrap().unwrap();
        assert_eq!(read.secret.as_str(), "sk-abc");
        assert_eq!(read.stored_at, credential.stored_at);
    }

    #[tokio::test]
    async fn test_stored_value_is_not_plaintext() {
        let (backend, storage) = backend();
        let credential = SecureCredential::new(CredentialType::Openai, "sk-very-secret-value");
        backend.write(&credential).await.unwrap();

        let raw = storage.get("credential_openai").unwrap().unwrap();
        assert!(!raw.contains("sk-very-secret-value"));
        assert!(raw.contains("\"iv\""));
        assert!(storage.get("session_key").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_decryption_failure() {
        let (backend, storage) = backend();
        backend
            .write(&SecureCredential::new(CredentialType::Github, "ghp_x"))
            .await
            .unwrap();
        storage.set("credential_github", "{\"iv\":[0],\"ciphertext\":[1]}").unwrap();

        assert!(matches!(
            backend.read(CredentialType::Github).await,
            Err(Error::DecryptionFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_quota_error_surfaces_from_write() {
        let storage = Arc::new(InMemorySessionStorage::with_quota(80));
        let backend = WebSessionBackend::new(storage, "credential", "session_key");
        let err = backend
            .write(&SecureCredential::new(CredentialType::McpServer, "token"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
