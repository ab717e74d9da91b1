//! Session-scoped AES-256-GCM cipher for the web fallback
//!
//! The key is generated on first use and exported (hex) into session storage,
//! so it survives reloads within a session and disappears with it. Anything
//! encrypted under it becomes permanently unreadable once the session ends.
//!
//! This is obfuscation, not a hard boundary: the key sits in the same storage
//! as the ciphertext it protects.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::domain::credential::SessionStorage;
use crate::error::{Error, Result};

/// Size of AES-256 key in bytes
const AES_KEY_SIZE: usize = 32;

/// Size of AES-GCM nonce in bytes
const NONCE_SIZE: usize = 12;

/// Session cipher key, zeroed on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKey {
    bytes: [u8; AES_KEY_SIZE],
}

impl SessionKey {
    /// Generate a new random key
    pub fn generate() -> Self {
        let key = Aes256Gcm::generate_key(OsRng);
        let mut bytes = [0u8; AES_KEY_SIZE];
        bytes.copy_from_slice(&key);
        Self { bytes }
    }

    /// Import a key exported with `to_hex`
    pub fn from_hex(hex: &str) -> Result<Self> {
        let decoded = hex::decode(hex.trim())
            .map_err(|e| Error::DecryptionFailure(format!("Invalid session key encoding: {}", e)))?;
        if decoded.len() != AES_KEY_SIZE {
            return Err(Error::DecryptionFailure(format!(
                "Invalid session key length: expected {}, got {}",
                AES_KEY_SIZE,
                decoded.len()
            )));
        }
        let mut bytes = [0u8; AES_KEY_SIZE];
        bytes.copy_from_slice(&decoded);
        Ok(Self { bytes })
    }

    /// Export for persistence in session storage
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    fn cipher(&self) -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.bytes)
            .map_err(|e| Error::DecryptionFailure(e.to_string()))
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Wire shape of an encrypted payload
///
/// Both fields serialize as JSON arrays of numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedBlob {
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

/// AES-256-GCM cipher whose key lives in session storage
pub struct SessionCipher {
    storage: Arc<dyn SessionStorage>,
    key_name: String,
    /// Serializes load-or-create so concurrent first uses agree on one key
    key_guard: Mutex<()>,
}

impl std::fmt::Debug for SessionCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCipher")
            .field("key_name", &self.key_name)
            .finish()
    }
}

impl SessionCipher {
    pub fn new(storage: Arc<dyn SessionStorage>, key_name: impl Into<String>) -> Self {
        Self {
            storage,
            key_name: key_name.into(),
            key_guard: Mutex::new(()),
        }
    }

    /// Name of the session storage entry holding the exported key
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// Load the session key, generating and persisting one if none exists
    fn load_or_create_key(&self) -> Result<SessionKey> {
        let _guard = self
            .key_guard
            .lock()
            .map_err(|_| Error::storage("Session key lock poisoned"))?;

        if let Some(exported) = self.storage.get(&self.key_name)? {
            match SessionKey::from_hex(&exported) {
                Ok(key) => return Ok(key),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unreadable session key");
                }
            }
        }

        let key = SessionKey::generate();
        self.storage.set(&self.key_name, &key.to_hex())?;
        tracing::debug!("Generated new session cipher key");
        Ok(key)
    }

    /// Load the session key without creating one
    fn existing_key(&self) -> Result<Option<SessionKey>> {
        self.storage
            .get(&self.key_name)?
            .map(|exported| SessionKey::from_hex(&exported))
            .transpose()
    }

    /// Encrypt a plaintext into an opaque JSON blob with a fresh 96-bit IV
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let key = self.load_or_create_key()?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = key
            .cipher()?
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| Error::storage("Encryption failed"))?;

        let blob = EncryptedBlob {
            iv: nonce.to_vec(),
            ciphertext,
        };
        Ok(serde_json::to_string(&blob)?)
    }

    /// Decrypt a blob produced by `encrypt`
    ///
    /// Every failure (malformed blob, missing or different key, tampering)
    /// yields `None`.
    pub fn decrypt(&self, blob: &str) -> Option<String> {
        match self.try_decrypt(blob) {
            Ok(plaintext) => Some(plaintext),
            Err(e) => {
                tracing::debug!(code = e.code(), "Session blob could not be decrypted");
                None
            }
        }
    }

    fn try_decrypt(&self, blob: &str) -> Result<String> {
        let blob: EncryptedBlob = serde_json::from_str(blob)
            .map_err(|e| Error::DecryptionFailure(format!("Malformed blob: {}", e)))?;

        if blob.iv.len() != NONCE_SIZE {
            return Err(Error::DecryptionFailure(format!(
                "Invalid IV length: expected {}, got {}",
                NONCE_SIZE,
                blob.iv.len()
            )));
        }

        let key = self
            .existing_key()?
            .ok_or_else(|| Error::DecryptionFailure("No session key".to_string()))?;

        let plaintext = key
            .cipher()?
            .decrypt(Nonce::from_slice(&blob.iv), blob.ciphertext.as_ref())
            .map_err(|_| {
                Error::DecryptionFailure("invalid key or corrupted data".to_string())
            })?;

        String::from_utf8(plaintext)
            .map_err(|e| Error::DecryptionFailure(format!("Invalid UTF-8: {}", e)))
    }
}
