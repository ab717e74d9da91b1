//! OS keystore integration
//!
//! Stores credential payloads in the operating system's credential store
//! (macOS Keychain, Windows Credential Manager, Linux Secret Service).

use async_trait::async_trait;
use keyring::Entry;
use std::collections::HashMap;
use std::sync::Mutex;
use zeroize::Zeroizing;

use crate::domain::credential::SecureKeystore;
use crate::error::{Error, Result};

/// Default service name for keyring entries
pub const DEFAULT_KEYRING_SERVICE: &str = "keyvault";

/// OS keyring-backed keystore
///
/// One keyring entry per storage key, all under a single service name.
/// Keyring calls block, so each runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct KeyringKeystore {
    service: String,
}

impl Default for KeyringKeystore {
    fn default() -> Self {
        Self::new(DEFAULT_KEYRING_SERVICE)
    }
}

impl KeyringKeystore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key)
            .map_err(|e| Error::storage(format!("Failed to create keyring entry: {}", e)))
    }
}

#[async_trait]
impl SecureKeystore for KeyringKeystore {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let entry = self.entry(key)?;
        let value = Zeroizing::new(value.to_string());

        tokio::task::spawn_blocking(move || {
            entry
                .set_password(&value)
                .map_err(|e| Error::storage(format!("Failed to store credential: {}", e)))
        })
        .await
        .map_err(|e| Error::storage(format!("Task join error: {}", e)))?
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = self.entry(key)?;

        let result = tokio::task::spawn_blocking(move || entry.get_password())
            .await
            .map_err(|e| Error::storage(format!("Task join error: {}", e)))?;

        match result {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(Error::storage(format!(
                "Failed to retrieve credential: {}",
                e
            ))),
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let entry = self.entry(key)?;

        tokio::task::spawn_blocking(move || match entry.delete_password() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(Error::storage(format!(
                "Failed to delete credential: {}",
                e
            ))),
        })
        .await
        .map_err(|e| Error::storage(format!("Task join error: {}", e)))?
    }
}

/// In-memory keystore for testing
///
/// Holds values in memory only. It should NOT be used in production.
#[derive(Debug, Default)]
pub struct InMemoryKeystore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryKeystore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value, bypassing the trait (for inspecting payloads in tests)
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }
}

#[async_trait]
impl SecureKeystore for InMemoryKeystore {
    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| Error::storage("Lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .lock()
            .map_err(|_| Error::storage("Lock poisoned"))?
            .get(key)
            .cloned())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| Error::storage("Lock poisoned"))?
            .remove(key);
        Ok(())
    }
}
