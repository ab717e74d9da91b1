//! In-process session storage
//!
//! Stands in for browser `sessionStorage`: its contents live exactly as long
//! as the process (the session) and are gone afterwards.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::credential::SessionStorage;
use crate::error::{Error, Result};

/// Session-scoped key/value store with an optional byte quota
#[derive(Debug, Default)]
pub struct InMemorySessionStorage {
    data: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total size of keys plus values, like a browser origin quota
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Drop everything, as the browser does when the session ends
    pub fn clear(&self) -> Result<()> {
        self.data
            .write()
            .map_err(|_| Error::storage("Lock poisoned"))?
            .clear();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.read().map(|data| data.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for InMemorySessionStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let data = self
            .data
            .read()
            .map_err(|_| Error::storage("Lock poisoned"))?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self
            .data
            .write()
            .map_err(|_| Error::storage("Lock poisoned"))?;

        if let Some(quota) = self.quota_bytes {
            let used: usize = data
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > quota {
                return Err(Error::storage(format!(
                    "Session storage quota exceeded ({} bytes)",
                    quota
                )));
            }
        }

        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.data
            .write()
            .map_err(|_| Error::storage("Lock poisoned"))?
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = InMemorySessionStorage::new();
        assert!(storage.get("a").unwrap().is_none());

        storage.set("a", "1").unwrap();
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("1"));

        storage.remove("a").unwrap();
        assert!(storage.get("a").unwrap().is_none());
        // removing again is fine
        storage.remove("a").unwrap();
    }

    #[test]
    fn test_quota_exceeded() {
        let storage = InMemorySessionStorage::with_quota(10);
        storage.set("k", "12345").unwrap();

        let err = storage.set("other", "123456").unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
        assert!(storage.get("other").unwrap().is_none());
    }

    #[test]
    fn test_quota_counts_replacement_not_addition() {
        let storage = InMemorySessionStorage::with_quota(10);
        storage.set("k", "123456789").unwrap();
        storage.set("k", "987654321").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("987654321"));
    }

    #[test]
    fn test_clear() {
        let storage = InMemorySessionStorage::new();
        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();
        assert_eq!(storage.len(), 2);

        storage.clear().unwrap();
        assert!(storage.is_empty());
    }
}
