//! Async key/value storage port
//!
//! Persistence only happens during setup/teardown and explicit saves, never
//! mid-tick, so the port is async while the simulation stays synchronous.

use std::collections::BTreeMap;

use crate::error::StorageError;

/// Key/value persistence backend.
///
/// Values are opaque strings (JSON in practice). Failures propagate to the
/// caller; in-memory simulation state is never rolled back on failure.
#[allow(async_fn_in_trait)]
pub trait Storage {
    async fn save(&mut self, key: &str, data: String) -> Result<(), StorageError>;
    async fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;
    /// Returns `true` if a value was removed
    async fn remove(&mut self, key: &str) -> Result<bool, StorageError>;
    /// All keys, in a stable order
    async fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// In-process storage backed by an ordered map.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
    /// When set, every write fails (used to exercise error propagation)
    pub fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_writable(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Backend {
                key: key.to_string(),
                reason: "writes disabled".to_string(),
            });
        }
        Ok(())
    }
}

impl Storage for MemoryStorage {
    async fn save(&mut self, key: &str, data: String) -> Result<(), StorageError> {
        self.check_writable(key)?;
        self.entries.insert(key.to_string(), data);
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.entries.contains_key(key))
    }

    async fn remove(&mut self, key: &str) -> Result<bool, StorageError> {
        self.check_writable(key)?;
        Ok(self.entries.remove(key).is_some())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_load_remove() {
        let mut storage = MemoryStorage::new();
        storage.save("a", "1".into()).await.unwrap();
        storage.save("b", "2".into()).await.unwrap();

        assert_eq!(storage.load("a").await.unwrap().as_deref(), Some("1"));
        assert!(storage.exists("b").await.unwrap());
        assert_eq!(storage.keys().await.unwrap(), vec!["a", "b"]);

        assert!(storage.remove("a").await.unwrap());
        assert!(!storage.remove("a").await.unwrap());
        assert_eq!(storage.load("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn failing_writes_propagate() {
        let mut storage = MemoryStorage::new();
        storage.fail_writes = true;
        let err = storage.save("k", "v".into()).await.unwrap_err();
        assert!(matches!(err, StorageError::Backend { .. }));
        assert!(storage.is_empty());
    }
}
