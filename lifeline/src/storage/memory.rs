//! In-memory key-value store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::RwLock;

use super::traits::KeyValueStore;
use crate::types::StorageError;

/// In-memory store.
///
/// Can be switched unavailable to exercise storage failure paths, or
/// made to fail reads only.
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    available: AtomicBool,
    readable: AtomicBool,
    write_count: AtomicU32,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            readable: AtomicBool::new(true),
            write_count: AtomicU32::new(0),
        }
    }

    /// Set availability.
    pub fn with_available(self, available: bool) -> Self {
        self.available.store(available, Ordering::SeqCst);
        self
    }

    /// Toggle availability after construction.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Toggle whether reads succeed; writes are unaffected.
    pub fn set_readable(&self, readable: bool) {
        self.readable.store(readable, Ordering::SeqCst);
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> u32 {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Seed a raw value, bypassing availability.
    pub async fn insert_raw(&self, key: &str, value: impl Into<String>) {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.into());
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Backend("memory store disabled".to_string()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        if !self.readable.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("memory store reads disabled".to_string()));
        }
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.check_available()?;
        self.entries.write().await.insert(key.to_string(), value);
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{read_json, write_json};

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let store = MemoryStore::new().with_available(false);
        assert!(matches!(store.get("k").await, Err(StorageError::Backend(_))));
        assert!(store.set("k", "v".to_string()).await.is_err());
    }

    #[tokio::test]
    async fn test_unreadable_still_writes() {
        let store = MemoryStore::new();
        store.set_readable(false);
        assert!(store.get("k").await.is_err());
        store.set("k", "v".to_string()).await.unwrap();

        store.set_readable(true);
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_json_helpers() {
        let store = MemoryStore::new();
        write_json(&store, "nums", &vec![1, 2, 3]).await.unwrap();
        let nums: Option<Vec<i32>> = read_json(&store, "nums").await.unwrap();
        assert_eq!(nums, Some(vec![1, 2, 3]));

        store.insert_raw("bad", "{not json").await;
        let bad: Result<Option<Vec<i32>>, _> = read_json(&store, "bad").await;
        assert!(matches!(bad, Err(StorageError::Corrupt { ref key, .. }) if key == "bad"));
    }
}
