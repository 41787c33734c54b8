//! Core trait for key-value persistence.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::StorageError;

/// String key-value store provided by the host application.
///
/// Implementations are expected to be fast and local. Read-then-write
/// sequences built on top of this trait are not transactional.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}

/// Read and parse a JSON record.
///
/// Missing keys are `Ok(None)`; unparsable values are
/// [`StorageError::Corrupt`].
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

/// Serialize and write a JSON record.
pub async fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, raw).await
}
