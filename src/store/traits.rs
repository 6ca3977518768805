//! `KeyValueStore` trait: the single async interface for all persistence.

use async_trait::async_trait;

use crate::error::StorageError;

/// Durable, process-wide, string-keyed store.
///
/// Operations may be issued concurrently. A `set` followed by a `get` on the
/// same key from the same caller must observe the write.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace a value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
