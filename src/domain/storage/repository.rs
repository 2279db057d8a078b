//! Key-value storage trait definition

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::DomainError;

/// Persistent key-value storage holding JSON values.
///
/// Mirrors a browser-extension style store: batched reads, writes and removals
/// plus a namespace listing used by cache sweeps. Implementations must be safe
/// for concurrent use on independent keys; no cross-key atomicity is implied.
#[async_trait]
pub trait KeyValueStorage: Send + Sync + Debug {
    /// Reads the given keys. Absent keys are simply missing from the result.
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, Value>, DomainError>;

    /// Writes every entry, replacing existing values
    async fn set(&self, items: HashMap<String, Value>) -> Result<(), DomainError>;

    /// Removes the given keys. Missing keys are ignored.
    async fn remove(&self, keys: &[String]) -> Result<(), DomainError>;

    /// Lists every key starting with `prefix`
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, DomainError>;

    /// Reads a single key
    async fn get_one(&self, key: &str) -> Result<Option<Value>, DomainError> {
        let mut found = self.get(&[key.to_string()]).await?;
        Ok(found.remove(key))
    }
}
