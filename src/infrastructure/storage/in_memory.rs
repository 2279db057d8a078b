//! In-memory key-value storage using moka

use std::collections::HashMap;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use serde_json::Value;

use crate::domain::storage::KeyValueStorage;
use crate::domain::DomainError;

/// Configuration for in-memory storage
#[derive(Debug, Clone)]
pub struct InMemoryStorageConfig {
    /// Maximum number of entries before the least useful ones are evicted
    pub max_capacity: u64,
}

impl Default for InMemoryStorageConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

impl InMemoryStorageConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

/// Process-scoped key-value storage.
///
/// Created at startup, never persisted, gone on restart. Expiry is decided by
/// the cache store above it; moka only enforces the capacity bound.
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    entries: MokaCache<String, Value>,
    config: InMemoryStorageConfig,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::with_config(InMemoryStorageConfig::default())
    }

    pub fn with_config(config: InMemoryStorageConfig) -> Self {
        Self {
            entries: MokaCache::builder().max_capacity(config.max_capacity).build(),
            config,
        }
    }

    pub fn config(&self) -> &InMemoryStorageConfig {
        &self.config
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStorage for InMemoryStorage {
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, Value>, DomainError> {
        let mut found = HashMap::with_capacity(keys.len());

        for key in keys {
            if let Some(value) = self.entries.get(key).await {
                found.insert(key.clone(), value);
            }
        }

        Ok(found)
    }

    async fn set(&self, items: HashMap<String, Value>) -> Result<(), DomainError> {
        for (key, value) in items {
            self.entries.insert(key, value).await;
        }
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<(), DomainError> {
        for key in keys {
            self.entries.invalidate(key).await;
        }
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, DomainError> {
        self.entries.run_pending_tasks().await;

        let entries = self.entries.clone();
        let prefix = prefix.to_string();

        tokio::task::spawn_blocking(move || {
            entries
                .iter()
                .filter_map(|(k, _)| {
                    let key_str: &str = k.as_ref();
                    key_str.starts_with(&prefix).then(|| key_str.to_string())
                })
                .collect()
        })
        .await
        .map_err(|e| DomainError::internal(format!("Failed to iterate storage: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let storage = InMemoryStorage::new();
        storage
            .set(items(&[("a", json!({"x": 1})), ("b", json!([1, 2]))]))
            .await
            .unwrap();

        let found = storage
            .get(&["a".to_string(), "b".to_string(), "c".to_string()])
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found["a"], json!({"x": 1}));
        assert_eq!(found["b"], json!([1, 2]));
    }

    #[tokio::test]
    async fn test_remove() {
        let storage = InMemoryStorage::new();
        storage.set(items(&[("a", json!(1))])).await.unwrap();

        storage.remove(&["a".to_string(), "missing".to_string()]).await.unwrap();

        assert_eq!(storage.get_one("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_with_prefix() {
        let storage = InMemoryStorage::new();
        storage
            .set(items(&[
                ("api_cache_one", json!(1)),
                ("api_cache_two", json!(2)),
                ("flowASIN", json!("B0")),
            ]))
            .await
            .unwrap();

        let mut keys = storage.keys_with_prefix("api_cache_").await.unwrap();
        keys.sort();

        assert_eq!(keys, vec!["api_cache_one", "api_cache_two"]);
    }

    #[tokio::test]
    async fn test_config() {
        let storage =
            InMemoryStorage::with_config(InMemoryStorageConfig::default().with_max_capacity(5));
        assert_eq!(storage.config().max_capacity, 5);
    }
}
