//! Cache store backed by any key-value storage

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::cache::{CACHE_PREFIX, CACHE_TTL, CacheEntry, CacheHit, CacheStore, Clock};
use crate::domain::storage::KeyValueStorage;
use crate::domain::DomainError;

/// TTL cache over a [`KeyValueStorage`].
///
/// Timestamps come from the injected clock at write time. Expired entries are
/// removed lazily on read and in bulk by [`CacheStore::sweep_expired`].
#[derive(Debug, Clone)]
pub struct KeyValueCacheStore {
    storage: Arc<dyn KeyValueStorage>,
    clock: Arc<dyn Clock>,
    namespace: String,
    ttl: Duration,
}

impl KeyValueCacheStore {
    /// Creates a store over the default `api_cache_` namespace
    pub fn new(storage: Arc<dyn KeyValueStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            namespace: CACHE_PREFIX.to_string(),
            ttl: CACHE_TTL,
        }
    }

    /// Scopes sweeps to a different key prefix
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

#[async_trait]
impl CacheStore for KeyValueCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheHit>, DomainError> {
        let Some(stored) = self.storage.get_one(key).await? else {
            return Ok(None);
        };

        let now = self.clock.now_millis();

        match CacheEntry::from_stored(key, stored) {
            Some(entry) if !entry.is_expired(now, self.ttl) => Ok(Some(CacheHit {
                age_hours: entry.age_hours(now),
                stored_at_ms: entry.stored_at_ms,
                payload: entry.payload,
            })),
            Some(_) => {
                debug!(key, "Cache entry expired, removing");
                self.delete(key).await?;
                Ok(None)
            }
            None => {
                warn!(key, "Unreadable cache entry, removing");
                self.delete(key).await?;
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, payload: Value) -> Result<(), DomainError> {
        let entry = CacheEntry::new(key, payload, self.clock.now_millis());
        let value = serde_json::to_value(&entry).map_err(|e| {
            DomainError::internal(format!("Failed to serialize cache entry: {}", e))
        })?;

        self.storage
            .set(HashMap::from([(key.to_string(), value)]))
            .await
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        self.storage.remove(&[key.to_string()]).await
    }

    async fn sweep_expired(&self) -> Result<usize, DomainError> {
        let keys = self.storage.keys_with_prefix(&self.namespace).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let now = self.clock.now_millis();
        let stored = self.storage.get(&keys).await?;

        let to_delete: Vec<String> = stored
            .into_iter()
            .filter_map(|(key, value)| match CacheEntry::from_stored(&key, value) {
                Some(entry) if !entry.is_expired(now, self.ttl) => None,
                _ => Some(key),
            })
            .collect();

        if to_delete.is_empty() {
            return Ok(0);
        }

        self.storage.remove(&to_delete).await?;
        info!("Cleaned {} expired cache entries", to_delete.len());

        Ok(to_delete.len())
    }
}
