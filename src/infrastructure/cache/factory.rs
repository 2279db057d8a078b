//! Cache factory for runtime selection

use std::sync::Arc;

use crate::domain::cache::{
    CACHE_PREFIX, CacheKeyGenerator, CacheStore, CanonicalKeyGenerator, Clock, LegacyKeyGenerator,
};
use crate::domain::storage::KeyValueStorage;
use crate::domain::DomainError;
use crate::infrastructure::storage::{StorageConfig, StorageFactory};

use super::kv_store::KeyValueCacheStore;

/// Supported cache key schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyScheme {
    /// Sorted-key JSON hashed with SHA-256
    #[default]
    Canonical,
    /// 32-bit rolling hash, compatible with keys written by the browser extension
    Legacy,
}

impl std::fmt::Display for KeyScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyScheme::Canonical => write!(f, "canonical"),
            KeyScheme::Legacy => write!(f, "legacy"),
        }
    }
}

impl std::str::FromStr for KeyScheme {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "canonical" | "sha256" => Ok(KeyScheme::Canonical),
            "legacy" => Ok(KeyScheme::Legacy),
            _ => Err(DomainError::configuration(format!(
                "Unknown key scheme: {}. Valid schemes: canonical, legacy",
                s
            ))),
        }
    }
}

/// Configuration for cache factory
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub storage: StorageConfig,
    pub key_scheme: KeyScheme,
    /// Key prefix scanned by sweeps
    pub namespace: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            key_scheme: KeyScheme::default(),
            namespace: CACHE_PREFIX.to_string(),
        }
    }
}

impl CacheConfig {
    pub fn new(storage: StorageConfig) -> Self {
        Self {
            storage,
            ..Default::default()
        }
    }

    pub fn with_key_scheme(mut self, scheme: KeyScheme) -> Self {
        self.key_scheme = scheme;
        self
    }
}

/// Factory for creating cache stores and key generators
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates a cache store over the configured storage backend
    pub async fn create(
        &self,
        config: &CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Arc<dyn CacheStore>, DomainError> {
        let storage = StorageFactory::new().create(&config.storage).await?;
        Ok(self.with_storage(config, storage, clock))
    }

    /// Creates a cache store over an already opened backend
    pub fn with_storage(
        &self,
        config: &CacheConfig,
        storage: Arc<dyn KeyValueStorage>,
        clock: Arc<dyn Clock>,
    ) -> Arc<dyn CacheStore> {
        Arc::new(KeyValueCacheStore::new(storage, clock).with_namespace(&config.namespace))
    }

    /// Returns the key generator for the configured scheme
    pub fn key_generator(&self, scheme: KeyScheme) -> Arc<dyn CacheKeyGenerator> {
        match scheme {
            KeyScheme::Canonical => Arc::new(CanonicalKeyGenerator),
            KeyScheme::Legacy => Arc::new(LegacyKeyGenerator),
        }
    }
}
