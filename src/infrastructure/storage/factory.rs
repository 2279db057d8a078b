//! Storage factory for runtime backend selection

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::storage::KeyValueStorage;
use crate::domain::DomainError;

use super::file::JsonFileStorage;
use super::in_memory::{InMemoryStorage, InMemoryStorageConfig};
use super::redis::{RedisStorage, RedisStorageConfig};

/// Supported storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageType {
    /// Process-scoped moka map
    InMemory,
    /// Single JSON document on disk
    #[default]
    File,
    /// Redis server
    Redis,
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageType::InMemory => write!(f, "in_memory"),
            StorageType::File => write!(f, "file"),
            StorageType::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for StorageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "in-memory" | "memory" => Ok(StorageType::InMemory),
            "file" | "json" => Ok(StorageType::File),
            "redis" => Ok(StorageType::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown storage type: {}. Valid types: in_memory, file, redis",
                s
            ))),
        }
    }
}

/// Configuration for storage factory
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub storage_type: StorageType,
    /// Document path (file backend)
    pub file_path: PathBuf,
    /// Connection URL (redis backend)
    pub redis_url: Option<String>,
    /// Key prefix (redis backend)
    pub key_prefix: Option<String>,
    /// Entry bound (in-memory backend)
    pub max_capacity: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::File,
            file_path: PathBuf::from(".asin-insights/storage.json"),
            redis_url: None,
            key_prefix: None,
            max_capacity: 10_000,
        }
    }
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self {
            storage_type: StorageType::InMemory,
            ..Default::default()
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            storage_type: StorageType::File,
            file_path: path.into(),
            ..Default::default()
        }
    }

    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            storage_type: StorageType::Redis,
            redis_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

/// Factory for creating storage instances
#[derive(Debug, Default)]
pub struct StorageFactory;

impl StorageFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates a storage backend based on configuration
    pub async fn create(
        &self,
        config: &StorageConfig,
    ) -> Result<Arc<dyn KeyValueStorage>, DomainError> {
        match config.storage_type {
            StorageType::InMemory => Ok(Arc::new(InMemoryStorage::with_config(
                InMemoryStorageConfig::default().with_max_capacity(config.max_capacity),
            ))),
            StorageType::File => Ok(Arc::new(JsonFileStorage::new(config.file_path.clone()))),
            StorageType::Redis => {
                let url = config.redis_url.clone().ok_or_else(|| {
                    DomainError::configuration("Redis URL is required for redis storage")
                })?;

                let mut redis_config = RedisStorageConfig::new(url);
                if let Some(prefix) = &config.key_prefix {
                    redis_config = redis_config.with_key_prefix(prefix.clone());
                }

                Ok(Arc::new(RedisStorage::new(redis_config).await?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_storage_type_from_str() {
        assert_eq!("in_memory".parse::<StorageType>().unwrap(), StorageType::InMemory);
        assert_eq!("memory".parse::<StorageType>().unwrap(), StorageType::InMemory);
        assert_eq!("FILE".parse::<StorageType>().unwrap(), StorageType::File);
        assert_eq!("json".parse::<StorageType>().unwrap(), StorageType::File);
        assert_eq!("redis".parse::<StorageType>().unwrap(), StorageType::Redis);
        assert!("postgres".parse::<StorageType>().is_err());
    }

    #[test]
    fn test_storage_type_display() {
        assert_eq!(StorageType::InMemory.to_string(), "in_memory");
        assert_eq!(StorageType::File.to_string(), "file");
        assert_eq!(StorageType::Redis.to_string(), "redis");
    }

    #[test]
    fn test_storage_config_builders() {
        let config = StorageConfig::redis("redis://localhost:6379").with_key_prefix("asin");
        assert_eq!(config.storage_type, StorageType::Redis);
        assert_eq!(config.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert_eq!(config.key_prefix.as_deref(), Some("asin"));

        let config = StorageConfig::in_memory().with_max_capacity(50);
        assert_eq!(config.max_capacity, 50);
    }

    #[tokio::test]
    async fn test_factory_create_in_memory() {
        let storage = StorageFactory::new()
            .create(&StorageConfig::in_memory())
            .await
            .unwrap();

        storage
            .set(std::collections::HashMap::from([("k".to_string(), json!(1))]))
            .await
            .unwrap();
        assert_eq!(storage.get_one("k").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_factory_create_redis_missing_url() {
        let config = StorageConfig {
            storage_type: StorageType::Redis,
            redis_url: None,
            ..Default::default()
        };

        let result = StorageFactory::new().create(&config).await;
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
