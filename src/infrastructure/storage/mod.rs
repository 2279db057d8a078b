//! Storage infrastructure - key-value storage backends

mod factory;
mod file;
mod in_memory;
mod redis;

pub use factory::{StorageConfig, StorageFactory, StorageType};
pub use file::JsonFileStorage;
pub use in_memory::{InMemoryStorage, InMemoryStorageConfig};
pub use redis::{RedisStorage, RedisStorageConfig};
