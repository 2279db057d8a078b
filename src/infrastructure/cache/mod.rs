//! Cache infrastructure - TTL store and factory

mod factory;
mod kv_store;

pub use factory::{CacheConfig, CacheFactory, KeyScheme};
pub use kv_store::KeyValueCacheStore;
