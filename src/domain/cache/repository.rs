//! Cache store trait definition

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::DomainError;

/// Fixed time-to-live for every cache entry
pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const MILLIS_PER_HOUR: f64 = 60.0 * 60.0 * 1000.0;

/// A persisted cache entry.
///
/// Serialized as `{ "data": <payload>, "timestamp": <epoch ms> }`; the key is
/// the storage key, not part of the value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(skip)]
    pub key: String,
    #[serde(rename = "data")]
    pub payload: Value,
    #[serde(rename = "timestamp")]
    pub stored_at_ms: i64,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, payload: Value, stored_at_ms: i64) -> Self {
        Self {
            key: key.into(),
            payload,
            stored_at_ms,
        }
    }

    /// Parses a stored value. `None` means the value is not a readable entry.
    pub fn from_stored(key: &str, value: Value) -> Option<Self> {
        let mut entry: CacheEntry = serde_json::from_value(value).ok()?;
        if entry.stored_at_ms <= 0 {
            return None;
        }
        entry.key = key.to_string();
        Some(entry)
    }

    pub fn age_millis(&self, now_millis: i64) -> i64 {
        now_millis - self.stored_at_ms
    }

    pub fn is_expired(&self, now_millis: i64, ttl: Duration) -> bool {
        self.age_millis(now_millis) > ttl.as_millis() as i64
    }

    pub fn age_hours(&self, now_millis: i64) -> f64 {
        self.age_millis(now_millis).max(0) as f64 / MILLIS_PER_HOUR
    }
}

/// Result of a fresh cache lookup
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit {
    pub payload: Value,
    pub stored_at_ms: i64,
    pub age_hours: f64,
}

/// Asynchronous key-value cache with fixed TTL expiry.
///
/// A store is scoped to one key namespace. Reads of expired entries delete
/// them before reporting a miss. Storage failures surface as
/// `DomainError::CacheUnavailable`.
#[async_trait]
pub trait CacheStore: Send + Sync + Debug {
    /// Returns the payload if present and not older than the TTL
    async fn get(&self, key: &str) -> Result<Option<CacheHit>, DomainError>;

    /// Overwrites the entry, stamping it with the current time
    async fn set(&self, key: &str, payload: Value) -> Result<(), DomainError>;

    /// Removes the entry; removing a missing key is not an error
    async fn delete(&self, key: &str) -> Result<(), DomainError>;

    /// Deletes every expired entry in the namespace, returning how many went
    async fn sweep_expired(&self) -> Result<usize, DomainError>;
}
