//! Redis key-value storage implementation

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde_json::Value;
use tracing::warn;

use crate::domain::storage::KeyValueStorage;
use crate::domain::DomainError;

/// Configuration for Redis storage
#[derive(Debug, Clone)]
pub struct RedisStorageConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Key prefix for namespacing, joined with ':'
    pub key_prefix: Option<String>,
}

impl Default for RedisStorageConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: None,
        }
    }
}

impl RedisStorageConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    fn prefix_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    fn strip_prefix<'a>(&self, key: &'a str) -> &'a str {
        match &self.key_prefix {
            Some(prefix) => key
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .unwrap_or(key),
            None => key,
        }
    }
}

/// Escapes glob metacharacters so a literal prefix can be used with MATCH
fn escape_glob(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for c in literal.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Storage shared across processes through a Redis server.
///
/// Values are stored as JSON strings; unparseable values read as absent.
#[derive(Clone)]
pub struct RedisStorage {
    connection: ConnectionManager,
    config: RedisStorageConfig,
}

impl fmt::Debug for RedisStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStorage")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisStorage {
    pub async fn new(config: RedisStorageConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str()).map_err(|e| {
            DomainError::cache_unavailable(format!("Failed to create Redis client: {}", e))
        })?;

        let connection = ConnectionManager::new(client).await.map_err(|e| {
            DomainError::cache_unavailable(format!("Failed to connect to Redis: {}", e))
        })?;

        Ok(Self { connection, config })
    }
}

#[async_trait]
impl KeyValueStorage for RedisStorage {
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, Value>, DomainError> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let prefixed: Vec<String> = keys.iter().map(|k| self.config.prefix_key(k)).collect();
        let mut conn = self.connection.clone();

        let raw: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&prefixed)
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::cache_unavailable(format!("Failed to read keys: {}", e)))?;

        let mut found = HashMap::with_capacity(keys.len());
        for (key, value) in keys.iter().zip(raw) {
            let Some(text) = value else { continue };
            match serde_json::from_str(&text) {
                Ok(parsed) => {
                    found.insert(key.clone(), parsed);
                }
                Err(e) => warn!(key = %key, error = %e, "Skipping non-JSON value"),
            }
        }

        Ok(found)
    }

    async fn set(&self, items: HashMap<String, Value>) -> Result<(), DomainError> {
        if items.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        for (key, value) in &items {
            pipe.set(self.config.prefix_key(key), value.to_string()).ignore();
        }

        let mut conn = self.connection.clone();
        pipe.query_async::<()>(&mut conn)
            .await
            .map_err(|e| DomainError::cache_unavailable(format!("Failed to write keys: {}", e)))
    }

    async fn remove(&self, keys: &[String]) -> Result<(), DomainError> {
        if keys.is_empty() {
            return Ok(());
        }

        let prefixed: Vec<String> = keys.iter().map(|k| self.config.prefix_key(k)).collect();
        let mut conn = self.connection.clone();

        let _: i64 = conn.del(&prefixed).await.map_err(|e| {
            DomainError::cache_unavailable(format!("Failed to delete keys: {}", e))
        })?;

        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, DomainError> {
        let pattern = format!("{}*", escape_glob(&self.config.prefix_key(prefix)));
        let mut conn = self.connection.clone();

        // SCAN rather than KEYS to avoid blocking the server
        let mut cursor = 0u64;
        let mut found = Vec::new();

        loop {
            let (new_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(|e| {
                    DomainError::cache_unavailable(format!(
                        "Failed to scan keys with prefix '{}': {}",
                        prefix, e
                    ))
                })?;

            found.extend(keys.iter().map(|k| self.config.strip_prefix(k).to_string()));
            cursor = new_cursor;

            if cursor == 0 {
                break;
            }
        }

        found.sort();
        found.dedup();
        Ok(found)
    }
}
