//! JSON file key-value storage

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::storage::KeyValueStorage;
use crate::domain::DomainError;

/// Key-value storage persisted as a single JSON object on disk.
///
/// The file is read on first access and rewritten on every mutation via a
/// temporary sibling file and a rename, so a crash never leaves a torn file.
/// A missing file is an empty store.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    state: Mutex<Option<Map<String, Value>>>,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Map<String, Value>, DomainError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Storage file not found, starting empty");
                return Ok(Map::new());
            }
            Err(e) => {
                return Err(DomainError::cache_unavailable(format!(
                    "Failed to read '{}': {}",
                    self.path.display(),
                    e
                )));
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(DomainError::cache_unavailable(format!(
                "Storage file '{}' does not contain a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(DomainError::cache_unavailable(format!(
                "Failed to parse '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn persist(&self, map: &Map<String, Value>) -> Result<(), DomainError> {
        let bytes = serde_json::to_vec(map)
            .map_err(|e| DomainError::internal(format!("Failed to serialize storage: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    DomainError::cache_unavailable(format!(
                        "Failed to create '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await.map_err(|e| {
            DomainError::cache_unavailable(format!("Failed to write '{}': {}", tmp.display(), e))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            DomainError::cache_unavailable(format!(
                "Failed to replace '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    async fn loaded<'a>(
        &self,
        slot: &'a mut Option<Map<String, Value>>,
    ) -> Result<&'a mut Map<String, Value>, DomainError> {
        if slot.is_none() {
            *slot = Some(self.load().await?);
        }
        slot.as_mut().ok_or_else(|| DomainError::internal("Storage state not loaded"))
    }

    async fn read<T>(&self, f: impl FnOnce(&Map<String, Value>) -> T) -> Result<T, DomainError> {
        let mut guard = self.state.lock().await;
        let map = self.loaded(&mut guard).await?;
        Ok(f(map))
    }

    /// Applies `f` to a copy of the map. The copy replaces the loaded map
    /// only after it reached the disk, so a failed write changes nothing.
    async fn update(
        &self,
        f: impl FnOnce(&mut Map<String, Value>) -> bool,
    ) -> Result<(), DomainError> {
        let mut guard = self.state.lock().await;
        let mut next = self.loaded(&mut guard).await?.clone();

        if f(&mut next) {
            self.persist(&next).await?;
            *guard = Some(next);
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStorage for JsonFileStorage {
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, Value>, DomainError> {
        self.read(|map| {
            keys.iter()
                .filter_map(|k| map.get(k).map(|v| (k.clone(), v.clone())))
                .collect()
        })
        .await
    }

    async fn set(&self, items: HashMap<String, Value>) -> Result<(), DomainError> {
        if items.is_empty() {
            return Ok(());
        }
        self.update(|map| {
            map.extend(items);
            true
        })
        .await
    }

    async fn remove(&self, keys: &[String]) -> Result<(), DomainError> {
        self.update(|map| {
            let removed = keys.iter().filter(|k| map.remove(k.as_str()).is_some()).count();
            removed > 0
        })
        .await
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, DomainError> {
        self.read(|map| map.keys().filter(|k| k.starts_with(prefix)).cloned().collect())
            .await
    }
}
