//! The on-device key-value store used when the API is not available.
//!
//! Values are whole JSON documents that are read and written in one piece. `FileStore` keeps one
//! file per key in `$SUBTRACK_HOME/store/`; `MemoryStore` keeps them in memory for tests.

mod subscriptions;

pub use subscriptions::{is_local_id, SubscriptionStore, LOCAL_ID_PREFIX, SUBSCRIPTIONS_KEY};

use crate::error::Res;
use crate::utils;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::trace;

/// A persistent store of string values by key.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` if nothing has been stored under `key`.
    async fn get(&self, key: &str) -> Res<Option<String>>;

    /// Replaces the value stored under `key`.
    async fn set(&self, key: &str, value: &str) -> Res<()>;
}

/// Stores each key as `<key>.json` in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> Res<PathBuf> {
        anyhow::ensure!(
            !key.is_empty() && !key.contains(['/', '\\']) && key != "." && key != "..",
            "Invalid store key '{key}'"
        );
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Res<Option<String>> {
        let path = self.path(key)?;
        trace!("Reading store key {key} from {}", path.display());
        utils::read_if_exists(&path).await
    }

    async fn set(&self, key: &str, value: &str) -> Res<()> {
        let path = self.path(key)?;
        trace!("Writing store key {key} to {}", path.display());
        utils::write_replace(&path, value).await
    }
}

/// Keeps values in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Res<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("The memory store lock is poisoned"))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Res<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("The memory store lock is poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("a.b.v1").await.unwrap(), None);
        store.set("a.b.v1", "[1,2]").await.unwrap();
        assert_eq!(store.get("a.b.v1").await.unwrap().as_deref(), Some("[1,2]"));
        assert!(dir.path().join("a.b.v1.json").is_file());
    }

    #[tokio::test]
    async fn test_file_store_rejects_paths() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.set("../escape", "x").await.is_err());
        assert!(store.get("").await.is_err());
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::default();
        assert_eq!(store.get("k").await.unwrap(), None);
        store.set("k", "v").await.unwrap();
        store.set("k", "w").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("w"));
    }
}
