//! Key/value persistence behind the token store and login sessions.
//!
//! The trait keeps the storage surface to a minimal get/set/delete so the
//! token store and session manager are testable without touching the real
//! filesystem. `FileStore` is the durable per-client store (one JSON file
//! per key under the local data directory); `MemoryStore` backs the
//! short-lived per-session storage and the test suites.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use crate::error::SpotifyError;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, SpotifyError>> + Send;
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), SpotifyError>> + Send;
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), SpotifyError>> + Send;
}

/// Durable store writing one file per key below
/// `<data_local_dir>/swiplist/<namespace>/`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(namespace: &str) -> Self {
        let mut root = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        root.push("swiplist");
        root.push(namespace);
        FileStore { root }
    }

    /// Store rooted at an explicit directory, for tests and embedding.
    pub fn with_root(root: PathBuf) -> Self {
        FileStore { root }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SpotifyError> {
        match async_fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SpotifyError::Storage(e.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SpotifyError> {
        async_fs::create_dir_all(&self.root)
            .await
            .map_err(|e| SpotifyError::Storage(e.to_string()))?;
        async_fs::write(self.path_for(key), value)
            .await
            .map_err(|e| SpotifyError::Storage(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), SpotifyError> {
        match async_fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SpotifyError::Storage(e.to_string())),
        }
    }
}

/// In-process store for transient login sessions and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SpotifyError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| SpotifyError::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SpotifyError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| SpotifyError::Storage(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), SpotifyError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| SpotifyError::Storage(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }
}
