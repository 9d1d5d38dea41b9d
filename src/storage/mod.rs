//! Durable key-value storage for AskVerse
//!
//! Collections are stored as whole JSON documents under fixed string keys.
//! There are no partial updates and no transactions: every mutation rewrites
//! the full value.

use crate::error::{AskverseError, Result};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

pub mod collection;
pub mod types;

pub use collection::{LoadStatus, Loaded, PersistedCollection};
pub use types::{ChatExchange, GeneratedImage, StorageKey};

/// Environment variable that overrides the store location
pub const STORE_PATH_ENV: &str = "ASKVERSE_STORE";

/// String-keyed persistence with no transactions
pub trait KeyValueStore: Send + Sync {
    /// Read the raw bytes stored under `key`
    ///
    /// Returns `Ok(None)` when the key has never been written. Bytes are
    /// returned as stored, valid UTF-8 or not.
    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Read the value stored under `key` as text
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self.get_bytes(key)? {
            Some(bytes) => String::from_utf8(bytes).map(Some).map_err(|e| {
                AskverseError::Storage(format!("Stored value for {} is not UTF-8: {}", key, e))
                    .into()
            }),
            None => Ok(None),
        }
    }

    /// Overwrite the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Embedded `sled` store
///
/// Each write is flushed before returning so a crash never loses an
/// acknowledged mutation.
pub struct SledStore {
    db: sled::Db,
    path: PathBuf,
}

impl SledStore {
    /// Open the store at the default location
    ///
    /// Honors the `ASKVERSE_STORE` override, otherwise uses the platform
    /// data directory.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var(STORE_PATH_ENV) {
            return Self::open(override_path);
        }

        Self::open(default_store_path()?)
    }

    /// Open or create a store at `path`
    ///
    /// # Examples
    ///
    /// ```
    /// use askverse::storage::{KeyValueStore, SledStore};
    ///
    /// # fn main() -> askverse::error::Result<()> {
    /// let dir = tempfile::tempdir()?;
    /// let store = SledStore::open(dir.path().join("store"))?;
    /// store.set("darkMode", "true")?;
    /// assert_eq!(store.get("darkMode")?.as_deref(), Some("true"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AskverseError::Storage(format!("Failed to create store directory: {}", e))
            })?;
        }

        let db = sled::open(&path)
            .map_err(|e| AskverseError::Storage(format!("Failed to open database: {}", e)))?;

        tracing::debug!("Opened store at {}", path.display());
        Ok(Self { db, path })
    }

    /// Location of the database directory
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for SledStore {
    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let bytes = self
            .db
            .get(key.as_bytes())
            .map_err(|e| AskverseError::Storage(format!("Get failed: {}", e)))?;

        Ok(bytes.map(|bytes| bytes.to_vec()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| AskverseError::Storage(format!("Insert failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| AskverseError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }
}

/// In-memory store for tests and `--ephemeral` sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AskverseError::Storage("Memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).map(|value| value.clone().into_bytes()))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AskverseError::Storage("Memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Platform data directory location of the store
pub fn default_store_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "askverse", "askverse")
        .ok_or_else(|| AskverseError::Storage("Could not determine data directory".into()))?;
    Ok(proj_dirs.data_dir().join("store"))
}

/// Read the dark-mode preference
///
/// Absent or unreadable values fall back to light mode.
pub fn dark_mode(store: &dyn KeyValueStore) -> bool {
    match store.get_bytes(StorageKey::DarkMode.as_str()) {
        Ok(Some(raw)) => serde_json::from_slice(&raw).unwrap_or_else(|e| {
            tracing::debug!("Ignoring unreadable darkMode value: {}", e);
            false
        }),
        Ok(None) => false,
        Err(e) => {
            tracing::debug!("darkMode unavailable: {}", e);
            false
        }
    }
}

/// Persist the dark-mode preference
pub fn set_dark_mode(store: &dyn KeyValueStore, enabled: bool) -> Result<()> {
    let raw = serde_json::to_string(&enabled)?;
    store.set(StorageKey::DarkMode.as_str(), &raw)
}
