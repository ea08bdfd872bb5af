//! Persistent string entries holding the cache snapshot and the config.
//!
//! `EntryStore` is the raw key → string store (browser local storage in
//! the userscript host, a directory here). `CacheStore` layers the typed
//! snapshot/config accessors on top; nothing else touches the entries.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use crate::cache::{self, CacheError, CacheSnapshot};
use crate::config::{Config, ConfigIssue, LoadedConfig};

/// Entry holding the serialized [`CacheSnapshot`].
pub const CACHE_KEY: &str = "vv_decks";
/// Entry holding the serialized [`Config`].
pub const CONFIG_KEY: &str = "vv_config";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub trait EntryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Replace the entry. A reader sees either the old or the new value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: EntryStore + ?Sized> EntryStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntryStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per entry under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl EntryStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Atomic write: write to .tmp then rename.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path(key);
        let tmp = path.with_extension("tmp");
        fs::create_dir_all(&self.dir)?;
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Typed access to the snapshot and config entries.
#[derive(Debug)]
pub struct CacheStore<S> {
    entries: S,
}

impl<S: EntryStore> CacheStore<S> {
    pub fn new(entries: S) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &S {
        &self.entries
    }

    /// Decode the stored snapshot.
    pub fn snapshot(&self) -> Result<CacheSnapshot, CacheError> {
        let raw = self
            .entries
            .get(CACHE_KEY)
            .map_err(|e| CacheError::Unreadable(e.to_string()))?;
        cache::decode(raw.as_deref())
    }

    pub fn set_snapshot(&self, snapshot: &CacheSnapshot) -> Result<(), StoreError> {
        let json = snapshot.to_json()?;
        self.entries.set(CACHE_KEY, &json)
    }

    /// Size of the stored snapshot string in bytes.
    pub fn raw_snapshot_len(&self) -> Result<Option<usize>, StoreError> {
        Ok(self.entries.get(CACHE_KEY)?.map(|s| s.len()))
    }

    /// Read the config. A missing entry is the default config.
    pub fn config(&self) -> LoadedConfig {
        match self.entries.get(CONFIG_KEY) {
            Ok(Some(text)) => Config::from_json(&text),
            Ok(None) => LoadedConfig::default(),
            Err(e) => {
                let issue = ConfigIssue::Malformed(e.to_string());
                tracing::warn!(%issue, "config fallback");
                LoadedConfig {
                    config: Config::default(),
                    issues: vec![issue],
                }
            }
        }
    }

    pub fn set_config(&self, config: &Config) -> Result<(), StoreError> {
        let json = config.to_json()?;
        self.entries.set(CONFIG_KEY, &json)
    }
}
