use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::io::atomic_write;

/// Group identifier under which every tracker key is stored
pub const GROUP: &str = "taskstracker";

/// Whether a key is shared by the account or scoped to the active profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Account,
    Profile,
}

/// Error type for key-value store I/O
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse store {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not serialize store: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// String key-value persistence addressed by (group, key).
///
/// An empty value and a missing key are equivalent for readers.
pub trait KeyValueStore {
    fn get(&self, scope: Scope, group: &str, key: &str) -> Option<String>;
    fn set(&mut self, scope: Scope, group: &str, key: &str, value: &str);
    fn unset(&mut self, scope: Scope, group: &str, key: &str);
}

/// In-memory store; also the backing map of [`FileStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    profile: String,
    entries: IndexMap<String, String>,
}

impl MemoryStore {
    pub fn new(profile: &str) -> Self {
        MemoryStore {
            profile: profile.to_string(),
            entries: IndexMap::new(),
        }
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn set_profile(&mut self, profile: &str) {
        self.profile = profile.to_string();
    }

    fn full_key(&self, scope: Scope, group: &str, key: &str) -> String {
        match scope {
            Scope::Account => format!("{}.{}", group, key),
            Scope::Profile => format!("{}.profile.{}.{}", group, self.profile, key),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, scope: Scope, group: &str, key: &str) -> Option<String> {
        self.entries.get(&self.full_key(scope, group, key)).cloned()
    }

    fn set(&mut self, scope: Scope, group: &str, key: &str, value: &str) {
        let full = self.full_key(scope, group, key);
        self.entries.insert(full, value.to_string());
    }

    fn unset(&mut self, scope: Scope, group: &str, key: &str) {
        let full = self.full_key(scope, group, key);
        self.entries.shift_remove(&full);
    }
}

/// A JSON file holding a flat map of composed keys to values.
/// Writes are buffered until [`FileStore::flush`].
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
    dirty: bool,
}

impl FileStore {
    /// Open (or start) a store file. A missing file is an empty store.
    pub fn open(path: &Path, profile: &str) -> Result<Self, StoreError> {
        let mut inner = MemoryStore::new(profile);
        if path.exists() {
            let text = fs::read_to_string(path).map_err(|e| StoreError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })?;
            if !text.trim().is_empty() {
                inner.entries =
                    serde_json::from_str(&text).map_err(|e| StoreError::ParseError {
                        path: path.to_path_buf(),
                        source: e,
                    })?;
            }
        }
        Ok(FileStore {
            path: path.to_path_buf(),
            inner,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write pending changes to disk atomically.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.inner.entries)?;
        atomic_write(&self.path, content.as_bytes())?;
        self.dirty = false;
        log::debug!("flushed store to {}", self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, scope: Scope, group: &str, key: &str) -> Option<String> {
        self.inner.get(scope, group, key)
    }

    fn set(&mut self, scope: Scope, group: &str, key: &str, value: &str) {
        self.inner.set(scope, group, key, value);
        self.dirty = true;
    }

    fn unset(&mut self, scope: Scope, group: &str, key: &str) {
        self.inner.unset(scope, group, key);
        self.dirty = true;
    }
}
