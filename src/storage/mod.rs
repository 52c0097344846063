//! Persistent storage
//!
//! Named preference stores, batched edits, and the on-disk layout of store files.

pub mod file;
pub mod layout;
pub mod memory;
pub mod settings;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub use file::{FileStore, FileStoreProvider};
pub use layout::PrefsLayout;
pub use memory::{InMemoryProvider, InMemoryStore};

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Store '{0}' lock poisoned")]
    Poisoned(String),
    #[error("Could not determine data directory")]
    NoDataDir,
    #[error("Store '{name}' unavailable: {reason}")]
    Unavailable { name: String, reason: String },
}

/// A value held by a preference store.
///
/// Values are kept as the JSON they were read from, so entries a commit does not
/// touch are written back exactly as loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefValue(pub Value);

impl PrefValue {
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.0.as_bool()
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.0.as_i64()
    }
}

impl From<Value> for PrefValue {
    fn from(value: Value) -> Self {
        PrefValue(value)
    }
}

impl From<&str> for PrefValue {
    fn from(value: &str) -> Self {
        PrefValue(Value::from(value))
    }
}

impl From<String> for PrefValue {
    fn from(value: String) -> Self {
        PrefValue(Value::from(value))
    }
}

impl From<bool> for PrefValue {
    fn from(value: bool) -> Self {
        PrefValue(Value::from(value))
    }
}

impl From<i64> for PrefValue {
    fn from(value: i64) -> Self {
        PrefValue(Value::from(value))
    }
}

impl From<f64> for PrefValue {
    fn from(value: f64) -> Self {
        PrefValue(Value::from(value))
    }
}

/// Contents of one store, ordered by key
pub type Entries = BTreeMap<String, PrefValue>;

/// A batch of changes applied to a store in a single commit.
///
/// A pending `clear` is applied first, then removals, then puts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Editor {
    clear: bool,
    removals: BTreeSet<String>,
    puts: BTreeMap<String, PrefValue>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<PrefValue>) -> &mut Self {
        let key = key.into();
        self.removals.remove(&key);
        self.puts.insert(key, value.into());
        self
    }

    pub fn remove(&mut self, key: impl Into<String>) -> &mut Self {
        let key = key.into();
        self.puts.remove(&key);
        self.removals.insert(key);
        self
    }

    pub fn clear(&mut self) -> &mut Self {
        self.clear = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.clear && self.removals.is_empty() && self.puts.is_empty()
    }

    /// Apply the batch to `entries`, returning how many existing entries were dropped.
    pub fn apply_to(&self, entries: &mut Entries) -> usize {
        let mut dropped = 0;
        if self.clear {
            dropped += entries.len();
            entries.clear();
        }
        for key in &self.removals {
            if entries.remove(key).is_some() {
                dropped += 1;
            }
        }
        for (key, value) in &self.puts {
            entries.insert(key.clone(), value.clone());
        }
        dropped
    }
}

/// A named, durable key-value namespace.
pub trait PreferenceStore: Send + Sync {
    fn name(&self) -> &str;

    /// Copy of the current entries.
    fn snapshot(&self) -> Result<Entries, StorageError>;

    /// Apply `edit` as one durable write. Data is flushed before this returns.
    ///
    /// Returns the number of existing entries removed by the edit.
    fn commit(&self, edit: Editor) -> Result<usize, StorageError>;

    fn get(&self, key: &str) -> Result<Option<PrefValue>, StorageError> {
        Ok(self.snapshot()?.remove(key))
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.snapshot()?.into_keys().collect())
    }
}

/// Hands out store handles by name. Repeated opens of one name share a handle.
pub trait StoreProvider: Send + Sync {
    fn open(&self, name: &str) -> Result<Arc<dyn PreferenceStore>, StorageError>;
}

/// Reject names that could escape the preferences directory.
pub(crate) fn validate_store_name(name: &str) -> Result<(), StorageError> {
    let invalid = name.trim().is_empty()
        || name.contains(['/', '\\'])
        || name == "."
        || name == "..";
    if invalid {
        return Err(StorageError::Unavailable {
            name: name.to_string(),
            reason: "invalid store name".to_string(),
        });
    }
    Ok(())
}

/// Get the application data directory
pub fn get_data_dir() -> Result<PathBuf, StorageError> {
    directories::ProjectDirs::from("com", "tursinalabs", "tracker")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(StorageError::NoDataDir)
}
