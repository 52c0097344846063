//! File-backed preference stores
//!
//! Each store is a JSON object on disk. Entries are loaded lazily on first access
//! and every commit replaces the whole file through a rename, so readers never see
//! a half-written store.

use crate::storage::{
    validate_store_name, Editor, Entries, PreferenceStore, PrefsLayout, StorageError,
    StoreProvider,
};
use dashmap::DashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct FileStore {
    name: String,
    path: PathBuf,
    staging: PathBuf,
    cache: Mutex<Option<Entries>>,
}

impl FileStore {
    /// Create a handle for `name`. Nothing is read until the store is first used.
    pub fn open(layout: &PrefsLayout, name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: layout.store_file(name),
            staging: layout.staging_file(name),
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop cached entries so the next access re-reads the file
    pub fn reload(&self) -> Result<(), StorageError> {
        *self.lock()? = None;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Entries>>, StorageError> {
        self.cache
            .lock()
            .map_err(|_| StorageError::Poisoned(self.name.clone()))
    }

    fn load(&self) -> Result<Entries, StorageError> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }

        let json = fs::read_to_string(&self.path)?;
        if json.trim().is_empty() {
            return Ok(Entries::new());
        }

        let entries: Entries = serde_json::from_str(&json)?;
        tracing::debug!("Loaded store '{}' ({} entries)", self.name, entries.len());
        Ok(entries)
    }

    fn persist(&self, entries: &Entries) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        let written = fs::write(&self.staging, json)
            .and_then(|()| fs::rename(&self.staging, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&self.staging);
            return Err(e.into());
        }
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn snapshot(&self) -> Result<Entries, StorageError> {
        let mut cache = self.lock()?;
        if let Some(entries) = cache.as_ref() {
            return Ok(entries.clone());
        }
        let entries = self.load()?;
        *cache = Some(entries.clone());
        Ok(entries)
    }

    fn commit(&self, edit: Editor) -> Result<usize, StorageError> {
        let mut cache = self.lock()?;
        let current = match cache.take() {
            Some(entries) => entries,
            None => self.load()?,
        };

        let mut next = current.clone();
        let dropped = edit.apply_to(&mut next);
        if next == current {
            *cache = Some(current);
            return Ok(dropped);
        }

        if let Err(e) = self.persist(&next) {
            *cache = Some(current);
            return Err(e);
        }
        *cache = Some(next);

        tracing::debug!("Committed store '{}' ({} removed)", self.name, dropped);
        Ok(dropped)
    }
}

/// Provider of [`FileStore`]s laid out under one [`PrefsLayout`]
pub struct FileStoreProvider {
    layout: PrefsLayout,
    stores: DashMap<String, Arc<FileStore>>,
}

impl FileStoreProvider {
    pub fn new(layout: PrefsLayout) -> Self {
        Self {
            layout,
            stores: DashMap::new(),
        }
    }

    pub fn layout(&self) -> &PrefsLayout {
        &self.layout
    }
}

impl StoreProvider for FileStoreProvider {
    fn open(&self, name: &str) -> Result<Arc<dyn PreferenceStore>, StorageError> {
        validate_store_name(name)?;
        let store: Arc<dyn PreferenceStore> = self
            .stores
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(FileStore::open(&self.layout, name)))
            .clone();
        Ok(store)
    }
}
