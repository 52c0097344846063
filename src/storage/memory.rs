//! In-memory preference stores
//!
//! Used when nothing needs to outlive the process, and as test doubles.

use crate::storage::{
    validate_store_name, Editor, Entries, PrefValue, PreferenceStore, StorageError, StoreProvider,
};
use dashmap::DashMap;
use std::sync::{Arc, Mutex};

pub struct InMemoryStore {
    name: String,
    entries: Mutex<Entries>,
}

impl InMemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Mutex::new(Entries::new()),
        }
    }

    pub fn with_entries<K, V>(name: impl Into<String>, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<PrefValue>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            name: name.into(),
            entries: Mutex::new(entries),
        }
    }
}

impl PreferenceStore for InMemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn snapshot(&self) -> Result<Entries, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Poisoned(self.name.clone()))?;
        Ok(entries.clone())
    }

    fn commit(&self, edit: Editor) -> Result<usize, StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Poisoned(self.name.clone()))?;
        Ok(edit.apply_to(&mut entries))
    }
}

/// Provider backed by [`InMemoryStore`]s, created on first open
#[derive(Default)]
pub struct InMemoryProvider {
    stores: DashMap<String, Arc<InMemoryStore>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a pre-populated store, replacing any store of the same name
    pub fn insert(&self, store: InMemoryStore) -> Arc<InMemoryStore> {
        let store = Arc::new(store);
        self.stores.insert(store.name().to_string(), store.clone());
        store
    }

    pub fn get(&self, name: &str) -> Option<Arc<InMemoryStore>> {
        self.stores.get(name).map(|s| s.clone())
    }
}

impl StoreProvider for InMemoryProvider {
    fn open(&self, name: &str) -> Result<Arc<dyn PreferenceStore>, StorageError> {
        validate_store_name(name)?;
        let store: Arc<dyn PreferenceStore> = self
            .stores
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(InMemoryStore::new(name)))
            .clone();
        Ok(store)
    }
}
