//! Notification state reset
//!
//! Removes persisted notification scheduling state in three phases:
//!
//! 1. keys of the default store that match the configured matchers are removed
//!    in one commit; every other key is left as it was,
//! 2. the plugin store, which holds nothing but scheduling data, is cleared,
//! 3. the plugin store's backing file is deleted if present.
//!
//! A failing phase is logged and recorded in the [`ResetReport`], and the next
//! phase still runs. Only a failure of the run itself reports `false`.

pub mod matcher;
pub mod report;

pub use matcher::{KeyMatcher, MatcherError, MatcherSet};
pub use report::{Phase, PhaseOutcome, PhaseReport, ResetReport};

use crate::storage::{Editor, PreferenceStore, PrefsLayout, StorageError, StoreProvider};
use crate::types::HostConfig;
use chrono::Utc;
use std::fs;
use std::io::ErrorKind;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ResetError {
    #[error("Reset lock poisoned")]
    Poisoned,
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Matcher error: {0}")]
    Matcher(#[from] MatcherError),
    #[error("Plugin store '{0}' is the default store")]
    SharedStore(String),
}

pub struct NotificationStateReset {
    default_store: Arc<dyn PreferenceStore>,
    plugin_store: Arc<dyn PreferenceStore>,
    layout: PrefsLayout,
    matchers: MatcherSet,
    running: Mutex<()>,
}

impl NotificationStateReset {
    pub fn new(
        default_store: Arc<dyn PreferenceStore>,
        plugin_store: Arc<dyn PreferenceStore>,
        layout: PrefsLayout,
        matchers: MatcherSet,
    ) -> Self {
        Self {
            default_store,
            plugin_store,
            layout,
            matchers,
            running: Mutex::new(()),
        }
    }

    /// Open the configured stores through `provider` and compile the configured matchers
    pub fn from_config(
        provider: &dyn StoreProvider,
        layout: PrefsLayout,
        config: &HostConfig,
    ) -> Result<Self, ResetError> {
        if config.plugin_store.trim() == config.default_store.trim() {
            return Err(ResetError::SharedStore(config.plugin_store.clone()));
        }
        let matchers = MatcherSet::compile(&config.key_matchers)?;
        let default_store = provider.open(&config.default_store)?;
        let plugin_store = provider.open(&config.plugin_store)?;
        Ok(Self::new(default_store, plugin_store, layout, matchers))
    }

    /// Run the reset and report success
    pub fn reset(&self) -> bool {
        match self.run() {
            Ok(report) => {
                if report.is_clean() {
                    tracing::info!("Notification state cleared ({})", report.id);
                } else {
                    tracing::warn!(
                        "Notification state cleared with {} failed phase(s) ({})",
                        report.failures().count(),
                        report.id
                    );
                }
                true
            }
            Err(e) => {
                tracing::error!("Error clearing notification state: {}", e);
                false
            }
        }
    }

    /// Run all three phases and return their outcomes.
    ///
    /// Runs on one handle are serialized.
    pub fn run(&self) -> Result<ResetReport, ResetError> {
        let _running = self.running.lock().map_err(|_| ResetError::Poisoned)?;

        let id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!("Clearing notification state ({})", id);

        let phases = vec![
            self.phase(Phase::SelectiveKeyRemoval, || self.remove_matching_keys()),
            self.phase(Phase::ScopedStoreClear, || self.clear_plugin_store()),
            self.phase(Phase::TargetedFileDeletion, || self.delete_plugin_file()),
        ];

        Ok(ResetReport {
            id,
            started_at,
            finished_at: Utc::now(),
            phases,
        })
    }

    fn phase<F>(&self, phase: Phase, body: F) -> PhaseReport
    where
        F: FnOnce() -> Result<PhaseOutcome, String>,
    {
        let outcome = match body() {
            Ok(outcome) => outcome,
            Err(reason) => {
                tracing::warn!("Notification reset phase '{}' failed: {}", phase, reason);
                PhaseOutcome::Failed { reason }
            }
        };
        PhaseReport { phase, outcome }
    }

    fn remove_matching_keys(&self) -> Result<PhaseOutcome, String> {
        let store = self.default_store.name();
        let keys = self
            .default_store
            .keys()
            .map_err(|e| format!("reading store '{}': {}", store, e))?;

        let mut edit = Editor::new();
        let mut matched = Vec::new();
        for key in keys.into_iter().filter(|key| self.matchers.matches(key)) {
            tracing::debug!("Removing notification key '{}' from '{}'", key, store);
            edit.remove(key.as_str());
            matched.push(key);
        }

        if matched.is_empty() {
            return Ok(PhaseOutcome::Skipped {
                reason: format!("no notification keys in '{}'", store),
            });
        }

        let removed = self.default_store.commit(edit).map_err(|e| {
            format!(
                "removing keys [{}] from '{}': {}",
                matched.join(", "),
                store,
                e
            )
        })?;
        Ok(PhaseOutcome::Completed { affected: removed })
    }

    /// The plugin store is cleared and deleted wholesale, so it must not be the default store
    fn check_plugin_store(&self) -> Result<(), String> {
        let plugin = self.plugin_store.name();
        if plugin.trim() == self.default_store.name().trim() {
            return Err(format!("plugin store '{}' is the default store", plugin));
        }
        Ok(())
    }

    fn clear_plugin_store(&self) -> Result<PhaseOutcome, String> {
        self.check_plugin_store()?;
        let mut edit = Editor::new();
        edit.clear();
        let cleared = self
            .plugin_store
            .commit(edit)
            .map_err(|e| format!("clearing store '{}': {}", self.plugin_store.name(), e))?;
        Ok(PhaseOutcome::Completed { affected: cleared })
    }

    fn delete_plugin_file(&self) -> Result<PhaseOutcome, String> {
        self.check_plugin_store()?;
        let path = self.layout.store_file(self.plugin_store.name());
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!("Deleted {}", path.display());
                Ok(PhaseOutcome::Completed { affected: 1 })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(PhaseOutcome::Skipped {
                reason: format!("{} not present", path.display()),
            }),
            Err(e) => Err(format!("deleting {}: {}", path.display(), e)),
        }
    }
}
