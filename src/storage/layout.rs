//! Preferences file layout
//!
//! Every named store lives at `<root>/shared_prefs/<name>.<extension>`.

use crate::storage::{get_data_dir, StorageError};
use std::path::{Path, PathBuf};

/// Directory under the data root that holds store files
pub const PREFS_DIR: &str = "shared_prefs";

/// Extension of store files written by [`FileStore`](crate::storage::FileStore)
pub const DEFAULT_EXTENSION: &str = "json";

/// Resolves store names to their backing files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefsLayout {
    root: PathBuf,
    extension: String,
}

impl PrefsLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Layout rooted at the platform data directory
    pub fn from_data_dir() -> Result<Self, StorageError> {
        Ok(Self::new(get_data_dir()?))
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        let extension = extension.trim().trim_start_matches('.');
        if !extension.is_empty() {
            self.extension = extension.to_string();
        }
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn prefs_dir(&self) -> PathBuf {
        self.root.join(PREFS_DIR)
    }

    pub fn store_file(&self, name: &str) -> PathBuf {
        self.prefs_dir().join(format!("{}.{}", name, self.extension))
    }

    /// Scratch file a commit writes before renaming over the store file
    pub(crate) fn staging_file(&self, name: &str) -> PathBuf {
        self.prefs_dir()
            .join(format!("{}.{}.tmp", name, self.extension))
    }
}
