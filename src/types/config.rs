//! Configuration types
//!
//! Host configuration: store names, key matchers and the bridge channel.

use crate::reset::matcher::{default_key_matchers, KeyMatcher};
use crate::storage::layout::DEFAULT_EXTENSION;
use serde::{Deserialize, Serialize};

/// Default preference store shared by the application layer
pub const DEFAULT_STORE_NAME: &str = "FlutterSharedPreferences";

/// Store owned by the notification plugin
pub const PLUGIN_STORE_NAME: &str = "scheduled_notifications";

pub const NOTIFICATION_CHANNEL: &str = "com.tursinalabs.ramadan.tracker/notifications";

/// Host configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Bridge channel the notification handler is registered on
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Store holding application and plugin keys side by side
    #[serde(default = "default_store")]
    pub default_store: String,
    /// Store holding nothing but notification scheduling data
    #[serde(default = "plugin_store")]
    pub plugin_store: String,
    /// Keys in the default store matching any of these are notification data
    #[serde(default = "default_key_matchers")]
    pub key_matchers: Vec<KeyMatcher>,
    /// Extension of store files under `shared_prefs/`
    #[serde(default = "default_extension")]
    pub prefs_extension: String,
}

fn default_channel() -> String {
    NOTIFICATION_CHANNEL.to_string()
}

fn default_store() -> String {
    DEFAULT_STORE_NAME.to_string()
}

fn plugin_store() -> String {
    PLUGIN_STORE_NAME.to_string()
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            default_store: default_store(),
            plugin_store: plugin_store(),
            key_matchers: default_key_matchers(),
            prefs_extension: default_extension(),
        }
    }
}

impl HostConfig {
    /// Validate configuration values
    ///
    /// The plugin store is cleared wholesale, so it must never name the default store.
    pub fn validate(&mut self) {
        if self.channel.trim().is_empty() {
            self.channel = default_channel();
        }

        if self.default_store.trim().is_empty() {
            self.default_store = default_store();
        }

        if self.plugin_store.trim().is_empty() {
            self.plugin_store = plugin_store();
        }

        if self.plugin_store.trim() == self.default_store.trim() {
            tracing::warn!(
                "Plugin store '{}' is the default store, falling back to '{}'",
                self.plugin_store,
                PLUGIN_STORE_NAME
            );
            self.plugin_store = plugin_store();
            if self.default_store.trim() == PLUGIN_STORE_NAME {
                self.default_store = default_store();
            }
        }

        if self.key_matchers.is_empty() {
            tracing::warn!("No notification key matchers configured, using defaults");
            self.key_matchers = default_key_matchers();
        }

        let extension = self.prefs_extension.trim().trim_start_matches('.');
        self.prefs_extension = if extension.is_empty() {
            default_extension()
        } else {
            extension.to_string()
        };
    }
}
