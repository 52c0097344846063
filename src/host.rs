//! Host startup
//!
//! Checks notification permissions and registers the bridge channels.

use crate::bridge::{ChannelRegistry, NotificationChannel};
use crate::storage::{FileStoreProvider, PrefsLayout, StorageError, StoreProvider};
use crate::types::HostConfig;
use std::sync::Arc;

/// First API level able to report whether notifications are enabled
pub const NOTIFICATION_QUERY_MIN_API: u32 = 23;

/// OS notification settings as seen by the host
pub trait NotificationPermissions: Send + Sync {
    fn api_level(&self) -> u32;
    fn are_notifications_enabled(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Enabled,
    Disabled,
    /// The platform is too old to answer
    Unknown,
}

pub struct Host {
    config: HostConfig,
    layout: PrefsLayout,
    provider: Arc<dyn StoreProvider>,
    permissions: Arc<dyn NotificationPermissions>,
}

impl Host {
    pub fn new(
        config: HostConfig,
        layout: PrefsLayout,
        provider: Arc<dyn StoreProvider>,
        permissions: Arc<dyn NotificationPermissions>,
    ) -> Self {
        Self {
            config,
            layout,
            provider,
            permissions,
        }
    }

    /// Host backed by store files under the platform data directory
    pub fn from_data_dir(
        config: HostConfig,
        permissions: Arc<dyn NotificationPermissions>,
    ) -> Result<Self, StorageError> {
        let layout = PrefsLayout::from_data_dir()?.with_extension(&config.prefs_extension);
        let provider = Arc::new(FileStoreProvider::new(layout.clone()));
        Ok(Self::new(config, layout, provider, permissions))
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn check_notification_permission(&self) -> PermissionStatus {
        if self.permissions.api_level() < NOTIFICATION_QUERY_MIN_API {
            return PermissionStatus::Unknown;
        }

        if self.permissions.are_notifications_enabled() {
            PermissionStatus::Enabled
        } else {
            tracing::warn!("Notifications are disabled!");
            PermissionStatus::Disabled
        }
    }

    /// Run startup checks and install the host's channels on `registry`
    pub fn configure(&self, registry: &ChannelRegistry) -> PermissionStatus {
        let status = self.check_notification_permission();

        let channel = NotificationChannel::new(
            self.provider.clone(),
            self.layout.clone(),
            self.config.clone(),
        );
        if registry
            .register(self.config.channel.clone(), Arc::new(channel))
            .is_some()
        {
            tracing::warn!("Replaced existing handler on '{}'", self.config.channel);
        }

        tracing::info!("Host configured, notifications: {:?}", status);
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{MethodCall, MethodResponse, CLEAR_NOTIFICATION_DATABASE};
    use crate::storage::{InMemoryProvider, InMemoryStore, PreferenceStore};
    use std::fs;

    struct FixedPermissions {
        api_level: u32,
        enabled: bool,
    }

    impl NotificationPermissions for FixedPermissions {
        fn api_level(&self) -> u32 {
            self.api_level
        }

        fn are_notifications_enabled(&self) -> bool {
            self.enabled
        }
    }

    fn host(
        api_level: u32,
        enabled: bool,
        provider: Arc<InMemoryProvider>,
        root: &std::path::Path,
    ) -> Host {
        Host::new(
            HostConfig::default(),
            PrefsLayout::new(root),
            provider,
            Arc::new(FixedPermissions { api_level, enabled }),
        )
    }

    #[test]
    fn test_permission_status() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(InMemoryProvider::new());
        assert_eq!(
            host(33, true, provider.clone(), dir.path()).check_notification_permission(),
            PermissionStatus::Enabled
        );
        assert_eq!(
            host(33, false, provider.clone(), dir.path()).check_notification_permission(),
            PermissionStatus::Disabled
        );
        assert_eq!(
            host(21, false, provider, dir.path()).check_notification_permission(),
            PermissionStatus::Unknown
        );
    }

    #[tokio::test]
    async fn test_configure_registers_notification_channel() {
        let provider = Arc::new(InMemoryProvider::new());
        let default_store = provider.insert(InMemoryStore::with_entries(
            "FlutterSharedPreferences",
            [("flutter.scheduled_notifications", "[]"), ("user.theme", "dark")],
        ));
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("shared_prefs")).unwrap();
        let plugin_file = dir.path().join("shared_prefs").join("scheduled_notifications.json");
        fs::write(&plugin_file, "{}").unwrap();
        let host = host(33, false, provider, dir.path());
        let registry = ChannelRegistry::new();

        assert_eq!(host.configure(&registry), PermissionStatus::Disabled);
        assert!(registry.contains(&host.config().channel));

        let response = registry
            .invoke(
                &host.config().channel,
                MethodCall::new(CLEAR_NOTIFICATION_DATABASE),
            )
            .await;
        assert_eq!(response, MethodResponse::success(true));
        assert_eq!(default_store.keys().unwrap(), vec!["user.theme".to_string()]);
        assert!(!plugin_file.exists());
    }
}
