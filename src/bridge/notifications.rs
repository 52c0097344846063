//! Notification channel
//!
//! Exposes `clearNotificationDatabase`, which wipes persisted notification
//! scheduling state and answers with a bool.

use crate::bridge::{MethodCall, MethodCallHandler, MethodResponse, ERROR_CODE};
use crate::reset::{NotificationStateReset, ResetError};
use crate::storage::{PrefsLayout, StoreProvider};
use crate::types::HostConfig;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::sync::Arc;

pub const CLEAR_NOTIFICATION_DATABASE: &str = "clearNotificationDatabase";

pub struct NotificationChannel {
    provider: Arc<dyn StoreProvider>,
    layout: PrefsLayout,
    config: HostConfig,
    reset: OnceCell<NotificationStateReset>,
}

impl NotificationChannel {
    pub fn new(provider: Arc<dyn StoreProvider>, layout: PrefsLayout, config: HostConfig) -> Self {
        Self {
            provider,
            layout,
            config,
            reset: OnceCell::new(),
        }
    }

    /// Stores are opened on first use and kept for later calls
    fn reset(&self) -> Result<&NotificationStateReset, ResetError> {
        self.reset.get_or_try_init(|| {
            NotificationStateReset::from_config(
                self.provider.as_ref(),
                self.layout.clone(),
                &self.config,
            )
        })
    }

    fn clear_notification_database(&self) -> MethodResponse {
        match self.reset() {
            Ok(reset) => MethodResponse::success(reset.reset()),
            Err(e) => {
                tracing::error!("Error clearing notification database: {}", e);
                MethodResponse::error(ERROR_CODE, e.to_string())
            }
        }
    }
}

#[async_trait]
impl MethodCallHandler for NotificationChannel {
    async fn on_method_call(&self, call: MethodCall) -> MethodResponse {
        match call.method.as_str() {
            CLEAR_NOTIFICATION_DATABASE => self.clear_notification_database(),
            other => {
                tracing::debug!("Notification channel has no method '{}'", other);
                MethodResponse::NotImplemented
            }
        }
    }
}
