//! Method-call bridge
//!
//! The application layer reaches the host through named channels. Each channel
//! has one handler that answers method calls with a single response.

pub mod notifications;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub use notifications::{NotificationChannel, CLEAR_NOTIFICATION_DATABASE};

/// Error code reported when a handler fails before doing its work
pub const ERROR_CODE: &str = "ERROR";

/// A method invocation coming from the application layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Value::Null,
        }
    }

    pub fn with_arguments(mut self, arguments: Value) -> Self {
        self.arguments = arguments;
        self
    }
}

/// Reply to a [`MethodCall`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodResponse {
    Success(Value),
    Error {
        code: String,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<Value>,
    },
    /// The channel or method has no implementation on this host
    NotImplemented,
}

impl MethodResponse {
    pub fn success(value: impl Into<Value>) -> Self {
        MethodResponse::Success(value.into())
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        MethodResponse::Error {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }
}

/// Handler trait - one per channel
#[async_trait]
pub trait MethodCallHandler: Send + Sync {
    async fn on_method_call(&self, call: MethodCall) -> MethodResponse;
}

/// Channel registry - dispatches calls by channel name
pub struct ChannelRegistry {
    handlers: DashMap<String, Arc<dyn MethodCallHandler>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    /// Install `handler` on `channel`, returning the handler it replaced
    pub fn register(
        &self,
        channel: impl Into<String>,
        handler: Arc<dyn MethodCallHandler>,
    ) -> Option<Arc<dyn MethodCallHandler>> {
        self.handlers.insert(channel.into(), handler)
    }

    pub fn unregister(&self, channel: &str) -> Option<Arc<dyn MethodCallHandler>> {
        self.handlers.remove(channel).map(|(_, handler)| handler)
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.handlers.contains_key(channel)
    }

    pub fn count(&self) -> usize {
        self.handlers.len()
    }

    pub async fn invoke(&self, channel: &str, call: MethodCall) -> MethodResponse {
        let handler = match self.handlers.get(channel) {
            Some(handler) => handler.clone(),
            None => {
                tracing::debug!("No handler on channel '{}' for '{}'", channel, call.method);
                return MethodResponse::NotImplemented;
            }
        };
        handler.on_method_call(call).await
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl MethodCallHandler for Echo {
        async fn on_method_call(&self, call: MethodCall) -> MethodResponse {
            match call.method.as_str() {
                "echo" => MethodResponse::success(call.arguments),
                _ => MethodResponse::NotImplemented,
            }
        }
    }

    #[tokio::test]
    async fn test_dispatch_by_channel() {
        let registry = ChannelRegistry::new();
        assert!(registry.register("test/echo", Arc::new(Echo)).is_none());
        assert!(registry.contains("test/echo"));

        let call = MethodCall::new("echo").with_arguments(serde_json::json!({"n": 1}));
        let response = registry.invoke("test/echo", call).await;
        assert_eq!(response, MethodResponse::success(serde_json::json!({"n": 1})));
    }

    #[tokio::test]
    async fn test_unknown_channel_not_implemented() {
        let registry = ChannelRegistry::new();
        let response = registry.invoke("missing", MethodCall::new("echo")).await;
        assert_eq!(response, MethodResponse::NotImplemented);
    }

    #[tokio::test]
    async fn test_unregister() {
        let registry = ChannelRegistry::default();
        registry.register("test/echo", Arc::new(Echo));
        assert!(registry.unregister("test/echo").is_some());
        assert_eq!(registry.count(), 0);
        assert_eq!(
            registry.invoke("test/echo", MethodCall::new("echo")).await,
            MethodResponse::NotImplemented
        );
    }

    #[test]
    fn test_response_wire_shape() {
        let json = serde_json::to_value(MethodResponse::error(ERROR_CODE, "boom")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"error": {"code": "ERROR", "message": "boom"}})
        );
        let call: MethodCall =
            serde_json::from_str(r#"{"method": "clearNotificationDatabase"}"#).unwrap();
        assert_eq!(call, MethodCall::new("clearNotificationDatabase"));
    }
}
