//! Broadcast message bus adapter
//!
//! Local pub/sub over a tokio broadcast channel, in lieu of an external
//! broker. Publishing never blocks; events published with no subscribers
//! are dropped, which is the broadcast channel's contract.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use cpk_application::ports::registry::{AdapterProviderConfig, AdapterProviderEntry, ADAPTER_PROVIDERS};
use cpk_domain::context::UserContext;
use cpk_domain::error::{Error, Result};
use cpk_domain::ports::Adapter;

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Pub/sub adapter over `tokio::sync::broadcast`.
///
/// Exposes the `messaging` capability with `publish` and
/// `subscriber_count` operations.
pub struct BroadcastBusAdapter {
    sender: broadcast::Sender<Value>,
}

impl BroadcastBusAdapter {
    /// Create a bus with the default channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with an explicit channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Build from registry configuration.
    pub fn from_config(config: &AdapterProviderConfig) -> Self {
        match config.capacity {
            Some(capacity) => Self::with_capacity(capacity),
            None => Self::new(),
        }
    }

    /// Subscribe to everything published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<Value> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastBusAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for BroadcastBusAdapter {
    fn name(&self) -> &str {
        "broadcast_bus"
    }

    fn capability(&self) -> &str {
        "messaging"
    }

    async fn execute(&self, operation: &str, payload: &Value, ctx: &UserContext) -> Result<Value> {
        match operation {
            "publish" => {
                let topic = payload
                    .get("topic")
                    .and_then(Value::as_str)
                    .ok_or_else(|| Error::invalid_argument("missing string field 'topic'"))?;
                let message = payload.get("message").cloned().unwrap_or(Value::Null);
                let envelope = json!({
                    "topic": topic,
                    "tenant": ctx.tenant_id(),
                    "message": message,
                });
                // A send error just means no live subscribers.
                let delivered = self.sender.send(envelope).unwrap_or(0);
                Ok(json!({"published": true, "delivered": delivered}))
            }
            "subscriber_count" => Ok(json!({"subscribers": self.sender.receiver_count()})),
            other => Err(Error::invalid_argument(format!(
                "broadcast_bus does not support operation '{other}'"
            ))),
        }
    }
}

#[linkme::distributed_slice(ADAPTER_PROVIDERS)]
static BROADCAST_BUS_PROVIDER: AdapterProviderEntry = AdapterProviderEntry {
    name: "broadcast_bus",
    description: "Local pub/sub message bus over a tokio broadcast channel",
    factory: |config: &AdapterProviderConfig| {
        Ok(Arc::new(BroadcastBusAdapter::from_config(config)))
    },
};
