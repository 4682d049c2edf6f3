//! Content store abstraction
//!
//! Content-aware persistence over one or more key/value adapters plus an
//! optional messaging adapter. Each stored item carries a `kind`; routing
//! rules in the provider configuration (`route.<kind> = <adapter name>`)
//! pick the backing adapter per kind, with the first storage adapter as
//! the default route. When a messaging adapter is wired, a notification
//! is published after each successful store; publish failures are logged
//! and never fail the store itself.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use cpk_application::ports::registry::{
    AbstractionProviderConfig, AbstractionProviderEntry, ABSTRACTION_PROVIDERS,
};
use cpk_domain::context::UserContext;
use cpk_domain::error::{Error, Result};
use cpk_domain::ports::{Abstraction, Adapter};

const DEFAULT_CONTRACT: &str = "contract.content_store.v1";
const ROUTE_PREFIX: &str = "route.";
const STORED_TOPIC: &str = "content.stored";

/// Content-aware storage over 1..N adapters.
#[derive(Debug)]
pub struct ContentStoreAbstraction {
    contract_id: String,
    default_store: Arc<dyn Adapter>,
    routes: HashMap<String, Arc<dyn Adapter>>,
    messaging: Option<Arc<dyn Adapter>>,
}

impl ContentStoreAbstraction {
    /// Build with a single storage adapter and no routing or messaging.
    pub fn new(store: Arc<dyn Adapter>) -> Self {
        Self {
            contract_id: DEFAULT_CONTRACT.to_string(),
            default_store: store,
            routes: HashMap::new(),
            messaging: None,
        }
    }

    /// Attach a messaging adapter notified after each store.
    pub fn with_messaging(mut self, messaging: Arc<dyn Adapter>) -> Self {
        self.messaging = Some(messaging);
        self
    }

    /// Route items of the given kind to a specific adapter.
    pub fn with_route(mut self, kind: impl Into<String>, store: Arc<dyn Adapter>) -> Self {
        self.routes.insert(kind.into(), store);
        self
    }

    /// Build from registry configuration and resolved adapters.
    ///
    /// Storage adapters are those exposing the `kv_storage` capability;
    /// the first one is the default route. An adapter exposing
    /// `messaging` becomes the notification channel.
    pub fn from_config(
        config: &AbstractionProviderConfig,
        adapters: &[Arc<dyn Adapter>],
    ) -> std::result::Result<Self, String> {
        let stores: Vec<Arc<dyn Adapter>> = adapters
            .iter()
            .filter(|a| a.capability() == "kv_storage")
            .cloned()
            .collect();
        let default_store = stores
            .first()
            .cloned()
            .ok_or_else(|| "content_store requires at least one kv_storage adapter".to_string())?;
        let messaging = adapters
            .iter()
            .find(|a| a.capability() == "messaging")
            .cloned();

        let mut routes = HashMap::new();
        for (key, adapter_name) in &config.extra {
            let Some(kind) = key.strip_prefix(ROUTE_PREFIX) else {
                continue;
            };
            let target = stores
                .iter()
                .find(|a| a.name() == adapter_name.as_str())
                .cloned()
                .ok_or_else(|| {
                    format!("route '{key}' targets unknown storage adapter '{adapter_name}'")
                })?;
            routes.insert(kind.to_string(), target);
        }

        let contract_id = if config.contract_id.is_empty() {
            DEFAULT_CONTRACT.to_string()
        } else {
            config.contract_id.clone()
        };

        Ok(Self {
            contract_id,
            default_store,
            routes,
            messaging,
        })
    }

    fn store_for(&self, kind: &str) -> &Arc<dyn Adapter> {
        self.routes.get(kind).unwrap_or(&self.default_store)
    }

    fn content_key(kind: &str, id: &str) -> String {
        format!("content:{kind}:{id}")
    }

    async fn adapter_execute(
        &self,
        adapter: &Arc<dyn Adapter>,
        operation: &str,
        payload: &Value,
        ctx: &UserContext,
    ) -> Result<Value> {
        adapter.execute(operation, payload, ctx).await.map_err(|err| {
            Error::adapter_failure_with_source(
                adapter.name(),
                format!("content store operation '{operation}' failed"),
                err,
            )
        })
    }

    async fn store(&self, arguments: &Value, ctx: &UserContext) -> Result<Value> {
        let kind = required_str(arguments, "kind")?;
        let id = required_str(arguments, "id")?;
        let content = arguments
            .get("content")
            .cloned()
            .ok_or_else(|| Error::invalid_argument("missing field 'content'"))?;

        let adapter = self.store_for(kind);
        self.adapter_execute(
            adapter,
            "put",
            &json!({"key": Self::content_key(kind, id), "value": content}),
            ctx,
        )
        .await?;
        debug!(kind, id, adapter = adapter.name(), "content stored");

        // Notification is best-effort; the content is already durable.
        if let Some(messaging) = &self.messaging {
            let notice = json!({
                "topic": STORED_TOPIC,
                "message": {"kind": kind, "id": id},
            });
            if let Err(err) = messaging.execute("publish", &notice, ctx).await {
                warn!(kind, id, error = %err, "content stored notification failed");
            }
        }

        Ok(json!({"stored": true, "kind": kind, "id": id}))
    }

    async fn retrieve(&self, arguments: &Value, ctx: &UserContext) -> Result<Value> {
        let kind = required_str(arguments, "kind")?;
        let id = required_str(arguments, "id")?;
        let stored = self
            .adapter_execute(
                self.store_for(kind),
                "get",
                &json!({"key": Self::content_key(kind, id)}),
                ctx,
            )
            .await?;
        if stored["found"] == json!(true) {
            Ok(stored["value"].clone())
        } else {
            Err(Error::not_found(format!("content '{kind}/{id}'")))
        }
    }

    async fn delete(&self, arguments: &Value, ctx: &UserContext) -> Result<Value> {
        let kind = required_str(arguments, "kind")?;
        let id = required_str(arguments, "id")?;
        let removed = self
            .adapter_execute(
                self.store_for(kind),
                "delete",
                &json!({"key": Self::content_key(kind, id)}),
                ctx,
            )
            .await?;
        Ok(json!({"deleted": removed["deleted"] == json!(true)}))
    }
}

fn required_str<'a>(arguments: &'a Value, field: &str) -> Result<&'a str> {
    arguments
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::invalid_argument(format!("missing string field '{field}'")))
}

#[async_trait]
impl Abstraction for ContentStoreAbstraction {
    fn name(&self) -> &str {
        "content_store"
    }

    fn contract_id(&self) -> &str {
        &self.contract_id
    }

    async fn invoke(&self, operation: &str, arguments: &Value, ctx: &UserContext) -> Result<Value> {
        match operation {
            "store" => self.store(arguments, ctx).await,
            "retrieve" => self.retrieve(arguments, ctx).await,
            "delete" => self.delete(arguments, ctx).await,
            other => Err(Error::invalid_argument(format!(
                "content_store does not support operation '{other}'"
            ))),
        }
    }
}

#[linkme::distributed_slice(ABSTRACTION_PROVIDERS)]
static CONTENT_STORE_PROVIDER: AbstractionProviderEntry = AbstractionProviderEntry {
    name: "content_store",
    description: "Content-aware storage routing over key/value adapters",
    factory: |config, adapters| {
        Ok(Arc::new(ContentStoreAbstraction::from_config(config, adapters)?))
    },
};
