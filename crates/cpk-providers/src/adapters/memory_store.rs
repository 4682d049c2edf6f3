//! In-memory key/value storage adapter
//!
//! Backed by a concurrent map. Keys are namespaced per tenant, so two
//! contexts with different tenant identifiers can never observe each
//! other's entries.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{json, Value};

use cpk_application::ports::registry::{AdapterProviderConfig, AdapterProviderEntry, ADAPTER_PROVIDERS};
use cpk_domain::context::UserContext;
use cpk_domain::error::{Error, Result};
use cpk_domain::ports::Adapter;

/// Concurrent in-memory key/value store.
///
/// Exposes the `kv_storage` capability with `put` / `get` / `delete` /
/// `exists` operations. Useful as a development backend and for tests.
pub struct MemoryStoreAdapter {
    namespace: String,
    entries: DashMap<String, Value>,
}

impl MemoryStoreAdapter {
    /// Create a store with the default namespace.
    pub fn new() -> Self {
        Self::with_namespace("default")
    }

    /// Create a store with an explicit namespace.
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: DashMap::new(),
        }
    }

    /// Build from registry configuration.
    pub fn from_config(config: &AdapterProviderConfig) -> Self {
        match &config.namespace {
            Some(namespace) => Self::with_namespace(namespace.clone()),
            None => Self::new(),
        }
    }

    /// Number of stored entries across all tenants.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn scoped_key(&self, ctx: &UserContext, key: &str) -> String {
        format!("{}:{}:{}", self.namespace, ctx.tenant_id(), key)
    }

    fn required_str<'a>(payload: &'a Value, field: &str) -> Result<&'a str> {
        payload
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::invalid_argument(format!("missing string field '{field}'")))
    }
}

impl Default for MemoryStoreAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for MemoryStoreAdapter {
    fn name(&self) -> &str {
        "memory_store"
    }

    fn capability(&self) -> &str {
        "kv_storage"
    }

    async fn execute(&self, operation: &str, payload: &Value, ctx: &UserContext) -> Result<Value> {
        match operation {
            "put" => {
                let key = Self::required_str(payload, "key")?;
                let value = payload
                    .get("value")
                    .cloned()
                    .ok_or_else(|| Error::invalid_argument("missing field 'value'"))?;
                self.entries.insert(self.scoped_key(ctx, key), value);
                Ok(json!({"stored": true}))
            }
            "get" => {
                let key = Self::required_str(payload, "key")?;
                let value = self
                    .entries
                    .get(&self.scoped_key(ctx, key))
                    .map(|entry| entry.value().clone());
                Ok(json!({"found": value.is_some(), "value": value}))
            }
            "delete" => {
                let key = Self::required_str(payload, "key")?;
                let removed = self.entries.remove(&self.scoped_key(ctx, key)).is_some();
                Ok(json!({"deleted": removed}))
            }
            "exists" => {
                let key = Self::required_str(payload, "key")?;
                let exists = self.entries.contains_key(&self.scoped_key(ctx, key));
                Ok(json!({"exists": exists}))
            }
            other => Err(Error::invalid_argument(format!(
                "memory_store does not support operation '{other}'"
            ))),
        }
    }
}

#[linkme::distributed_slice(ADAPTER_PROVIDERS)]
static MEMORY_STORE_PROVIDER: AdapterProviderEntry = AdapterProviderEntry {
    name: "memory_store",
    description: "In-memory key/value storage adapter",
    factory: |config: &AdapterProviderConfig| {
        Ok(Arc::new(MemoryStoreAdapter::from_config(config)))
    },
};
