//! Null adapter
//!
//! Accepts every operation and returns `null`. Used as a placeholder in
//! configurations where a capability slot must be filled but no real
//! backend is wired yet.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use cpk_application::ports::registry::{AdapterProviderConfig, AdapterProviderEntry, ADAPTER_PROVIDERS};
use cpk_domain::context::UserContext;
use cpk_domain::error::Result;
use cpk_domain::ports::Adapter;

/// Adapter that accepts all operations and returns `Value::Null`.
pub struct NullAdapter;

impl NullAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for NullAdapter {
    fn name(&self) -> &str {
        "null"
    }

    fn capability(&self) -> &str {
        "null"
    }

    async fn execute(&self, operation: &str, _payload: &Value, ctx: &UserContext) -> Result<Value> {
        debug!(operation, tenant = ctx.tenant_id(), "null adapter invoked");
        Ok(Value::Null)
    }
}

#[linkme::distributed_slice(ADAPTER_PROVIDERS)]
static NULL_PROVIDER: AdapterProviderEntry = AdapterProviderEntry {
    name: "null",
    description: "Placeholder adapter that accepts all operations and returns null",
    factory: |_config: &AdapterProviderConfig| Ok(Arc::new(NullAdapter::new())),
};
