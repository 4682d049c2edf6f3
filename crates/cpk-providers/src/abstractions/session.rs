//! Session abstraction
//!
//! Session lifecycle (`create` / `get` / `end`) over a single key/value
//! adapter. Session identifiers are random v4 UUIDs; session records are
//! stored under the adapter's tenant-scoped keyspace, so sessions are
//! tenant-isolated for free.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use cpk_application::ports::registry::{
    AbstractionProviderConfig, AbstractionProviderEntry, ABSTRACTION_PROVIDERS,
};
use cpk_domain::context::UserContext;
use cpk_domain::error::{Error, Result};
use cpk_domain::ports::{Abstraction, Adapter};

const DEFAULT_CONTRACT: &str = "contract.session.v1";

/// Session management over a key/value storage adapter.
pub struct SessionAbstraction {
    contract_id: String,
    store: Arc<dyn Adapter>,
}

impl SessionAbstraction {
    pub fn new(store: Arc<dyn Adapter>) -> Self {
        Self {
            contract_id: DEFAULT_CONTRACT.to_string(),
            store,
        }
    }

    /// Build from registry configuration and resolved adapters.
    pub fn from_config(config: &AbstractionProviderConfig, store: Arc<dyn Adapter>) -> Self {
        let contract_id = if config.contract_id.is_empty() {
            DEFAULT_CONTRACT.to_string()
        } else {
            config.contract_id.clone()
        };
        Self { contract_id, store }
    }

    fn session_key(session_id: &str) -> String {
        format!("session:{session_id}")
    }

    async fn store_execute(&self, operation: &str, payload: &Value, ctx: &UserContext) -> Result<Value> {
        self.store
            .execute(operation, payload, ctx)
            .await
            .map_err(|err| {
                Error::adapter_failure_with_source(
                    self.store.name(),
                    format!("session store operation '{operation}' failed"),
                    err,
                )
            })
    }

    async fn create(&self, arguments: &Value, ctx: &UserContext) -> Result<Value> {
        let session_id = Uuid::new_v4().to_string();
        let record = json!({
            "session_id": session_id,
            "tenant_id": ctx.tenant_id(),
            "principal": ctx.principal(),
            "created_at": Utc::now().to_rfc3339(),
            "active": true,
            "attributes": arguments.get("attributes").cloned().unwrap_or_else(|| json!({})),
        });
        self.store_execute(
            "put",
            &json!({"key": Self::session_key(&session_id), "value": record}),
            ctx,
        )
        .await?;
        debug!(session_id, tenant = ctx.tenant_id(), "session created");
        Ok(json!({"session_id": session_id}))
    }

    async fn get(&self, arguments: &Value, ctx: &UserContext) -> Result<Value> {
        let session_id = required_str(arguments, "session_id")?;
        let stored = self
            .store_execute("get", &json!({"key": Self::session_key(session_id)}), ctx)
            .await?;
        if stored["found"] == json!(true) {
            Ok(stored["value"].clone())
        } else {
            Err(Error::not_found(format!("session '{session_id}'")))
        }
    }

    async fn end(&self, arguments: &Value, ctx: &UserContext) -> Result<Value> {
        let session_id = required_str(arguments, "session_id")?;
        let removed = self
            .store_execute("delete", &json!({"key": Self::session_key(session_id)}), ctx)
            .await?;
        Ok(json!({"ended": removed["deleted"] == json!(true)}))
    }
}

fn required_str<'a>(arguments: &'a Value, field: &str) -> Result<&'a str> {
    arguments
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::invalid_argument(format!("missing string field '{field}'")))
}

#[async_trait]
impl Abstraction for SessionAbstraction {
    fn name(&self) -> &str {
        "session"
    }

    fn contract_id(&self) -> &str {
        &self.contract_id
    }

    async fn invoke(&self, operation: &str, arguments: &Value, ctx: &UserContext) -> Result<Value> {
        match operation {
            "create" => self.create(arguments, ctx).await,
            "get" => self.get(arguments, ctx).await,
            "end" => self.end(arguments, ctx).await,
            other => Err(Error::invalid_argument(format!(
                "session does not support operation '{other}'"
            ))),
        }
    }
}

#[linkme::distributed_slice(ABSTRACTION_PROVIDERS)]
static SESSION_PROVIDER: AbstractionProviderEntry = AbstractionProviderEntry {
    name: "session",
    description: "Session lifecycle over a key/value storage adapter",
    factory: |config, adapters| {
        let store = adapters
            .first()
            .cloned()
            .ok_or_else(|| "session abstraction requires one storage adapter".to_string())?;
        Ok(Arc::new(SessionAbstraction::from_config(config, store)))
    },
};
