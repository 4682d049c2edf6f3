//! Adapter port
//!
//! An adapter is a thin wrapper over one concrete technology exposing one
//! narrow capability and no business semantics. Adapters are the only
//! suspension points in the core: everything above them is CPU-bound.

use async_trait::async_trait;
use serde_json::Value;

use crate::context::UserContext;
use crate::error::Result;

/// One narrow technology capability.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Unique adapter name, e.g. `"memory_store"`
    fn name(&self) -> &str;

    /// The narrow capability this adapter exposes, e.g. `"kv_storage"`
    fn capability(&self) -> &str;

    /// Execute one operation against the underlying technology.
    ///
    /// Failures are reported as [`crate::error::Error::AdapterFailure`] with
    /// a summarized message; transport detail stays out of the error text.
    async fn execute(&self, operation: &str, payload: &Value, ctx: &UserContext) -> Result<Value>;

    /// Cheap liveness probe. Defaults to healthy for adapters with no
    /// external connection to lose.
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for dyn Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("name", &self.name())
            .field("capability", &self.capability())
            .finish()
    }
}
