//! Service ports
//!
//! [`ManagedService`] is the lifecycle contract the container drives during
//! its startup and shutdown phases. [`DomainService`] is the Tier 1 surface
//! the capability resolver invokes.

use async_trait::async_trait;
use serde_json::Value;

use crate::context::UserContext;
use crate::error::Result;

/// A component whose lifecycle the container owns.
#[async_trait]
pub trait ManagedService: Send + Sync {
    /// Unique service name
    fn name(&self) -> &str;

    /// Realm the service belongs to
    fn realm(&self) -> &str;

    /// One-time initialization during the container's startup phase.
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Teardown during the container's shutdown phase. Failures are
    /// recorded but never abort the drain of remaining services.
    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

/// Tier 1: a domain-scoped service answering for named capabilities.
#[async_trait]
pub trait DomainService: ManagedService {
    /// Capabilities this service answers for
    fn capabilities(&self) -> Vec<String>;

    /// Invoke one capability. A failure here is expected and retryable by
    /// design; the resolver logs a warning and falls through to Tier 2.
    async fn invoke(&self, capability: &str, arguments: &Value, ctx: &UserContext)
        -> Result<Value>;
}
