//! Utility ports
//!
//! Cross-cutting capabilities shared read-only by all services. Utilities
//! are always present as typed handles: when no concrete implementation is
//! wired, the container substitutes a documented no-op default instead of
//! leaving callers to probe for existence. The two validators fail closed
//! by default; everything else degrades to a local log.

use crate::context::{OperationContext, UserContext};
use crate::error::Error;
use crate::telemetry::{ErrorReport, TelemetryEvent};

/// Whether an action is sensitive for access-control purposes.
///
/// Declared explicitly at the call site: absent a security utility,
/// sensitive actions are denied and non-sensitive ones allowed. There is
/// no inferred middle ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSensitivity {
    /// Deny when no security utility can vouch for the caller
    Sensitive,
    /// Explicitly safe to allow without a security utility
    NonSensitive,
}

/// Terminal error sink. Never fails; errors are terminal at this boundary.
pub trait ErrorHandlerUtility: Send + Sync {
    /// Record the error with its operation context and produce the
    /// structured report callers hand back up the stack.
    fn handle(&self, error: &Error, ctx: &OperationContext) -> ErrorReport;
}

/// Append-only telemetry sink, safe for concurrent emission from many
/// requests. Emission failures must never affect the caller's result.
pub trait TelemetrySink: Send + Sync {
    /// Emit one event. Fire and forget.
    fn emit(&self, event: TelemetryEvent);
}

/// Access-control decisions for (caller, resource, action) triples.
pub trait SecurityUtility: Send + Sync {
    /// Whether the caller may perform `action` on `resource`.
    ///
    /// `sensitivity` lets the deny-by-default implementation honor the
    /// fail-open carve-out for explicitly non-sensitive actions; concrete
    /// implementations are free to ignore it.
    fn validate_access(
        &self,
        ctx: &UserContext,
        resource: &str,
        action: &str,
        sensitivity: ActionSensitivity,
    ) -> bool;
}

/// Tenant-isolation decisions.
pub trait TenantUtility: Send + Sync {
    /// Whether the caller's tenant may touch `tenant_id`-scoped data.
    fn validate_tenant(&self, ctx: &UserContext, tenant_id: &str) -> bool;
}

/// Produces per-service logging scopes.
pub trait LoggerFactoryUtility: Send + Sync {
    /// A span carrying the service identity, entered around the service's
    /// operations.
    fn service_span(&self, service_name: &str) -> tracing::Span;
}
