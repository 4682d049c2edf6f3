//! Per-request caller context
//!
//! A [`UserContext`] is constructed once per inbound request and never
//! mutated afterwards; narrowing produces a derived copy. The embedded
//! cancellation token lets in-flight adapter calls be aborted and remaining
//! resolution tiers short-circuited.

use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Caller identity, tenancy, and cancellation scope for one request.
///
/// Fields are private; the tenant identifier is immutable for the life of
/// the request by construction.
#[derive(Debug, Clone)]
pub struct UserContext {
    tenant_id: String,
    principal: String,
    permissions: Vec<String>,
    cancellation: CancellationToken,
}

impl UserContext {
    /// Create a context for the given tenant and principal.
    pub fn new(tenant_id: impl Into<String>, principal: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            principal: principal.into(),
            permissions: Vec::new(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Attach the caller's permission set.
    pub fn with_permissions(mut self, permissions: Vec<String>) -> Self {
        self.permissions = permissions;
        self
    }

    /// Attach an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Tenant identifier. Set once at construction.
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Principal identity of the caller.
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// Permission set granted to the caller.
    pub fn permissions(&self) -> &[String] {
        &self.permissions
    }

    /// Whether the caller holds a specific permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// The request-scoped cancellation token.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Whether the request has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Derive a narrowed copy with a subset of permissions.
    ///
    /// The tenant identifier and cancellation scope carry over unchanged;
    /// permissions not held by this context are silently dropped rather
    /// than granted.
    pub fn derive_scoped(&self, permissions: &[&str]) -> Self {
        let narrowed = permissions
            .iter()
            .filter(|p| self.has_permission(p))
            .map(|p| (*p).to_string())
            .collect();
        Self {
            tenant_id: self.tenant_id.clone(),
            principal: self.principal.clone(),
            permissions: narrowed,
            cancellation: self.cancellation.clone(),
        }
    }
}

/// Context accompanying every audited error.
///
/// Forwarded to the error-handler utility together with the original error
/// so failures are attributable to a service and operation.
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Operation name, e.g. `"resolve_capability"`
    pub operation: String,
    /// Identity of the service reporting the error
    pub service: String,
    /// Realm the service belongs to
    pub realm: String,
    /// Free-form structured detail
    pub extra: Value,
}

impl OperationContext {
    /// Create an operation context for a service operation.
    pub fn new(
        operation: impl Into<String>,
        service: impl Into<String>,
        realm: impl Into<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            service: service.into(),
            realm: realm.into(),
            extra: Value::Null,
        }
    }

    /// Attach structured detail.
    pub fn with_extra(mut self, extra: Value) -> Self {
        self.extra = extra;
        self
    }
}
