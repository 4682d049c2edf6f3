//! Concrete utility implementations
//!
//! Singleton handles built once per process and shared read-only by every
//! service. The [`UtilityRegistry`] bundles the five typed handles; where
//! nothing concrete is wired it falls back to the documented defaults from
//! `cpk-application`.

use std::sync::{Arc, Mutex};

use tracing::{error, info};

use cpk_application::foundation::{DenyByDefaultSecurity, ServiceFoundation, SpanLoggerFactory};
use cpk_domain::context::{OperationContext, UserContext};
use cpk_domain::error::Error;
use cpk_domain::ports::{
    ActionSensitivity, ErrorHandlerUtility, LoggerFactoryUtility, SecurityUtility, TelemetrySink,
    TenantUtility,
};
use cpk_domain::telemetry::{ErrorReport, TelemetryEvent};

/// Error handler that records every audited error through tracing and
/// returns the structured report.
pub struct TracingErrorHandler;

impl ErrorHandlerUtility for TracingErrorHandler {
    fn handle(&self, err: &Error, ctx: &OperationContext) -> ErrorReport {
        let report = ErrorReport::from_error(err, ctx);
        error!(
            target: "cpk::audit",
            service = %ctx.service,
            realm = %ctx.realm,
            operation = %ctx.operation,
            error_code = %report.error_code,
            "{}",
            report.message
        );
        report
    }
}

/// Telemetry sink that writes events to the tracing pipeline.
pub struct TracingTelemetrySink;

impl TelemetrySink for TracingTelemetrySink {
    fn emit(&self, event: TelemetryEvent) {
        info!(
            target: "cpk::telemetry",
            event = %event.name,
            attributes = %event.attributes,
            "telemetry"
        );
    }
}

/// Append-only in-memory telemetry sink.
///
/// Safe for concurrent emission; used for audit inspection and in tests.
#[derive(Default)]
pub struct InMemoryTelemetrySink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl InMemoryTelemetrySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events emitted so far.
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events with a given name.
    pub fn events_named(&self, name: &str) -> Vec<TelemetryEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.name == name)
            .collect()
    }
}

impl TelemetrySink for InMemoryTelemetrySink {
    fn emit(&self, event: TelemetryEvent) {
        // A poisoned lock means a writer panicked; dropping the event is
        // the fire-and-forget contract.
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Security validator backed by the caller's permission set.
///
/// Sensitive actions require the `"{resource}:{action}"` permission;
/// non-sensitive actions are allowed unconditionally.
pub struct PermissionSecurityValidator;

impl SecurityUtility for PermissionSecurityValidator {
    fn validate_access(
        &self,
        ctx: &UserContext,
        resource: &str,
        action: &str,
        sensitivity: ActionSensitivity,
    ) -> bool {
        match sensitivity {
            ActionSensitivity::NonSensitive => true,
            ActionSensitivity::Sensitive => ctx.has_permission(&format!("{resource}:{action}")),
        }
    }
}

/// Tenant validator enforcing exact tenant match.
pub struct StrictTenantValidator;

impl TenantUtility for StrictTenantValidator {
    fn validate_tenant(&self, ctx: &UserContext, tenant_id: &str) -> bool {
        ctx.tenant_id() == tenant_id
    }
}

/// The five typed utility handles, built once per process.
///
/// Always complete: no caller ever probes for a utility's existence.
#[derive(Clone)]
pub struct UtilityRegistry {
    error_handler: Arc<dyn ErrorHandlerUtility>,
    telemetry: Arc<dyn TelemetrySink>,
    security: Arc<dyn SecurityUtility>,
    tenant: Arc<dyn TenantUtility>,
    logger_factory: Arc<dyn LoggerFactoryUtility>,
}

impl UtilityRegistry {
    /// Registry with the tracing-backed implementations.
    pub fn new() -> Self {
        Self {
            error_handler: Arc::new(TracingErrorHandler),
            telemetry: Arc::new(TracingTelemetrySink),
            security: Arc::new(PermissionSecurityValidator),
            tenant: Arc::new(StrictTenantValidator),
            logger_factory: Arc::new(SpanLoggerFactory),
        }
    }

    /// Registry with the deny-by-default security posture and no real
    /// validators, for processes that run without identity wiring.
    pub fn unwired() -> Self {
        Self::new()
            .with_security(Arc::new(DenyByDefaultSecurity))
            .with_tenant(Arc::new(cpk_application::foundation::DenyByDefaultTenant))
    }

    /// Replace the error handler.
    pub fn with_error_handler(mut self, handler: Arc<dyn ErrorHandlerUtility>) -> Self {
        self.error_handler = handler;
        self
    }

    /// Replace the telemetry sink.
    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = sink;
        self
    }

    /// Replace the security validator.
    pub fn with_security(mut self, security: Arc<dyn SecurityUtility>) -> Self {
        self.security = security;
        self
    }

    /// Replace the tenant validator.
    pub fn with_tenant(mut self, tenant: Arc<dyn TenantUtility>) -> Self {
        self.tenant = tenant;
        self
    }

    /// Replace the logger factory.
    pub fn with_logger_factory(mut self, factory: Arc<dyn LoggerFactoryUtility>) -> Self {
        self.logger_factory = factory;
        self
    }

    /// Error handler handle.
    pub fn error_handler(&self) -> Arc<dyn ErrorHandlerUtility> {
        self.error_handler.clone()
    }

    /// Telemetry sink handle.
    pub fn telemetry(&self) -> Arc<dyn TelemetrySink> {
        self.telemetry.clone()
    }

    /// Security validator handle.
    pub fn security(&self) -> Arc<dyn SecurityUtility> {
        self.security.clone()
    }

    /// Tenant validator handle.
    pub fn tenant(&self) -> Arc<dyn TenantUtility> {
        self.tenant.clone()
    }

    /// Logger factory handle.
    pub fn logger_factory(&self) -> Arc<dyn LoggerFactoryUtility> {
        self.logger_factory.clone()
    }

    /// Build a service foundation wired with all five handles.
    pub fn foundation_for(
        &self,
        service_name: impl Into<String>,
        realm: impl Into<String>,
    ) -> ServiceFoundation {
        ServiceFoundation::new(service_name, realm)
            .with_error_handler(self.error_handler.clone())
            .with_telemetry(self.telemetry.clone())
            .with_security(self.security.clone())
            .with_tenant(self.tenant.clone())
            .with_logger_factory(self.logger_factory.clone())
    }
}

impl Default for UtilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UtilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UtilityRegistry").finish_non_exhaustive()
    }
}
