//! Foundation service base
//!
//! A capability set, not a class hierarchy: any component that composes a
//! [`ServiceFoundation`] gains uniform error handling, telemetry, health
//! metrics, and access validation without re-implementing them.
//!
//! Every utility handle is always present. When the container is not wired
//! with a concrete utility, the handle resolves to one of the documented
//! defaults below: telemetry and error handling degrade to a local log,
//! the two validators degrade to deny-by-default for sensitive actions.
//! There are no existence checks at call sites.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, warn};

use cpk_domain::context::{OperationContext, UserContext};
use cpk_domain::error::Error;
use cpk_domain::ports::{
    ActionSensitivity, ErrorHandlerUtility, LoggerFactoryUtility, SecurityUtility, TelemetrySink,
    TenantUtility,
};
use cpk_domain::telemetry::{ErrorReport, TelemetryEvent};

// ============================================================================
// Documented no-op defaults
// ============================================================================

/// Default error handler: logs locally and still produces the structured
/// report. Substituted when no error-handler utility is wired.
pub struct LogOnlyErrorHandler;

impl ErrorHandlerUtility for LogOnlyErrorHandler {
    fn handle(&self, error: &Error, ctx: &OperationContext) -> ErrorReport {
        let report = ErrorReport::from_error(error, ctx);
        warn!(
            service = %ctx.service,
            operation = %ctx.operation,
            error_code = %report.error_code,
            "error handled locally (no error-handler utility wired): {}",
            report.message
        );
        report
    }
}

/// Default telemetry sink: drops events after a debug log.
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn emit(&self, event: TelemetryEvent) {
        debug!(event = %event.name, "telemetry dropped (no sink wired)");
    }
}

/// Default security validator: zero-trust. Sensitive actions are denied,
/// explicitly non-sensitive ones allowed.
pub struct DenyByDefaultSecurity;

impl SecurityUtility for DenyByDefaultSecurity {
    fn validate_access(
        &self,
        _ctx: &UserContext,
        resource: &str,
        action: &str,
        sensitivity: ActionSensitivity,
    ) -> bool {
        match sensitivity {
            ActionSensitivity::Sensitive => {
                warn!(resource, action, "sensitive action denied: no security utility wired");
                false
            }
            ActionSensitivity::NonSensitive => true,
        }
    }
}

/// Default tenant validator: denies everything. Tenant checks are
/// inherently sensitive, so there is no fail-open carve-out here.
pub struct DenyByDefaultTenant;

impl TenantUtility for DenyByDefaultTenant {
    fn validate_tenant(&self, _ctx: &UserContext, tenant_id: &str) -> bool {
        warn!(tenant_id, "tenant access denied: no tenant utility wired");
        false
    }
}

/// Default logger factory: plain per-service info span.
pub struct SpanLoggerFactory;

impl LoggerFactoryUtility for SpanLoggerFactory {
    fn service_span(&self, service_name: &str) -> tracing::Span {
        tracing::info_span!("service", name = %service_name)
    }
}

// ============================================================================
// ServiceFoundation
// ============================================================================

/// Uniform cross-cutting operations for one service.
///
/// Cheap to clone; all handles are shared.
#[derive(Clone)]
pub struct ServiceFoundation {
    service_name: String,
    realm: String,
    error_handler: Arc<dyn ErrorHandlerUtility>,
    telemetry: Arc<dyn TelemetrySink>,
    security: Arc<dyn SecurityUtility>,
    tenant: Arc<dyn TenantUtility>,
    logger_factory: Arc<dyn LoggerFactoryUtility>,
}

impl ServiceFoundation {
    /// Create a foundation with the documented defaults for every utility.
    pub fn new(service_name: impl Into<String>, realm: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            realm: realm.into(),
            error_handler: Arc::new(LogOnlyErrorHandler),
            telemetry: Arc::new(NoopTelemetrySink),
            security: Arc::new(DenyByDefaultSecurity),
            tenant: Arc::new(DenyByDefaultTenant),
            logger_factory: Arc::new(SpanLoggerFactory),
        }
    }

    /// Wire a concrete error handler.
    pub fn with_error_handler(mut self, handler: Arc<dyn ErrorHandlerUtility>) -> Self {
        self.error_handler = handler;
        self
    }

    /// Wire a concrete telemetry sink.
    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = sink;
        self
    }

    /// Wire a concrete security validator.
    pub fn with_security(mut self, security: Arc<dyn SecurityUtility>) -> Self {
        self.security = security;
        self
    }

    /// Wire a concrete tenant validator.
    pub fn with_tenant(mut self, tenant: Arc<dyn TenantUtility>) -> Self {
        self.tenant = tenant;
        self
    }

    /// Wire a concrete logger factory.
    pub fn with_logger_factory(mut self, factory: Arc<dyn LoggerFactoryUtility>) -> Self {
        self.logger_factory = factory;
        self
    }

    /// Service identity this foundation reports under.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Realm the service belongs to.
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// A logging span carrying the service identity.
    pub fn service_span(&self) -> tracing::Span {
        self.logger_factory.service_span(&self.service_name)
    }

    /// Forward an error to the error-handler utility with full attribution.
    ///
    /// Always returns a structured report and never raises further; errors
    /// are terminal at this boundary.
    pub fn handle_error_with_audit(&self, error: &Error, operation: &str, extra: Value) -> ErrorReport {
        let ctx = OperationContext::new(operation, &self.service_name, &self.realm)
            .with_extra(extra);
        let report = self.error_handler.handle(error, &ctx);
        self.telemetry.emit(TelemetryEvent::new(
            "service.error",
            json!({
                "service": self.service_name,
                "operation": operation,
                "error_code": report.error_code,
            }),
        ));
        report
    }

    /// Fire-and-forget operation telemetry. A failing sink never affects
    /// the caller's result.
    pub fn log_operation_with_telemetry(&self, operation: &str, success: bool, attributes: Value) {
        self.telemetry.emit(TelemetryEvent::new(
            "service.operation",
            json!({
                "service": self.service_name,
                "operation": operation,
                "success": success,
                "attributes": attributes,
            }),
        ));
    }

    /// Fire-and-forget health metric emission.
    pub fn record_health_metric(&self, metric_name: &str, value: f64, tags: Value) {
        self.telemetry.emit(TelemetryEvent::new(
            "service.health_metric",
            json!({
                "service": self.service_name,
                "metric": metric_name,
                "value": value,
                "tags": tags,
            }),
        ));
    }

    /// Whether the caller may perform `action` on `resource`.
    ///
    /// Delegates to the security utility; with no utility wired this is
    /// deny-by-default for sensitive actions.
    pub fn validate_access(
        &self,
        ctx: &UserContext,
        resource_id: &str,
        action: &str,
        sensitivity: ActionSensitivity,
    ) -> bool {
        self.security
            .validate_access(ctx, resource_id, action, sensitivity)
    }

    /// Whether the caller's tenant may touch `tenant_id`-scoped data.
    /// Fail-closed when no tenant utility is wired.
    pub fn validate_tenant_access(&self, ctx: &UserContext, tenant_id: &str) -> bool {
        self.tenant.validate_tenant(ctx, tenant_id)
    }
}

impl std::fmt::Debug for ServiceFoundation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceFoundation")
            .field("service_name", &self.service_name)
            .field("realm", &self.realm)
            .finish_non_exhaustive()
    }
}
