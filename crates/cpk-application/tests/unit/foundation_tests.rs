//! Tests for the foundation service base
//!
//! Covers delegation to wired utilities, the fire-and-forget telemetry
//! guarantee, and the tenant-isolation property under concurrency.

use std::sync::{Arc, Mutex};

use serde_json::json;

use cpk_application::foundation::ServiceFoundation;
use cpk_domain::context::{OperationContext, UserContext};
use cpk_domain::error::Error;
use cpk_domain::ports::{
    ActionSensitivity, ErrorHandlerUtility, SecurityUtility, TelemetrySink, TenantUtility,
};
use cpk_domain::telemetry::{ErrorReport, TelemetryEvent};

// ============================================================================
// Recording test doubles
// ============================================================================

#[derive(Default)]
struct RecordingErrorHandler {
    reports: Mutex<Vec<ErrorReport>>,
}

impl ErrorHandlerUtility for RecordingErrorHandler {
    fn handle(&self, error: &Error, ctx: &OperationContext) -> ErrorReport {
        let report = ErrorReport::from_error(error, ctx);
        self.reports.lock().unwrap().push(report.clone());
        report
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl TelemetrySink for RecordingSink {
    fn emit(&self, event: TelemetryEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Permission-list security: caller needs "resource:action".
struct PermissionSecurity;

impl SecurityUtility for PermissionSecurity {
    fn validate_access(
        &self,
        ctx: &UserContext,
        resource: &str,
        action: &str,
        _sensitivity: ActionSensitivity,
    ) -> bool {
        ctx.has_permission(&format!("{resource}:{action}"))
    }
}

/// The faithful default: access iff the context's tenant matches.
struct FaithfulTenant;

impl TenantUtility for FaithfulTenant {
    fn validate_tenant(&self, ctx: &UserContext, tenant_id: &str) -> bool {
        ctx.tenant_id() == tenant_id
    }
}

fn wired_foundation(
    handler: Arc<RecordingErrorHandler>,
    sink: Arc<RecordingSink>,
) -> ServiceFoundation {
    ServiceFoundation::new("content_steward", "smart_city")
        .with_error_handler(handler)
        .with_telemetry(sink)
        .with_security(Arc::new(PermissionSecurity))
        .with_tenant(Arc::new(FaithfulTenant))
}

// ============================================================================
// Error audit
// ============================================================================

#[test]
fn error_audit_forwards_to_utility_and_emits_telemetry() {
    let handler = Arc::new(RecordingErrorHandler::default());
    let sink = Arc::new(RecordingSink::default());
    let foundation = wired_foundation(Arc::clone(&handler), Arc::clone(&sink));

    let err = Error::adapter_failure("memory_store", "write rejected");
    let report = foundation.handle_error_with_audit(&err, "store_document", json!({"id": 7}));

    assert_eq!(report.error_code, "ADAPTER_FAILURE");
    assert_eq!(report.realm, "smart_city");
    assert_eq!(handler.reports.lock().unwrap().len(), 1);

    let events = sink.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "service.error");
    assert_eq!(events[0].attributes["error_code"], "ADAPTER_FAILURE");
}

#[test]
fn operation_telemetry_carries_service_identity() {
    let sink = Arc::new(RecordingSink::default());
    let foundation = ServiceFoundation::new("conductor", "smart_city")
        .with_telemetry(sink.clone());

    foundation.log_operation_with_telemetry("orchestrate", false, json!({"step": "parse"}));
    foundation.record_health_metric("queue_depth", 12.0, json!({"queue": "intake"}));

    let events = sink.events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].attributes["service"], "conductor");
    assert_eq!(events[0].attributes["success"], false);
    assert_eq!(events[1].name, "service.health_metric");
    assert_eq!(events[1].attributes["value"], 12.0);
}

// ============================================================================
// Access validation
// ============================================================================

#[test]
fn access_delegates_to_wired_security_utility() {
    let foundation = wired_foundation(
        Arc::new(RecordingErrorHandler::default()),
        Arc::new(RecordingSink::default()),
    );
    let ctx = UserContext::new("tenant-a", "user-1")
        .with_permissions(vec!["doc-1:read".to_string()]);

    assert!(foundation.validate_access(&ctx, "doc-1", "read", ActionSensitivity::Sensitive));
    assert!(!foundation.validate_access(&ctx, "doc-1", "delete", ActionSensitivity::Sensitive));
}

#[test]
fn tenant_validation_matches_only_same_tenant() {
    let foundation = wired_foundation(
        Arc::new(RecordingErrorHandler::default()),
        Arc::new(RecordingSink::default()),
    );
    let ctx_a = UserContext::new("tenant-a", "user-1");
    let ctx_b = UserContext::new("tenant-b", "user-2");

    assert!(foundation.validate_tenant_access(&ctx_a, "tenant-a"));
    assert!(!foundation.validate_tenant_access(&ctx_a, "tenant-b"));
    assert!(!foundation.validate_tenant_access(&ctx_b, "tenant-a"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tenant_isolation_holds_under_concurrency() {
    // Property: validate_tenant_access(ctx, t) == (ctx.tenant_id == t),
    // including when many requests hit the shared utility simultaneously.
    let foundation = Arc::new(wired_foundation(
        Arc::new(RecordingErrorHandler::default()),
        Arc::new(RecordingSink::default()),
    ));

    let mut handles = Vec::new();
    for i in 0..64 {
        let foundation = Arc::clone(&foundation);
        handles.push(tokio::spawn(async move {
            let own = format!("tenant-{}", i % 8);
            let other = format!("tenant-{}", (i + 1) % 8);
            let ctx = UserContext::new(own.clone(), "user");
            assert!(foundation.validate_tenant_access(&ctx, &own));
            assert!(!foundation.validate_tenant_access(&ctx, &other));
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
}
