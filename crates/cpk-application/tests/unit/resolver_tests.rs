//! Tests for the three-tier capability resolver
//!
//! Tier ordering is verified with call-count assertions on mocked tiers:
//! a later tier must never run once an earlier tier succeeds, and each
//! tier is attempted at most once per request.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use cpk_application::catalog::{CapabilityBinding, CapabilityRegistry};
use cpk_application::ports::gateway::{GatewayDenial, GatewayPort};
use cpk_application::resolver::CapabilityResolver;
use cpk_domain::capability::{codes, CapabilityRequest, Tier};
use cpk_domain::context::UserContext;
use cpk_domain::error::{Error, Result};
use cpk_domain::ports::{Abstraction, DomainService, ManagedService};

// ============================================================================
// Mock tiers
// ============================================================================

#[derive(Clone, Copy)]
enum Behavior {
    Succeed,
    Fail,
    Hang,
}

struct MockDomainService {
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ManagedService for MockDomainService {
    fn name(&self) -> &str {
        "mock_domain_service"
    }
    fn realm(&self) -> &str {
        "business_enablement"
    }
}

#[async_trait]
impl DomainService for MockDomainService {
    fn capabilities(&self) -> Vec<String> {
        vec!["document.store".to_string()]
    }

    async fn invoke(&self, _capability: &str, _arguments: &Value, _ctx: &UserContext) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Succeed => Ok(json!({"source": "tier1"})),
            Behavior::Fail => Err(Error::internal("domain service exploded")),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

struct MockAbstraction {
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Abstraction for MockAbstraction {
    fn name(&self) -> &str {
        "mock_abstraction"
    }
    fn contract_id(&self) -> &str {
        "contract.mock.v1"
    }

    async fn invoke(&self, _operation: &str, _arguments: &Value, _ctx: &UserContext) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Succeed => Ok(json!({"source": "tier2"})),
            Behavior::Fail => Err(Error::adapter_failure("mock_adapter", "backend unavailable")),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

struct MockGateway {
    outcome: std::result::Result<Arc<dyn Abstraction>, GatewayDenial>,
    calls: Arc<AtomicUsize>,
}

impl GatewayPort for MockGateway {
    fn get_abstraction(
        &self,
        calling_realm: &str,
        abstraction_name: &str,
    ) -> std::result::Result<Arc<dyn Abstraction>, GatewayDenial> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(abstraction) => Ok(Arc::clone(abstraction)),
            Err(denial) => Err(GatewayDenial {
                realm: calling_realm.to_string(),
                abstraction: abstraction_name.to_string(),
                code: denial.code,
                reason: denial.reason.clone(),
            }),
        }
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    resolver: CapabilityResolver,
    tier1_calls: Arc<AtomicUsize>,
    tier2_calls: Arc<AtomicUsize>,
    gateway_calls: Arc<AtomicUsize>,
}

fn harness(tier1: Option<Behavior>, tier2: Option<Behavior>) -> Harness {
    let tier1_calls = Arc::new(AtomicUsize::new(0));
    let tier2_calls = Arc::new(AtomicUsize::new(0));
    let gateway_calls = Arc::new(AtomicUsize::new(0));

    let mut binding = CapabilityBinding::default();
    let mut registry = CapabilityRegistry::new();

    let gateway_outcome: std::result::Result<Arc<dyn Abstraction>, GatewayDenial> = match tier2 {
        Some(behavior) => Ok(Arc::new(MockAbstraction {
            behavior,
            calls: Arc::clone(&tier2_calls),
        })),
        None => Err(GatewayDenial::access_denied(
            "business_enablement",
            "mock_abstraction",
            "no policy entry",
        )),
    };
    // The binding always names the abstraction so denial paths are exercised.
    binding = binding.with_abstraction("mock_abstraction");

    let gateway = Arc::new(MockGateway {
        outcome: gateway_outcome,
        calls: Arc::clone(&gateway_calls),
    });

    let mut resolver;
    if let Some(behavior) = tier1 {
        binding = binding.with_domain_service("mock_domain_service");
        registry.bind("document.store", binding);
        resolver = CapabilityResolver::new("business_enablement", Arc::new(registry), gateway);
        resolver = resolver.with_domain_service(Arc::new(MockDomainService {
            behavior,
            calls: Arc::clone(&tier1_calls),
        }));
    } else {
        registry.bind("document.store", binding);
        resolver = CapabilityResolver::new("business_enablement", Arc::new(registry), gateway);
    }
    resolver = resolver.with_tier_timeout(Duration::from_millis(100));

    Harness {
        resolver,
        tier1_calls,
        tier2_calls,
        gateway_calls,
    }
}

fn request() -> CapabilityRequest {
    CapabilityRequest::new(
        "document.store",
        json!({"content": "hello"}),
        UserContext::new("tenant-a", "user-1"),
    )
}

// ============================================================================
// Tier ordering
// ============================================================================

#[tokio::test]
async fn tier1_success_short_circuits_later_tiers() {
    let h = harness(Some(Behavior::Succeed), Some(Behavior::Succeed));
    let response = h.resolver.resolve_capability(&request()).await;

    assert!(response.success);
    assert_eq!(response.tier_satisfied, Tier::DomainService);
    assert_eq!(response.data.unwrap()["source"], "tier1");
    assert_eq!(h.tier1_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.gateway_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.tier2_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn tier1_failure_falls_through_to_tier2() {
    // Scenario B: the domain service raises; the gateway abstraction succeeds.
    let h = harness(Some(Behavior::Fail), Some(Behavior::Succeed));
    let response = h.resolver.resolve_capability(&request()).await;

    assert!(response.success);
    assert_eq!(response.tier_satisfied, Tier::GatewayAbstraction);
    assert_eq!(response.data.unwrap()["source"], "tier2");
    assert_eq!(h.tier1_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.tier2_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn both_tiers_failing_exhausts_to_structured_response() {
    let h = harness(Some(Behavior::Fail), Some(Behavior::Fail));
    let response = h.resolver.resolve_capability(&request()).await;

    assert!(!response.success);
    assert_eq!(
        response.error_code.as_deref(),
        Some(codes::CAPABILITY_UNAVAILABLE)
    );
    assert_eq!(response.tier_satisfied, Tier::None);
    let message = response.error.unwrap();
    assert!(message.contains("domain_service"));
    assert!(message.contains("gateway_abstraction"));
    // At most one attempt per tier - no retries inside the resolver.
    assert_eq!(h.tier1_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.tier2_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn gateway_denial_falls_through_to_graceful_failure() {
    let h = harness(Some(Behavior::Fail), None);
    let response = h.resolver.resolve_capability(&request()).await;

    assert!(!response.success);
    assert_eq!(
        response.error_code.as_deref(),
        Some(codes::CAPABILITY_UNAVAILABLE)
    );
    assert_eq!(h.gateway_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.tier2_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unbound_capability_is_unavailable() {
    let h = harness(Some(Behavior::Succeed), Some(Behavior::Succeed));
    let unbound = CapabilityRequest::new(
        "workflow.run",
        Value::Null,
        UserContext::new("tenant-a", "user-1"),
    );
    let response = h.resolver.resolve_capability(&unbound).await;

    assert!(!response.success);
    assert_eq!(
        response.error_code.as_deref(),
        Some(codes::CAPABILITY_UNAVAILABLE)
    );
    assert_eq!(h.tier1_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.gateway_calls.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Timeouts and cancellation
// ============================================================================

#[tokio::test]
async fn slow_tier1_times_out_and_tier2_still_runs() {
    // Per-tier deadline: a hanging Tier 1 must not starve Tier 2.
    let h = harness(Some(Behavior::Hang), Some(Behavior::Succeed));
    let response = h.resolver.resolve_capability(&request()).await;

    assert!(response.success);
    assert_eq!(response.tier_satisfied, Tier::GatewayAbstraction);
    assert_eq!(h.tier1_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.tier2_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn pre_cancelled_request_reports_cancelled() {
    let h = harness(Some(Behavior::Succeed), Some(Behavior::Succeed));
    let req = request();
    req.context.cancellation().cancel();

    let response = h.resolver.resolve_capability(&req).await;

    assert!(!response.success);
    assert_eq!(response.error_code.as_deref(), Some(codes::CANCELLED));
    assert_eq!(response.tier_satisfied, Tier::None);
    assert_eq!(h.tier1_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.gateway_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancellation_mid_tier_short_circuits_remaining_tiers() {
    let h = harness(Some(Behavior::Hang), Some(Behavior::Succeed));
    let req = request();
    let token = req.context.cancellation().clone();

    // Cancel while Tier 1 is hanging.
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();
    });

    let response = h.resolver.resolve_capability(&req).await;

    assert!(!response.success);
    assert_eq!(response.error_code.as_deref(), Some(codes::CANCELLED));
    // Tier 2 never started: cancellation short-circuits, it does not fall through.
    assert_eq!(h.gateway_calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.tier2_calls.load(Ordering::SeqCst), 0);
}
