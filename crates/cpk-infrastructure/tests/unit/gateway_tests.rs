//! Gateway policy and audit tests

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use cpk_application::ports::gateway::GatewayPort;
use cpk_domain::capability::codes;
use cpk_domain::context::UserContext;
use cpk_domain::error::Result;
use cpk_domain::ports::Abstraction;
use cpk_domain::registration::{PolicyDecision, RealmAccessPolicy};
use cpk_infrastructure::gateway::PlatformGateway;
use cpk_infrastructure::utilities::InMemoryTelemetrySink;

struct EchoAbstraction;

#[async_trait]
impl Abstraction for EchoAbstraction {
    fn name(&self) -> &str {
        "session"
    }

    fn contract_id(&self) -> &str {
        "contract.session.v1"
    }

    async fn invoke(&self, operation: &str, _arguments: &Value, _ctx: &UserContext) -> Result<Value> {
        Ok(json!({"operation": operation}))
    }
}

fn gateway_with(
    policy: RealmAccessPolicy,
) -> (PlatformGateway, Arc<InMemoryTelemetrySink>) {
    let sink = Arc::new(InMemoryTelemetrySink::new());
    let mut abstractions: HashMap<String, Arc<dyn Abstraction>> = HashMap::new();
    abstractions.insert("session".to_string(), Arc::new(EchoAbstraction));
    let gateway = PlatformGateway::new(Arc::new(policy), abstractions, sink.clone());
    (gateway, sink)
}

#[test]
fn absent_policy_entry_is_denied_and_audited() {
    let (gateway, sink) = gateway_with(RealmAccessPolicy::new());

    let denial = gateway
        .get_abstraction("business_enablement", "session")
        .unwrap_err();

    assert_eq!(denial.code, codes::ACCESS_DENIED);
    let audits = sink.events_named("gateway.access_denied");
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].attributes["calling_realm"], "business_enablement");
    assert_eq!(audits[0].attributes["abstraction"], "session");
}

#[test]
fn explicit_denied_entry_is_access_denied() {
    let mut policy = RealmAccessPolicy::new();
    policy.insert("business_enablement", "session", PolicyDecision::Denied);
    let (gateway, _) = gateway_with(policy);

    let denial = gateway
        .get_abstraction("business_enablement", "session")
        .unwrap_err();
    assert_eq!(denial.code, codes::ACCESS_DENIED);
    assert!(denial.reason.contains("policy"));
}

#[test]
fn requires_soa_api_steers_to_the_domain_service_tier() {
    let mut policy = RealmAccessPolicy::new();
    policy.insert("journeys", "session", PolicyDecision::RequiresSoaApi);
    let (gateway, sink) = gateway_with(policy);

    let denial = gateway.get_abstraction("journeys", "session").unwrap_err();
    assert_eq!(denial.code, codes::REQUIRES_SOA_API);
    assert_eq!(
        sink.events_named("gateway.access_denied")[0].attributes["code"],
        codes::REQUIRES_SOA_API
    );
}

#[test]
fn allowed_entry_returns_the_abstraction() {
    let mut policy = RealmAccessPolicy::new();
    policy.insert("platform", "session", PolicyDecision::Allowed);
    let (gateway, sink) = gateway_with(policy);

    let abstraction = gateway.get_abstraction("platform", "session").unwrap();
    assert_eq!(abstraction.contract_id(), "contract.session.v1");
    assert!(sink.events_named("gateway.access_denied").is_empty());
}

#[test]
fn allowed_but_unregistered_abstraction_is_denied() {
    let mut policy = RealmAccessPolicy::new();
    policy.insert("platform", "content_store", PolicyDecision::Allowed);
    let (gateway, _) = gateway_with(policy);

    let denial = gateway
        .get_abstraction("platform", "content_store")
        .unwrap_err();
    assert_eq!(denial.code, codes::ACCESS_DENIED);
    assert!(denial.reason.contains("not registered"));
}

#[test]
fn decisions_are_reproducible() {
    let mut policy = RealmAccessPolicy::new();
    policy.insert("platform", "session", PolicyDecision::Allowed);
    let (gateway, _) = gateway_with(policy);

    for _ in 0..3 {
        assert!(gateway.get_abstraction("platform", "session").is_ok());
        assert!(gateway.get_abstraction("other", "session").is_err());
    }
}
