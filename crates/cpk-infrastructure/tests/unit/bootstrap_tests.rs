//! End-to-end bootstrap tests
//!
//! Configuration → container → gateway → resolver, with real providers.

use serde_json::json;

use cpk_application::ports::gateway::GatewayPort;
use cpk_domain::capability::{codes, CapabilityRequest, Tier};
use cpk_domain::context::UserContext;
use cpk_domain::registration::{LifecycleState, PolicyDecision};
use cpk_infrastructure::config::{
    AbstractionConfig, AdapterConfig, PlatformConfig, PolicyRule,
};
use cpk_infrastructure::di::ServiceDefinition;
use cpk_infrastructure::{init_platform, init_platform_with_services};

use super::common::{journal, TestService};

fn platform_config() -> PlatformConfig {
    let mut config = PlatformConfig::default();
    config.platform.realm = "smart_city".to_string();
    config.adapters.insert(
        "session_store".to_string(),
        AdapterConfig {
            provider: "memory_store".to_string(),
            namespace: Some("sessions".to_string()),
            ..Default::default()
        },
    );
    config.abstractions.insert(
        "session".to_string(),
        AbstractionConfig {
            provider: None,
            adapters: vec!["session_store".to_string()],
            contract: "contract.session.v1".to_string(),
            realms: vec!["smart_city".to_string()],
            extra: Default::default(),
        },
    );
    config.policies.push(PolicyRule {
        realm: "smart_city".to_string(),
        abstraction: "session".to_string(),
        decision: PolicyDecision::Allowed,
    });
    config
}

#[tokio::test]
async fn platform_assembles_from_configuration() {
    let context = init_platform(platform_config()).await.unwrap();

    let container = context.container();
    assert!(container.get_adapter("session_store").is_some());
    assert!(container.get_abstraction("session").is_some());
    assert_eq!(context.resolver().calling_realm(), "smart_city");
}

#[tokio::test]
async fn gateway_honors_configured_policy() {
    let context = init_platform(platform_config()).await.unwrap();
    let gateway = context.gateway();

    let session = gateway.get_abstraction("smart_city", "session").unwrap();
    let ctx = UserContext::new("tenant-a", "user-1");
    let created = session.invoke("create", &json!({}), &ctx).await.unwrap();
    assert!(created["session_id"].is_string());

    // No policy entry for this realm: default deny.
    let denial = gateway
        .get_abstraction("business_enablement", "session")
        .unwrap_err();
    assert_eq!(denial.code, codes::ACCESS_DENIED);
}

#[tokio::test]
async fn resolver_satisfies_tier_one_from_registered_services() {
    let journal = journal();
    let steward = TestService::with_capabilities(
        "content_steward",
        "smart_city",
        &["document.store"],
        journal,
    );

    let context = init_platform_with_services(
        platform_config(),
        vec![ServiceDefinition::new(steward, true)],
    )
    .await
    .unwrap();

    let request = CapabilityRequest {
        capability: "document.store".to_string(),
        arguments: json!({"id": "doc-1"}),
        context: UserContext::new("tenant-a", "user-1"),
    };
    let response = context.resolver().resolve_capability(&request).await;

    assert!(response.success);
    assert_eq!(response.tier_satisfied, Tier::DomainService);
}

#[tokio::test]
async fn unbound_capability_fails_gracefully() {
    let context = init_platform(platform_config()).await.unwrap();

    let request = CapabilityRequest {
        capability: "workflow.run".to_string(),
        arguments: json!({}),
        context: UserContext::new("tenant-a", "user-1"),
    };
    let response = context.resolver().resolve_capability(&request).await;

    assert!(!response.success);
    assert_eq!(
        response.error_code.as_deref(),
        Some(codes::CAPABILITY_UNAVAILABLE)
    );
    assert_eq!(response.tier_satisfied, Tier::None);
}

#[tokio::test]
async fn shutdown_drains_registered_services() {
    let journal = journal();
    let steward = TestService::with_capabilities(
        "content_steward",
        "smart_city",
        &["document.store"],
        journal.clone(),
    );

    let context = init_platform_with_services(
        platform_config(),
        vec![ServiceDefinition::new(steward, true)],
    )
    .await
    .unwrap();

    let failures = context.shutdown().await;
    assert!(failures.is_empty());
    assert_eq!(
        context.container().lifecycle_state("content_steward"),
        Some(LifecycleState::ShutDown)
    );
}
