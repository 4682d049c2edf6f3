//! Provider registry tests
//!
//! Linking cpk-providers pulls its linkme registrations into this test
//! binary, so resolution by name exercises the real distributed slices.

use std::sync::Arc;

use serde_json::{json, Value};

use cpk_application::ports::registry::{
    list_abstraction_providers, list_adapter_providers, resolve_abstraction_provider,
    resolve_adapter_provider, AbstractionProviderConfig, AdapterProviderConfig,
};
use cpk_domain::context::UserContext;
use cpk_domain::ports::Adapter;

// Force linking of the provider crate so its registrations are present.
#[allow(unused_extern_crates)]
extern crate cpk_providers;

fn ctx() -> UserContext {
    UserContext::new("tenant-a", "user-1")
}

#[test]
fn built_in_adapter_providers_are_registered() {
    let names: Vec<&str> = list_adapter_providers().iter().map(|(n, _)| *n).collect();
    assert!(names.contains(&"memory_store"));
    assert!(names.contains(&"broadcast_bus"));
    assert!(names.contains(&"null"));
}

#[test]
fn built_in_abstraction_providers_are_registered() {
    let names: Vec<&str> = list_abstraction_providers().iter().map(|(n, _)| *n).collect();
    assert!(names.contains(&"session"));
    assert!(names.contains(&"content_store"));
}

#[tokio::test]
async fn resolved_memory_store_stores_values() {
    let adapter =
        resolve_adapter_provider(&AdapterProviderConfig::new("memory_store").with_namespace("reg"))
            .unwrap();
    assert_eq!(adapter.capability(), "kv_storage");

    adapter
        .execute("put", &json!({"key": "k", "value": 42}), &ctx())
        .await
        .unwrap();
    let got = adapter.execute("get", &json!({"key": "k"}), &ctx()).await.unwrap();
    assert_eq!(got["value"], 42);
}

#[tokio::test]
async fn resolved_null_adapter_accepts_everything() {
    let adapter = resolve_adapter_provider(&AdapterProviderConfig::new("null")).unwrap();
    let result = adapter.execute("whatever", &json!({}), &ctx()).await.unwrap();
    assert_eq!(result, Value::Null);
}

#[tokio::test]
async fn resolved_session_abstraction_manages_sessions() {
    let store = resolve_adapter_provider(&AdapterProviderConfig::new("memory_store")).unwrap();
    let sessions = resolve_abstraction_provider(
        &AbstractionProviderConfig::new("session", "contract.session.v1"),
        &[store],
    )
    .unwrap();
    assert_eq!(sessions.contract_id(), "contract.session.v1");

    let created = sessions.invoke("create", &json!({}), &ctx()).await.unwrap();
    let session_id = created["session_id"].as_str().unwrap().to_string();
    let record = sessions
        .invoke("get", &json!({"session_id": session_id}), &ctx())
        .await
        .unwrap();
    assert_eq!(record["tenant_id"], "tenant-a");
}

#[tokio::test]
async fn resolved_content_store_routes_and_persists() {
    let adapters: Vec<Arc<dyn Adapter>> = vec![
        resolve_adapter_provider(&AdapterProviderConfig::new("memory_store")).unwrap(),
    ];
    let content = resolve_abstraction_provider(
        &AbstractionProviderConfig::new("content_store", "contract.content_store.v1"),
        &adapters,
    )
    .unwrap();

    content
        .invoke(
            "store",
            &json!({"kind": "document", "id": "d1", "content": {"title": "t"}}),
            &ctx(),
        )
        .await
        .unwrap();
    let retrieved = content
        .invoke("retrieve", &json!({"kind": "document", "id": "d1"}), &ctx())
        .await
        .unwrap();
    assert_eq!(retrieved["title"], "t");
}

#[test]
fn session_factory_requires_a_storage_adapter() {
    let err = resolve_abstraction_provider(
        &AbstractionProviderConfig::new("session", "contract.session.v1"),
        &[],
    )
    .unwrap_err();
    assert!(err.contains("storage adapter"));
}
