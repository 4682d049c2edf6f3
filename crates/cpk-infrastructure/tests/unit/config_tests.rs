//! Configuration loading tests

use std::io::Write;

use cpk_domain::registration::PolicyDecision;
use cpk_infrastructure::config::{ConfigLoader, PlatformConfig};

#[test]
fn defaults_load_without_any_sources() {
    let config = ConfigLoader::new()
        .with_config_path("/nonexistent/cpk.toml")
        .load()
        .unwrap();
    assert_eq!(config.platform.realm, "platform");
    assert_eq!(config.resolver.tier_timeout_ms, 10_000);
}

#[test]
fn toml_file_overrides_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[platform]
realm = "smart_city"

[resolver]
tier_timeout_ms = 2500

[adapters.session_store]
provider = "memory_store"
namespace = "sessions"

[abstractions.session]
adapters = ["session_store"]
contract = "contract.session.v1"
realms = ["smart_city"]

[[policies]]
realm = "smart_city"
abstraction = "session"
decision = "allowed"

[[policies]]
realm = "business_enablement"
abstraction = "session"
decision = "denied"
"#
    )
    .unwrap();

    let config = ConfigLoader::new()
        .with_config_path(file.path())
        .load()
        .unwrap();

    assert_eq!(config.platform.realm, "smart_city");
    assert_eq!(config.resolver.tier_timeout_ms, 2500);
    assert_eq!(
        config.adapters["session_store"].namespace.as_deref(),
        Some("sessions")
    );
    assert_eq!(config.abstractions["session"].contract, "contract.session.v1");
    assert_eq!(config.policies.len(), 2);
    assert_eq!(config.policies[1].decision, PolicyDecision::Denied);
}

#[test]
fn invalid_configuration_is_rejected_at_load() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[resolver]
tier_timeout_ms = 0
"#
    )
    .unwrap();

    let err = ConfigLoader::new()
        .with_config_path(file.path())
        .load()
        .unwrap_err();
    assert!(err.to_string().contains("timeout"));
}

#[test]
fn environment_variables_override_the_file() {
    // Unique prefix so parallel tests cannot interfere.
    std::env::set_var("CPKTESTENV_PLATFORM_REALM", "journeys");
    let config = ConfigLoader::new()
        .with_config_path("/nonexistent/cpk.toml")
        .with_env_prefix("CPKTESTENV")
        .load()
        .unwrap();
    std::env::remove_var("CPKTESTENV_PLATFORM_REALM");

    assert_eq!(config.platform.realm, "journeys");
}

#[test]
fn save_and_reload_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cpk.toml");

    let mut config = PlatformConfig::default();
    config.platform.realm = "smart_city".to_string();
    let loader = ConfigLoader::new().with_config_path(&path);
    loader.save_to_file(&config, &path).unwrap();

    let reloaded = loader.load().unwrap();
    assert_eq!(reloaded.platform.realm, "smart_city");
}
