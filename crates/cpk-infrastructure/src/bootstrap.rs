//! Platform bootstrap - the explicit composition root
//!
//! `init_platform` turns a validated [`PlatformConfig`] into a running
//! [`PlatformContext`]: utilities first, then the container (adapters →
//! abstractions → services), then the gateway and the resolver over the
//! container's frozen tables. No ambient globals; everything reachable
//! from the context was constructed here.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use cpk_application::catalog::CapabilityBinding;
use cpk_application::ports::registry::AdapterProviderConfig;
use cpk_application::resolver::CapabilityResolver;
use cpk_domain::error::{Error, Result};

use crate::config::PlatformConfig;
use crate::di::{AbstractionRegistration, ContainerBuilder, PlatformContainer, ServiceDefinition};
use crate::gateway::PlatformGateway;
use crate::utilities::UtilityRegistry;

/// The assembled platform: container, gateway, resolver, utilities.
pub struct PlatformContext {
    config: Arc<PlatformConfig>,
    container: Arc<PlatformContainer>,
    gateway: Arc<PlatformGateway>,
    resolver: Arc<CapabilityResolver>,
    utilities: UtilityRegistry,
}

impl PlatformContext {
    /// The configuration the platform was built from.
    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// The built container.
    pub fn container(&self) -> Arc<PlatformContainer> {
        self.container.clone()
    }

    /// The realm-scoped gateway.
    pub fn gateway(&self) -> Arc<PlatformGateway> {
        self.gateway.clone()
    }

    /// The capability resolver for this process's realm.
    pub fn resolver(&self) -> Arc<CapabilityResolver> {
        self.resolver.clone()
    }

    /// The process-wide utility handles.
    pub fn utilities(&self) -> &UtilityRegistry {
        &self.utilities
    }

    /// Drain the container: tear down services in reverse initialization
    /// order, returning any recorded teardown failures.
    pub async fn shutdown(&self) -> Vec<(String, Error)> {
        info!("Shutting down platform context");
        self.container.shutdown().await
    }
}

impl std::fmt::Debug for PlatformContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformContext")
            .field("realm", &self.config.platform.realm)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

/// Initialize the platform from configuration alone.
pub async fn init_platform(config: PlatformConfig) -> Result<PlatformContext> {
    init_platform_with_services(config, Vec::new()).await
}

/// Initialize the platform with additional managed services.
///
/// Each configured abstraction is also bound as a capability of the same
/// name, so gateway-reachable abstractions are resolvable without an
/// explicit binding. Service capability declarations produce the Tier 1
/// bindings.
pub async fn init_platform_with_services(
    config: PlatformConfig,
    services: Vec<ServiceDefinition>,
) -> Result<PlatformContext> {
    info!(realm = %config.platform.realm, "Initializing platform context");

    let utilities = UtilityRegistry::new();
    let mut builder = ContainerBuilder::new().with_utilities(utilities.clone());

    for (name, adapter) in &config.adapters {
        let mut provider_config = AdapterProviderConfig::new(&adapter.provider);
        provider_config.uri = adapter.uri.clone();
        provider_config.namespace = adapter.namespace.clone();
        provider_config.capacity = adapter.capacity;
        provider_config.extra = adapter.extra.clone();
        builder = builder.register_adapter(name, provider_config);
    }

    for (name, abstraction) in &config.abstractions {
        let registration = AbstractionRegistration {
            provider: abstraction.provider.clone().unwrap_or_else(|| name.clone()),
            adapters: abstraction.adapters.clone(),
            contract_id: abstraction.contract.clone(),
            realms: abstraction.realms.clone(),
            extra: abstraction.extra.clone(),
        };
        builder = builder
            .register_abstraction_with(name, registration)
            .bind_capability(name, CapabilityBinding::default().with_abstraction(name));
    }

    for rule in &config.policies {
        builder = builder.register_realm_policy(&rule.realm, &rule.abstraction, rule.decision);
    }

    for definition in services {
        builder = builder.register_service(definition);
    }

    let container = Arc::new(builder.build().await?);

    let gateway = Arc::new(PlatformGateway::new(
        container.policy(),
        container.abstractions(),
        utilities.telemetry(),
    ));

    let mut resolver = CapabilityResolver::new(
        &config.platform.realm,
        container.capability_registry(),
        gateway.clone(),
    )
    .with_telemetry(utilities.telemetry())
    .with_tier_timeout(Duration::from_millis(config.resolver.tier_timeout_ms));
    for service in container.services() {
        resolver = resolver.with_domain_service(service.clone());
    }

    info!(realm = %config.platform.realm, "Platform context ready");

    Ok(PlatformContext {
        config: Arc::new(config),
        container,
        gateway,
        resolver: Arc::new(resolver),
        utilities,
    })
}
