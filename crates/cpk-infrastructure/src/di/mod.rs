//! DI container - declarative registration, single build pass
//!
//! The [`ContainerBuilder`] collects adapter, abstraction, policy, and
//! service registrations, then `build()` consumes them once: adapters are
//! resolved through the provider registry, abstractions composed over
//! them, services initialized in dependency order. After the build the
//! container is shared read-only behind `Arc`; every lookup is an O(1)
//! map read and nothing is constructed lazily.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use serde_json::json;
use tracing::{info, warn};

use cpk_application::catalog::{CapabilityBinding, CapabilityRegistry, ServiceRegistry};
use cpk_application::ports::registry::{
    resolve_abstraction_provider, resolve_adapter_provider, AbstractionProviderConfig,
    AdapterProviderConfig,
};
use cpk_domain::error::{Error, Result};
use cpk_domain::ports::{Abstraction, Adapter, DomainService, TelemetrySink};
use cpk_domain::registration::{
    AbstractionDescriptor, LifecycleState, PolicyDecision, RealmAccessPolicy, ServiceRegistration,
};
use cpk_domain::telemetry::TelemetryEvent;

use crate::utilities::UtilityRegistry;

/// Declarative registration of one managed service.
pub struct ServiceDefinition {
    /// Unique service name
    pub name: String,
    /// Realm owning the service
    pub realm: String,
    /// Whether startup must abort if this service fails to initialize
    pub required: bool,
    /// Names of services that must be ready before this one initializes
    pub dependencies: Vec<String>,
    /// The service instance whose lifecycle the container drives
    pub service: Arc<dyn DomainService>,
}

impl ServiceDefinition {
    /// Define a service; name and realm are taken from the instance.
    pub fn new(service: Arc<dyn DomainService>, required: bool) -> Self {
        Self {
            name: service.name().to_string(),
            realm: service.realm().to_string(),
            required,
            dependencies: Vec::new(),
            service,
        }
    }

    /// Declare services that must initialize before this one.
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }
}

/// Composition settings for one abstraction registration.
pub struct AbstractionRegistration {
    /// Provider name in the abstraction registry
    pub provider: String,
    /// Names of previously registered adapters, in declaration order
    pub adapters: Vec<String>,
    /// Protocol contract identifier
    pub contract_id: String,
    /// Realms the abstraction is visible to
    pub realms: Vec<String>,
    /// Provider-specific settings (e.g. content routing rules)
    pub extra: HashMap<String, String>,
}

/// Collects registrations; consumed once by [`ContainerBuilder::build`].
#[derive(Default)]
pub struct ContainerBuilder {
    adapters: Vec<(String, AdapterProviderConfig)>,
    abstractions: Vec<(String, AbstractionRegistration)>,
    policies: Vec<(String, String, PolicyDecision)>,
    bindings: Vec<(String, CapabilityBinding)>,
    services: Vec<ServiceDefinition>,
    utilities: UtilityRegistry,
}

impl ContainerBuilder {
    /// Create an empty builder with default (tracing-backed) utilities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire the utility registry the container hands to its services.
    pub fn with_utilities(mut self, utilities: UtilityRegistry) -> Self {
        self.utilities = utilities;
        self
    }

    /// Register an adapter instance under a unique name.
    pub fn register_adapter(mut self, name: impl Into<String>, config: AdapterProviderConfig) -> Self {
        self.adapters.push((name.into(), config));
        self
    }

    /// Register an abstraction composed over previously registered
    /// adapters. The provider defaults to the abstraction's own name.
    pub fn register_abstraction(
        self,
        name: impl Into<String>,
        adapters: Vec<String>,
        contract_id: impl Into<String>,
        realms: Vec<String>,
    ) -> Self {
        let name = name.into();
        let registration = AbstractionRegistration {
            provider: name.clone(),
            adapters,
            contract_id: contract_id.into(),
            realms,
            extra: HashMap::new(),
        };
        self.register_abstraction_with(name, registration)
    }

    /// Register an abstraction with full composition settings.
    pub fn register_abstraction_with(
        mut self,
        name: impl Into<String>,
        registration: AbstractionRegistration,
    ) -> Self {
        self.abstractions.push((name.into(), registration));
        self
    }

    /// Record one realm access policy entry.
    pub fn register_realm_policy(
        mut self,
        realm: impl Into<String>,
        abstraction: impl Into<String>,
        decision: PolicyDecision,
    ) -> Self {
        self.policies.push((realm.into(), abstraction.into(), decision));
        self
    }

    /// Bind a capability name to its resolution targets. Explicit bindings
    /// override the automatic Tier 1 bindings derived from service
    /// capability declarations.
    pub fn bind_capability(
        mut self,
        capability: impl Into<String>,
        binding: CapabilityBinding,
    ) -> Self {
        self.bindings.push((capability.into(), binding));
        self
    }

    /// Register a managed service.
    pub fn register_service(mut self, definition: ServiceDefinition) -> Self {
        self.services.push(definition);
        self
    }

    /// Build the container: resolve adapters, compose abstractions, load
    /// policy, initialize services in dependency order.
    ///
    /// Fails with an `Initialization` error on duplicate names, unknown
    /// references, dependency cycles, or a required service failing to
    /// initialize. The container never serves requests after a build
    /// failure.
    pub async fn build(self) -> Result<PlatformContainer> {
        let telemetry = self.utilities.telemetry();

        let adapters = Self::resolve_adapters(self.adapters)?;
        let (abstractions, descriptors) =
            Self::resolve_abstractions(self.abstractions, &adapters)?;

        let mut policy = RealmAccessPolicy::new();
        for (realm, abstraction, decision) in self.policies {
            policy.insert(realm, abstraction, decision);
        }

        let order = Self::initialization_order(&self.services)?;
        let mut definitions: HashMap<String, ServiceDefinition> = self
            .services
            .into_iter()
            .map(|d| (d.name.clone(), d))
            .collect();

        let mut services: HashMap<String, Arc<dyn DomainService>> = HashMap::new();
        let mut states: HashMap<String, LifecycleState> = HashMap::new();
        let mut service_registry = ServiceRegistry::new();
        let mut init_order = Vec::with_capacity(order.len());

        for name in order {
            let definition = definitions
                .remove(&name)
                .ok_or_else(|| Error::internal(format!("service '{name}' vanished during build")))?;
            let mut registration =
                ServiceRegistration::new(&definition.name, &definition.realm, definition.required)
                    .with_capabilities(definition.service.capabilities());

            match definition.service.initialize().await {
                Ok(()) => {
                    registration.state = LifecycleState::Ready;
                    states.insert(name.clone(), LifecycleState::Ready);
                    telemetry.emit(TelemetryEvent::new(
                        "container.service_ready",
                        json!({"service": name, "realm": definition.realm}),
                    ));
                    info!(service = %name, "service ready");
                    services.insert(name.clone(), definition.service.clone());
                    init_order.push(name);
                }
                Err(err) => {
                    registration.state = LifecycleState::Failed;
                    states.insert(name.clone(), LifecycleState::Failed);
                    telemetry.emit(TelemetryEvent::new(
                        "container.service_failed",
                        json!({"service": name, "realm": definition.realm, "error": err.to_string()}),
                    ));
                    if definition.required {
                        service_registry.record(registration);
                        return Err(Error::initialization_with_source(
                            format!("required service '{name}' failed to initialize"),
                            err,
                        ));
                    }
                    warn!(service = %name, "optional service failed to initialize: {err}");
                }
            }
            service_registry.record(registration);
        }

        let capability_registry =
            Self::capability_bindings(&service_registry, self.bindings, &services);

        Ok(PlatformContainer {
            adapters,
            abstractions,
            descriptors,
            services,
            init_order,
            states: Mutex::new(states),
            service_registry: Arc::new(service_registry),
            capability_registry: Arc::new(capability_registry),
            policy: Arc::new(policy),
            utilities: self.utilities,
            telemetry,
        })
    }

    fn resolve_adapters(
        registrations: Vec<(String, AdapterProviderConfig)>,
    ) -> Result<HashMap<String, Arc<dyn Adapter>>> {
        let mut adapters: HashMap<String, Arc<dyn Adapter>> = HashMap::new();
        for (name, config) in registrations {
            if adapters.contains_key(&name) {
                return Err(Error::initialization(format!(
                    "duplicate adapter registration '{name}'"
                )));
            }
            let adapter = resolve_adapter_provider(&config)
                .map_err(|e| Error::initialization(format!("adapter '{name}': {e}")))?;
            adapters.insert(name, adapter);
        }
        Ok(adapters)
    }

    #[allow(clippy::type_complexity)]
    fn resolve_abstractions(
        registrations: Vec<(String, AbstractionRegistration)>,
        adapters: &HashMap<String, Arc<dyn Adapter>>,
    ) -> Result<(
        HashMap<String, Arc<dyn Abstraction>>,
        HashMap<String, AbstractionDescriptor>,
    )> {
        let mut abstractions: HashMap<String, Arc<dyn Abstraction>> = HashMap::new();
        let mut descriptors: HashMap<String, AbstractionDescriptor> = HashMap::new();

        for (name, registration) in registrations {
            if abstractions.contains_key(&name) {
                return Err(Error::initialization(format!(
                    "duplicate abstraction registration '{name}'"
                )));
            }
            let mut resolved: Vec<Arc<dyn Adapter>> = Vec::with_capacity(registration.adapters.len());
            for adapter_ref in &registration.adapters {
                let adapter = adapters.get(adapter_ref).ok_or_else(|| {
                    Error::initialization(format!(
                        "abstraction '{name}' references unknown adapter '{adapter_ref}'"
                    ))
                })?;
                resolved.push(adapter.clone());
            }

            let mut config =
                AbstractionProviderConfig::new(&registration.provider, &registration.contract_id);
            config.extra = registration.extra;

            let abstraction = resolve_abstraction_provider(&config, &resolved)
                .map_err(|e| Error::initialization(format!("abstraction '{name}': {e}")))?;

            let descriptor =
                AbstractionDescriptor::new(&name, &registration.contract_id, registration.adapters)
                    .with_visible_realms(registration.realms);

            abstractions.insert(name.clone(), abstraction);
            descriptors.insert(name, descriptor);
        }
        Ok((abstractions, descriptors))
    }

    /// Topological initialization order over declared dependencies.
    fn initialization_order(services: &[ServiceDefinition]) -> Result<Vec<String>> {
        let mut names: HashSet<&str> = HashSet::new();
        for definition in services {
            if !names.insert(&definition.name) {
                return Err(Error::initialization(format!(
                    "duplicate service registration '{}'",
                    definition.name
                )));
            }
        }
        for definition in services {
            for dep in &definition.dependencies {
                if !names.contains(dep.as_str()) {
                    return Err(Error::initialization(format!(
                        "service '{}' depends on unknown service '{dep}'",
                        definition.name
                    )));
                }
            }
        }

        // Kahn's algorithm; whatever never reaches in-degree zero is part
        // of a cycle and gets named in the error.
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
        for definition in services {
            in_degree.insert(&definition.name, definition.dependencies.len());
            for dep in &definition.dependencies {
                dependents
                    .entry(dep.as_str())
                    .or_default()
                    .push(&definition.name);
            }
        }

        let mut queue: VecDeque<&str> = services
            .iter()
            .filter(|d| d.dependencies.is_empty())
            .map(|d| d.name.as_str())
            .collect();
        let mut order = Vec::with_capacity(services.len());

        while let Some(name) = queue.pop_front() {
            order.push(name.to_string());
            for dependent in dependents.get(name).into_iter().flatten() {
                let degree = in_degree
                    .get_mut(dependent)
                    .ok_or_else(|| Error::internal("in-degree table out of sync"))?;
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        if order.len() != services.len() {
            let mut cycle: Vec<&str> = in_degree
                .iter()
                .filter(|(_, degree)| **degree > 0)
                .map(|(name, _)| *name)
                .collect();
            cycle.sort_unstable();
            return Err(Error::initialization(format!(
                "dependency cycle among services: {}",
                cycle.join(", ")
            )));
        }
        Ok(order)
    }

    /// Tier 1 bindings derived from service capability declarations, then
    /// explicit bindings layered on top.
    fn capability_bindings(
        registry: &ServiceRegistry,
        explicit: Vec<(String, CapabilityBinding)>,
        ready: &HashMap<String, Arc<dyn DomainService>>,
    ) -> CapabilityRegistry {
        let mut capabilities = CapabilityRegistry::new();
        for (name, _) in ready {
            if let Some(registration) = registry.get(name) {
                for capability in &registration.capabilities {
                    capabilities.bind(
                        capability.clone(),
                        CapabilityBinding::default().with_domain_service(name.clone()),
                    );
                }
            }
        }
        for (capability, binding) in explicit {
            let merged = match capabilities.binding(&capability) {
                Some(existing) => CapabilityBinding {
                    domain_service: binding
                        .domain_service
                        .or_else(|| existing.domain_service.clone()),
                    abstraction: binding.abstraction.or_else(|| existing.abstraction.clone()),
                    operation: binding.operation.or_else(|| existing.operation.clone()),
                },
                None => binding,
            };
            capabilities.bind(capability, merged);
        }
        capabilities
    }
}

/// The built container: immutable lookup tables plus lifecycle control.
pub struct PlatformContainer {
    adapters: HashMap<String, Arc<dyn Adapter>>,
    abstractions: HashMap<String, Arc<dyn Abstraction>>,
    descriptors: HashMap<String, AbstractionDescriptor>,
    services: HashMap<String, Arc<dyn DomainService>>,
    init_order: Vec<String>,
    states: Mutex<HashMap<String, LifecycleState>>,
    service_registry: Arc<ServiceRegistry>,
    capability_registry: Arc<CapabilityRegistry>,
    policy: Arc<RealmAccessPolicy>,
    utilities: UtilityRegistry,
    telemetry: Arc<dyn TelemetrySink>,
}

impl PlatformContainer {
    /// A ready service by name. O(1); failed and shut-down services are
    /// absent.
    pub fn get_service(&self, name: &str) -> Option<Arc<dyn DomainService>> {
        self.services.get(name).cloned()
    }

    /// An abstraction by name. O(1).
    pub fn get_abstraction(&self, name: &str) -> Option<Arc<dyn Abstraction>> {
        self.abstractions.get(name).cloned()
    }

    /// An adapter by its registered instance name. O(1).
    pub fn get_adapter(&self, name: &str) -> Option<Arc<dyn Adapter>> {
        self.adapters.get(name).cloned()
    }

    /// Descriptor for a registered abstraction.
    pub fn abstraction_descriptor(&self, name: &str) -> Option<&AbstractionDescriptor> {
        self.descriptors.get(name)
    }

    /// All registered abstraction instances, for gateway construction.
    pub fn abstractions(&self) -> HashMap<String, Arc<dyn Abstraction>> {
        self.abstractions.clone()
    }

    /// All ready domain services.
    pub fn services(&self) -> impl Iterator<Item = &Arc<dyn DomainService>> {
        self.services.values()
    }

    /// The read-only service catalog.
    pub fn service_registry(&self) -> Arc<ServiceRegistry> {
        self.service_registry.clone()
    }

    /// The read-only capability binding catalog.
    pub fn capability_registry(&self) -> Arc<CapabilityRegistry> {
        self.capability_registry.clone()
    }

    /// The immutable realm access policy.
    pub fn policy(&self) -> Arc<RealmAccessPolicy> {
        self.policy.clone()
    }

    /// The utility registry services were wired with.
    pub fn utilities(&self) -> &UtilityRegistry {
        &self.utilities
    }

    /// Current lifecycle state of a registered service.
    pub fn lifecycle_state(&self, name: &str) -> Option<LifecycleState> {
        self.states.lock().ok()?.get(name).copied()
    }

    /// Tear down services in reverse initialization order.
    ///
    /// Best-effort: a failing teardown is recorded and returned, and the
    /// drain continues until every service reaches
    /// [`LifecycleState::ShutDown`].
    pub async fn shutdown(&self) -> Vec<(String, Error)> {
        let mut failures = Vec::new();
        for name in self.init_order.iter().rev() {
            let Some(service) = self.services.get(name) else {
                continue;
            };
            if let Err(err) = service.shutdown().await {
                warn!(service = %name, "service teardown failed: {err}");
                failures.push((name.clone(), err));
            }
            if let Ok(mut states) = self.states.lock() {
                states.insert(name.clone(), LifecycleState::ShutDown);
            }
            self.telemetry.emit(TelemetryEvent::new(
                "container.service_shut_down",
                json!({"service": name}),
            ));
        }
        failures
    }
}

impl std::fmt::Debug for PlatformContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformContainer")
            .field("adapters", &self.adapters.len())
            .field("abstractions", &self.abstractions.len())
            .field("services", &self.services.len())
            .field("policy_entries", &self.policy.len())
            .finish_non_exhaustive()
    }
}
