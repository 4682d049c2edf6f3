//! Read-only catalogs
//!
//! The container populates these during its startup phase and then freezes
//! them behind `Arc`. Discovery-oriented callers query them; nothing on a
//! request path ever writes to them.

use std::collections::HashMap;

use cpk_domain::registration::ServiceRegistration;

/// Binding of one capability name to its resolution targets.
///
/// Which tier a capability can be satisfied from is declared at
/// registration time, not inferred from call-site behavior.
#[derive(Debug, Clone, Default)]
pub struct CapabilityBinding {
    /// Tier 1 target: name of the domain service answering for the
    /// capability, if one is registered
    pub domain_service: Option<String>,
    /// Tier 2 target: name of the gateway abstraction, if one is registered
    pub abstraction: Option<String>,
    /// Operation name to invoke on the target; defaults to the capability
    /// name itself
    pub operation: Option<String>,
}

impl CapabilityBinding {
    /// Binding with a Tier 1 domain service target.
    pub fn with_domain_service(mut self, name: impl Into<String>) -> Self {
        self.domain_service = Some(name.into());
        self
    }

    /// Binding with a Tier 2 abstraction target.
    pub fn with_abstraction(mut self, name: impl Into<String>) -> Self {
        self.abstraction = Some(name.into());
        self
    }

    /// Override the operation invoked on the target.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }
}

/// Read-only catalog of capability bindings.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    bindings: HashMap<String, CapabilityBinding>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a binding. Startup-time only; the registry is frozen behind
    /// `Arc` once the container finishes building.
    pub fn bind(&mut self, capability: impl Into<String>, binding: CapabilityBinding) {
        self.bindings.insert(capability.into(), binding);
    }

    /// Look up the binding for a capability.
    pub fn binding(&self, capability: &str) -> Option<&CapabilityBinding> {
        self.bindings.get(capability)
    }

    /// All registered capability names.
    pub fn capabilities(&self) -> Vec<&str> {
        self.bindings.keys().map(String::as_str).collect()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether any bindings are registered.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Read-only catalog of service registrations.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    registrations: HashMap<String, ServiceRegistration>,
}

impl ServiceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a registration snapshot. Startup-time only.
    pub fn record(&mut self, registration: ServiceRegistration) {
        self.registrations
            .insert(registration.name.clone(), registration);
    }

    /// Look up a registration by service name.
    pub fn get(&self, name: &str) -> Option<&ServiceRegistration> {
        self.registrations.get(name)
    }

    /// All registrations owned by a realm.
    pub fn by_realm(&self, realm: &str) -> Vec<&ServiceRegistration> {
        self.registrations
            .values()
            .filter(|r| r.realm == realm)
            .collect()
    }

    /// All registrations answering for a capability.
    pub fn by_capability(&self, capability: &str) -> Vec<&ServiceRegistration> {
        self.registrations
            .values()
            .filter(|r| r.capabilities.iter().any(|c| c == capability))
            .collect()
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Whether any registrations exist.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
