//! Registration records and realm access policy
//!
//! These tables are written only during the container's startup phase and
//! are read-only afterwards. Access decisions must be reproducible from
//! policy + realm + abstraction name alone.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Lifecycle state of a registered service.
///
/// Transitions happen only during startup and shutdown; a registration
/// reaches [`LifecycleState::Ready`] at most once per process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Registered but not yet built
    Uninitialized,
    /// Built and serving
    Ready,
    /// Build or init failed; an optional service stays in this state
    Failed,
    /// Torn down during shutdown
    ShutDown,
}

/// Record of one service registered with the container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRegistration {
    /// Unique service name
    pub name: String,
    /// Realm owning the service
    pub realm: String,
    /// Whether startup must abort if this service fails to build
    pub required: bool,
    /// Current lifecycle state
    pub state: LifecycleState,
    /// Capabilities the service answers for (Tier 1 bindings)
    pub capabilities: Vec<String>,
}

impl ServiceRegistration {
    /// Create a registration in the uninitialized state.
    pub fn new(name: impl Into<String>, realm: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            realm: realm.into(),
            required,
            state: LifecycleState::Uninitialized,
            capabilities: Vec::new(),
        }
    }

    /// Attach the capabilities this service answers for.
    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }
}

/// Immutable description of a registered abstraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbstractionDescriptor {
    /// Unique abstraction name
    pub name: String,
    /// Identifier of the protocol contract the abstraction fulfils
    pub contract_id: String,
    /// Names of the adapters the abstraction coordinates (1..N)
    pub adapters: Vec<String>,
    /// Realms the abstraction is visible to (policy still applies per call)
    pub visible_realms: BTreeSet<String>,
}

impl AbstractionDescriptor {
    /// Create a descriptor.
    pub fn new(
        name: impl Into<String>,
        contract_id: impl Into<String>,
        adapters: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            contract_id: contract_id.into(),
            adapters,
            visible_realms: BTreeSet::new(),
        }
    }

    /// Add realms the abstraction is visible to.
    pub fn with_visible_realms<I, S>(mut self, realms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visible_realms = realms.into_iter().map(Into::into).collect();
        self
    }
}

/// Outcome of a realm policy lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyDecision {
    /// The calling realm may obtain the abstraction from the gateway
    Allowed,
    /// Access refused
    Denied,
    /// Access refused with a pointer to the domain-service tier instead
    RequiresSoaApi,
}

/// Mapping from (calling realm, abstraction name) to a decision.
///
/// Loaded once at startup and read-only thereafter; absent entries are
/// denied. Runtime mutation is deliberately impossible so access auditing
/// stays deterministic.
#[derive(Debug, Clone, Default)]
pub struct RealmAccessPolicy {
    entries: HashMap<(String, String), PolicyDecision>,
}

impl RealmAccessPolicy {
    /// Create an empty (deny-everything) policy table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a policy entry. Startup-time only.
    pub fn insert(
        &mut self,
        realm: impl Into<String>,
        abstraction: impl Into<String>,
        decision: PolicyDecision,
    ) {
        self.entries
            .insert((realm.into(), abstraction.into()), decision);
    }

    /// Look up the decision for a (realm, abstraction) pair.
    ///
    /// Absent entries are [`PolicyDecision::Denied`] - default-deny is the
    /// invariant the gateway relies on.
    pub fn decision(&self, realm: &str, abstraction: &str) -> PolicyDecision {
        self.entries
            .get(&(realm.to_string(), abstraction.to_string()))
            .copied()
            .unwrap_or(PolicyDecision::Denied)
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no explicit entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
