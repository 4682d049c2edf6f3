//! Abstraction provider registry
//!
//! Same linkme registration scheme as the adapter registry, except the
//! factory also receives the already-resolved adapters the abstraction
//! coordinates, in the order they were declared at registration.

use std::collections::HashMap;
use std::sync::Arc;

use cpk_domain::ports::{Abstraction, Adapter};

/// Configuration for abstraction provider creation.
#[derive(Debug, Clone, Default)]
pub struct AbstractionProviderConfig {
    /// Provider name (e.g. "content_store", "session")
    pub provider: String,
    /// Protocol contract identifier recorded in the descriptor
    pub contract_id: String,
    /// Additional provider-specific configuration
    pub extra: HashMap<String, String>,
}

impl AbstractionProviderConfig {
    /// Create a new config with the given provider name and contract
    pub fn new(provider: impl Into<String>, contract_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            contract_id: contract_id.into(),
            extra: HashMap::new(),
        }
    }

    /// Add extra configuration
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Registry entry for abstraction providers.
pub struct AbstractionProviderEntry {
    /// Unique provider name
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function; receives the resolved adapters (1..N) in
    /// declaration order
    pub factory: fn(
        &AbstractionProviderConfig,
        &[Arc<dyn Adapter>],
    ) -> Result<Arc<dyn Abstraction>, String>,
}

// Auto-collection via linkme distributed slices - providers submit entries at compile time
#[linkme::distributed_slice]
pub static ABSTRACTION_PROVIDERS: [AbstractionProviderEntry] = [..];

/// Resolve an abstraction provider by name from the registry.
pub fn resolve_abstraction_provider(
    config: &AbstractionProviderConfig,
    adapters: &[Arc<dyn Adapter>],
) -> Result<Arc<dyn Abstraction>, String> {
    let provider_name = &config.provider;

    for entry in ABSTRACTION_PROVIDERS {
        if entry.name == provider_name {
            return (entry.factory)(config, adapters);
        }
    }

    let available: Vec<&str> = ABSTRACTION_PROVIDERS.iter().map(|e| e.name).collect();

    Err(format!(
        "Unknown abstraction provider '{}'. Available providers: {:?}",
        provider_name, available
    ))
}

/// List all registered abstraction providers as (name, description) pairs.
pub fn list_abstraction_providers() -> Vec<(&'static str, &'static str)> {
    ABSTRACTION_PROVIDERS
        .iter()
        .map(|e| (e.name, e.description))
        .collect()
}
