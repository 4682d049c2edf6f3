//! Adapter provider registry
//!
//! Auto-registration for adapter providers using linkme distributed slices.
//! Adapters register themselves via `#[linkme::distributed_slice]` and are
//! discovered by name at container build time.

use std::collections::HashMap;
use std::sync::Arc;

use cpk_domain::ports::Adapter;

/// Configuration for adapter provider creation.
///
/// Carries everything an adapter might need; providers use what they need
/// and ignore the rest.
#[derive(Debug, Clone, Default)]
pub struct AdapterProviderConfig {
    /// Provider name (e.g. "memory_store", "broadcast_bus", "null")
    pub provider: String,
    /// Connection URI for adapters that talk to something external
    pub uri: Option<String>,
    /// Namespace / collection / topic prefix
    pub namespace: Option<String>,
    /// Capacity hint for bounded adapters
    pub capacity: Option<usize>,
    /// Additional provider-specific configuration
    pub extra: HashMap<String, String>,
}

impl AdapterProviderConfig {
    /// Create a new config with the given provider name
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Default::default()
        }
    }

    /// Set the connection URI
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the capacity hint
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Add extra configuration
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Registry entry for adapter providers.
///
/// Each adapter implementation registers itself with this entry using
/// `#[linkme::distributed_slice(ADAPTER_PROVIDERS)]`.
pub struct AdapterProviderEntry {
    /// Unique provider name
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function to create the adapter instance
    pub factory: fn(&AdapterProviderConfig) -> Result<Arc<dyn Adapter>, String>,
}

// Auto-collection via linkme distributed slices - providers submit entries at compile time
#[linkme::distributed_slice]
pub static ADAPTER_PROVIDERS: [AdapterProviderEntry] = [..];

/// Resolve an adapter provider by name from the registry.
pub fn resolve_adapter_provider(
    config: &AdapterProviderConfig,
) -> Result<Arc<dyn Adapter>, String> {
    let provider_name = &config.provider;

    for entry in ADAPTER_PROVIDERS {
        if entry.name == provider_name {
            return (entry.factory)(config);
        }
    }

    let available: Vec<&str> = ADAPTER_PROVIDERS.iter().map(|e| e.name).collect();

    Err(format!(
        "Unknown adapter provider '{}'. Available providers: {:?}",
        provider_name, available
    ))
}

/// List all registered adapter providers as (name, description) pairs.
pub fn list_adapter_providers() -> Vec<(&'static str, &'static str)> {
    ADAPTER_PROVIDERS
        .iter()
        .map(|e| (e.name, e.description))
        .collect()
}
