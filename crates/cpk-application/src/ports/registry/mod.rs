//! Provider registry system
//!
//! Auto-registration infrastructure for adapter and abstraction providers.
//! Uses the `linkme` crate for compile-time registration of providers that
//! are discovered and instantiated at container build time.
//!
//! ## Registering an adapter (in cpk-providers)
//!
//! ```ignore
//! use cpk_application::ports::registry::{AdapterProviderEntry, ADAPTER_PROVIDERS};
//!
//! #[linkme::distributed_slice(ADAPTER_PROVIDERS)]
//! static MEMORY_STORE: AdapterProviderEntry = AdapterProviderEntry {
//!     name: "memory_store",
//!     description: "In-memory key/value storage adapter",
//!     factory: |config| Ok(Arc::new(MemoryStoreAdapter::from_config(config)?)),
//! };
//! ```
//!
//! ## Resolving (in cpk-infrastructure)
//!
//! ```ignore
//! let config = AdapterProviderConfig::new("memory_store");
//! let adapter = resolve_adapter_provider(&config)?;
//! ```

pub mod abstraction;
pub mod adapter;

pub use abstraction::{
    AbstractionProviderConfig, AbstractionProviderEntry, ABSTRACTION_PROVIDERS,
    list_abstraction_providers, resolve_abstraction_provider,
};
pub use adapter::{
    AdapterProviderConfig, AdapterProviderEntry, ADAPTER_PROVIDERS, list_adapter_providers,
    resolve_adapter_provider,
};
