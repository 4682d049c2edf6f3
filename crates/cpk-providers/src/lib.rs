//! # Capability Platform Kernel - Provider Implementations
//!
//! Concrete adapters and abstractions. Each implements a port defined in
//! `cpk-domain` and registers itself into the linkme slices declared in
//! `cpk-application`, so the container can resolve it by name from
//! configuration with no compile-time knowledge of the implementation.
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Adapter | `Adapter` | MemoryStore, BroadcastBus, Null |
//! | Abstraction | `Abstraction` | ContentStore, Session |

// Re-export cpk-domain types commonly used with providers
pub use cpk_domain::error::{Error, Result};
pub use cpk_domain::ports::{Abstraction, Adapter};

/// Adapter implementations
pub mod adapters;

/// Abstraction implementations
pub mod abstractions;
