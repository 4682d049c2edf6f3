//! Port traits
//!
//! Contracts implemented on one side of a boundary and consumed on the
//! other. Adapters and abstractions are implemented in `cpk-providers`;
//! utilities in `cpk-infrastructure`; domain services by whichever realm
//! registers them.

pub mod abstraction;
pub mod adapter;
pub mod service;
pub mod utilities;

pub use abstraction::Abstraction;
pub use adapter::Adapter;
pub use service::{DomainService, ManagedService};
pub use utilities::{
    ActionSensitivity, ErrorHandlerUtility, LoggerFactoryUtility, SecurityUtility, TelemetrySink,
    TenantUtility,
};
