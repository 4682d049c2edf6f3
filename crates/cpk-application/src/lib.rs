//! # Capability Platform Kernel - Application Layer
//!
//! The capability resolution protocol and everything calling services touch
//! directly:
//!
//! - [`resolver`] - the ordered three-tier resolution state machine
//! - [`foundation`] - the capability mixin giving every service uniform
//!   error handling, telemetry, and access validation
//! - [`catalog`] - read-only service and capability catalogs populated by
//!   the container at startup
//! - [`ports`] - the gateway port and the linkme-based provider registries
//!   adapters and abstractions register into
//!
//! Concrete technology lives below this layer (`cpk-providers`); wiring
//! lives above it (`cpk-infrastructure`).

pub mod catalog;
pub mod foundation;
pub mod ports;
pub mod resolver;

pub use catalog::{CapabilityBinding, CapabilityRegistry, ServiceRegistry};
pub use foundation::ServiceFoundation;
pub use ports::gateway::{GatewayDenial, GatewayPort};
pub use resolver::CapabilityResolver;
