//! # Capability Platform Kernel - Domain Layer
//!
//! Core data model and port traits for the capability resolution and
//! composition layer. This crate is pure: no I/O, no runtime, no
//! infrastructure concerns. Everything here is consumed by the application
//! and infrastructure layers.
//!
//! ## Contents
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `error` | Platform error taxonomy and `Result` alias |
//! | `capability` | Capability request/response wire types and error codes |
//! | `context` | Per-request `UserContext` and operation audit context |
//! | `registration` | Service registrations, abstraction descriptors, realm policy |
//! | `telemetry` | Telemetry events, health metrics, structured error reports |
//! | `ports` | Traits implemented by adapters, abstractions, services, utilities |

pub mod capability;
pub mod context;
pub mod error;
pub mod ports;
pub mod registration;
pub mod telemetry;

pub use capability::{CapabilityRequest, CapabilityResponse, Tier};
pub use context::{OperationContext, UserContext};
pub use error::{Error, Result};
pub use registration::{
    AbstractionDescriptor, LifecycleState, PolicyDecision, RealmAccessPolicy, ServiceRegistration,
};
pub use telemetry::{ErrorReport, TelemetryEvent};
