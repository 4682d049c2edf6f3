//! Application-level ports
//!
//! The gateway port is implemented in `cpk-infrastructure` and consumed by
//! the resolver. The registry module declares the linkme distributed slices
//! that `cpk-providers` registers adapters and abstractions into.

pub mod gateway;
pub mod registry;

pub use gateway::{GatewayDenial, GatewayPort};
