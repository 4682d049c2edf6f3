//! Adapter implementations
//!
//! Thin wrappers over one concrete technology each, exposing a narrow
//! capability and no business semantics.

pub mod broadcast_bus;
pub mod memory_store;
pub mod null;

pub use broadcast_bus::BroadcastBusAdapter;
pub use memory_store::MemoryStoreAdapter;
pub use null::NullAdapter;
