//! Abstraction implementations
//!
//! Each abstraction coordinates one or more adapters behind a stable
//! contract. Adapter failures are caught here and surfaced as
//! `ADAPTER_FAILURE`; raw backend errors never cross this boundary.

pub mod content_store;
pub mod session;

pub use content_store::ContentStoreAbstraction;
pub use session::SessionAbstraction;
