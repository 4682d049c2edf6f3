//! # Infrastructure Layer
//!
//! Composition root and cross-cutting technical concerns for the
//! Capability Platform Kernel. Nothing in here carries business meaning;
//! this layer assembles adapters, abstractions, utilities, and services
//! into one explicitly constructed platform context.
//!
//! ## Module Categories
//!
//! ### Configuration & DI
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment-based TOML/env configuration |
//! | [`di`] | Container builder and platform container |
//! | [`bootstrap`] | `init_platform` composition root |
//!
//! ### Access Control
//! | Module | Description |
//! |--------|-------------|
//! | [`gateway`] | Realm-scoped abstraction gateway |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |
//! | [`utilities`] | Error handler, telemetry, validators |

// Link the provider crate so its linkme registry entries are present.
use cpk_providers as _;

pub mod bootstrap;
pub mod config;
pub mod di;
pub mod error_ext;
pub mod gateway;
pub mod logging;
pub mod utilities;

pub use bootstrap::{init_platform, init_platform_with_services, PlatformContext};
pub use config::{ConfigLoader, PlatformConfig};
pub use di::{ContainerBuilder, PlatformContainer, ServiceDefinition};
pub use error_ext::ErrorContext;
pub use gateway::PlatformGateway;
pub use utilities::UtilityRegistry;
