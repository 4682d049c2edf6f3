//! Platform configuration
//!
//! TOML-serializable configuration for the whole platform: realm identity,
//! logging, resolver tuning, adapter and abstraction wiring, and realm
//! access policy rules. Loaded once at startup by [`ConfigLoader`] and
//! treated as immutable afterwards.

mod loader;

pub use loader::ConfigLoader;

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use cpk_domain::registration::PolicyDecision;

/// Default per-tier resolver timeout in milliseconds.
pub const DEFAULT_TIER_TIMEOUT_MS: u64 = 10_000;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable prefix for configuration overrides.
pub const CONFIG_ENV_PREFIX: &str = "CPK";

/// Default configuration file name searched in the working directory.
pub const DEFAULT_CONFIG_FILENAME: &str = "cpk.toml";

/// Top-level platform configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Platform identity
    #[serde(default)]
    pub platform: PlatformSection,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Capability resolver tuning
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Adapter wiring: adapter name → provider settings
    #[serde(default)]
    pub adapters: HashMap<String, AdapterConfig>,

    /// Abstraction wiring: abstraction name → composition settings
    #[serde(default)]
    pub abstractions: HashMap<String, AbstractionConfig>,

    /// Realm access policy rules; absent pairs are denied
    #[serde(default)]
    pub policies: Vec<PolicyRule>,
}

/// Platform identity section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSection {
    /// Realm this process resolves capabilities on behalf of
    pub realm: String,
}

impl Default for PlatformSection {
    fn default() -> Self {
        Self {
            realm: "platform".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON output format
    pub json_format: bool,

    /// Log to file in addition to stdout
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
            file_output: None,
        }
    }
}

/// Capability resolver tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Deadline for one tier attempt, in milliseconds
    pub tier_timeout_ms: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            tier_timeout_ms: DEFAULT_TIER_TIMEOUT_MS,
        }
    }
}

/// Settings for one adapter instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Provider name in the adapter registry (e.g. "memory_store")
    pub provider: String,

    /// Connection URI for adapters that talk to something external
    #[serde(default)]
    pub uri: Option<String>,

    /// Namespace / collection / topic prefix
    #[serde(default)]
    pub namespace: Option<String>,

    /// Capacity hint for bounded adapters
    #[serde(default)]
    pub capacity: Option<usize>,

    /// Additional provider-specific settings
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

/// Settings for one abstraction instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbstractionConfig {
    /// Provider name in the abstraction registry; defaults to the
    /// abstraction's own name when empty
    #[serde(default)]
    pub provider: Option<String>,

    /// Names of the configured adapters this abstraction coordinates (1..N)
    pub adapters: Vec<String>,

    /// Protocol contract identifier
    pub contract: String,

    /// Realms the abstraction is visible to
    #[serde(default)]
    pub realms: Vec<String>,

    /// Additional provider-specific settings (e.g. content routing rules)
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

/// One realm access policy rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Calling realm
    pub realm: String,
    /// Abstraction name
    pub abstraction: String,
    /// Decision for the pair
    pub decision: PolicyDecision,
}
