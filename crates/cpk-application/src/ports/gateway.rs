//! Platform gateway port
//!
//! The gateway is the single authorized path for cross-realm abstraction
//! access. The resolver (Tier 2) consumes this port; `cpk-infrastructure`
//! implements it over the immutable realm access policy.

use std::sync::Arc;

use cpk_domain::capability::codes;
use cpk_domain::ports::Abstraction;

/// A structured gateway denial.
///
/// Denials are expected outcomes, not errors: they are returned, audited,
/// and never thrown across the gateway boundary.
#[derive(Debug, Clone, thiserror::Error)]
#[error("gateway denied '{abstraction}' to realm '{realm}': {reason}")]
pub struct GatewayDenial {
    /// The calling realm
    pub realm: String,
    /// The abstraction that was requested
    pub abstraction: String,
    /// Stable denial code: `ACCESS_DENIED` or `REQUIRES_SOA_API`
    pub code: &'static str,
    /// Human-readable reason for the audit trail
    pub reason: String,
}

impl GatewayDenial {
    /// Denial under default-deny or an explicit DENIED entry.
    pub fn access_denied(
        realm: impl Into<String>,
        abstraction: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            realm: realm.into(),
            abstraction: abstraction.into(),
            code: codes::ACCESS_DENIED,
            reason: reason.into(),
        }
    }

    /// Denial steering the caller to the domain-service tier. The gateway
    /// is Tier 2 and never silently substitutes Tier 1.
    pub fn requires_soa_api(realm: impl Into<String>, abstraction: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            abstraction: abstraction.into(),
            code: codes::REQUIRES_SOA_API,
            reason: "policy requires the domain-service API for this capability".to_string(),
        }
    }
}

/// Realm-scoped access to registered abstractions.
pub trait GatewayPort: Send + Sync {
    /// Return the abstraction if policy allows the calling realm to use it.
    ///
    /// Decisions are a pure function of (policy, realm, abstraction name);
    /// no dynamic runtime state is consulted.
    fn get_abstraction(
        &self,
        calling_realm: &str,
        abstraction_name: &str,
    ) -> Result<Arc<dyn Abstraction>, GatewayDenial>;
}
