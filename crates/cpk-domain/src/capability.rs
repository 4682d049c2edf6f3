//! Capability request/response wire types
//!
//! Every capability resolution terminates in exactly one
//! [`CapabilityResponse`]. The schema is stable across the whole platform:
//! `{ success, data, error, error_code, tier_satisfied }`. A failed response
//! always carries a non-empty error code.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::UserContext;

/// Stable error codes carried by failure responses.
pub mod codes {
    /// Realm policy denied access to the abstraction
    pub const ACCESS_DENIED: &str = "ACCESS_DENIED";
    /// Tenant validation rejected the request
    pub const TENANT_ACCESS_DENIED: &str = "TENANT_ACCESS_DENIED";
    /// All resolution tiers were exhausted
    pub const CAPABILITY_UNAVAILABLE: &str = "CAPABILITY_UNAVAILABLE";
    /// Startup failed; no request was ever served
    pub const INITIALIZATION_FAILED: &str = "INITIALIZATION_FAILED";
    /// The request-scoped cancellation token fired
    pub const CANCELLED: &str = "CANCELLED";
    /// An adapter operation failed beneath an abstraction
    pub const ADAPTER_FAILURE: &str = "ADAPTER_FAILURE";
    /// A tier attempt exceeded its deadline
    pub const TIMEOUT: &str = "TIMEOUT";
    /// Policy directs the caller to the domain-service tier
    pub const REQUIRES_SOA_API: &str = "REQUIRES_SOA_API";
}

/// Which resolution tier satisfied a request.
///
/// Serialized as the tier number so the wire schema stays
/// `tier_satisfied: 0|1|2|3`. Failure responses always carry `None` (0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Tier {
    /// No tier satisfied the request (failure responses)
    None,
    /// Tier 1 - domain service API
    DomainService,
    /// Tier 2 - gateway abstraction
    GatewayAbstraction,
    /// Tier 3 - graceful failure (reserved; failures report `None`)
    GracefulFailure,
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::None => 0,
            Tier::DomainService => 1,
            Tier::GatewayAbstraction => 2,
            Tier::GracefulFailure => 3,
        }
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, String> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::DomainService),
            2 => Ok(Self::GatewayAbstraction),
            3 => Ok(Self::GracefulFailure),
            other => Err(format!("invalid tier number: {other}")),
        }
    }
}

/// A request for a named capability.
///
/// Constructed per inbound call and threaded by reference through the
/// resolver; the embedded [`UserContext`] is immutable for the life of
/// the request.
#[derive(Debug, Clone)]
pub struct CapabilityRequest {
    /// Capability name, e.g. `"document.store"`
    pub capability: String,
    /// Capability-specific arguments
    pub arguments: Value,
    /// Caller identity, tenancy, and cancellation scope
    pub context: UserContext,
}

impl CapabilityRequest {
    /// Create a new capability request
    pub fn new(capability: impl Into<String>, arguments: Value, context: UserContext) -> Self {
        Self {
            capability: capability.into(),
            arguments,
            context,
        }
    }
}

/// The single, stable response shape for every capability resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityResponse {
    /// Whether a tier satisfied the request
    pub success: bool,
    /// Result payload when `success` is true
    pub data: Option<Value>,
    /// Summarized failure description when `success` is false
    pub error: Option<String>,
    /// Stable error code when `success` is false; never empty on failure
    pub error_code: Option<String>,
    /// Tier number that satisfied the request; 0 on failure
    pub tier_satisfied: Tier,
}

impl CapabilityResponse {
    /// Build a success response for the given tier.
    pub fn success(tier: Tier, data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_code: None,
            tier_satisfied: tier,
        }
    }

    /// Build a failure response.
    ///
    /// An empty `error_code` is a programming error upstream; it is replaced
    /// with `CAPABILITY_UNAVAILABLE` so the non-empty-code invariant holds
    /// on the wire no matter what.
    pub fn failure(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = {
            let code = error_code.into();
            if code.is_empty() {
                codes::CAPABILITY_UNAVAILABLE.to_string()
            } else {
                code
            }
        };
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            error_code: Some(code),
            tier_satisfied: Tier::None,
        }
    }

    /// Build a failure response directly from a platform error.
    pub fn from_error(error: &crate::error::Error) -> Self {
        Self::failure(error.error_code(), error.to_string())
    }
}
