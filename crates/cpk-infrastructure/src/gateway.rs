//! Platform gateway
//!
//! The single authorized path for cross-realm abstraction access. A
//! decision is a pure function of (policy, calling realm, abstraction
//! name); the tables are frozen at construction and every denial is
//! audited through the telemetry sink.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use cpk_application::ports::gateway::{GatewayDenial, GatewayPort};
use cpk_domain::ports::{Abstraction, TelemetrySink};
use cpk_domain::registration::{PolicyDecision, RealmAccessPolicy};
use cpk_domain::telemetry::TelemetryEvent;

/// Gateway over the immutable realm access policy and abstraction table.
pub struct PlatformGateway {
    policy: Arc<RealmAccessPolicy>,
    abstractions: HashMap<String, Arc<dyn Abstraction>>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl PlatformGateway {
    /// Create a gateway over frozen policy and abstraction tables.
    pub fn new(
        policy: Arc<RealmAccessPolicy>,
        abstractions: HashMap<String, Arc<dyn Abstraction>>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            policy,
            abstractions,
            telemetry,
        }
    }

    fn audit_denial(&self, denial: &GatewayDenial) {
        self.telemetry.emit(TelemetryEvent::new(
            "gateway.access_denied",
            json!({
                "calling_realm": denial.realm,
                "abstraction": denial.abstraction,
                "code": denial.code,
                "reason": denial.reason,
            }),
        ));
        debug!(
            realm = %denial.realm,
            abstraction = %denial.abstraction,
            code = denial.code,
            "gateway denial"
        );
    }
}

impl GatewayPort for PlatformGateway {
    fn get_abstraction(
        &self,
        calling_realm: &str,
        abstraction_name: &str,
    ) -> Result<Arc<dyn Abstraction>, GatewayDenial> {
        match self.policy.decision(calling_realm, abstraction_name) {
            PolicyDecision::Allowed => match self.abstractions.get(abstraction_name) {
                Some(abstraction) => Ok(abstraction.clone()),
                None => {
                    let denial = GatewayDenial::access_denied(
                        calling_realm,
                        abstraction_name,
                        "abstraction is not registered",
                    );
                    self.audit_denial(&denial);
                    Err(denial)
                }
            },
            PolicyDecision::RequiresSoaApi => {
                let denial = GatewayDenial::requires_soa_api(calling_realm, abstraction_name);
                self.audit_denial(&denial);
                Err(denial)
            }
            PolicyDecision::Denied => {
                let denial = GatewayDenial::access_denied(
                    calling_realm,
                    abstraction_name,
                    "realm policy denies this abstraction",
                );
                self.audit_denial(&denial);
                Err(denial)
            }
        }
    }
}

impl std::fmt::Debug for PlatformGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformGateway")
            .field("abstractions", &self.abstractions.len())
            .field("policy_entries", &self.policy.len())
            .finish_non_exhaustive()
    }
}
