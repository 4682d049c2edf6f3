//! Capability resolver - the ordered three-tier resolution protocol
//!
//! Tier 1: domain-service API. Tier 2: gateway abstraction. Tier 3:
//! graceful structured failure. Tiers are tried in strict order, at most
//! one attempt per tier, and a later tier never starts once an earlier one
//! succeeds. Fallback order is a first-class contract here, not ad hoc
//! exception handling: each tier's outcome is matched explicitly.
//!
//! Timeouts apply per tier attempt so a slow Tier 1 cannot starve Tier 2.
//! Cancellation is checked before and during every tier and surfaces
//! `CANCELLED`, never `CAPABILITY_UNAVAILABLE`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, warn};

use cpk_domain::capability::{codes, CapabilityRequest, CapabilityResponse, Tier};
use cpk_domain::context::UserContext;
use cpk_domain::error::{Error, Result};
use cpk_domain::ports::{DomainService, TelemetrySink};
use cpk_domain::telemetry::TelemetryEvent;

use crate::catalog::CapabilityRegistry;
use crate::foundation::NoopTelemetrySink;
use crate::ports::gateway::GatewayPort;

/// Default per-tier attempt deadline.
pub const DEFAULT_TIER_TIMEOUT: Duration = Duration::from_secs(10);

/// Realm-scoped capability resolver.
///
/// Built once at bootstrap and shared read-only across concurrent
/// requests; resolution writes no shared state.
pub struct CapabilityResolver {
    calling_realm: String,
    capabilities: Arc<CapabilityRegistry>,
    domain_services: HashMap<String, Arc<dyn DomainService>>,
    gateway: Arc<dyn GatewayPort>,
    telemetry: Arc<dyn TelemetrySink>,
    tier_timeout: Duration,
}

impl CapabilityResolver {
    /// Create a resolver for one calling realm.
    pub fn new(
        calling_realm: impl Into<String>,
        capabilities: Arc<CapabilityRegistry>,
        gateway: Arc<dyn GatewayPort>,
    ) -> Self {
        Self {
            calling_realm: calling_realm.into(),
            capabilities,
            domain_services: HashMap::new(),
            gateway,
            telemetry: Arc::new(NoopTelemetrySink),
            tier_timeout: DEFAULT_TIER_TIMEOUT,
        }
    }

    /// Register a Tier 1 domain service under its own name.
    pub fn with_domain_service(mut self, service: Arc<dyn DomainService>) -> Self {
        self.domain_services
            .insert(service.name().to_string(), service);
        self
    }

    /// Wire a telemetry sink.
    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = sink;
        self
    }

    /// Override the per-tier attempt deadline.
    pub fn with_tier_timeout(mut self, timeout: Duration) -> Self {
        self.tier_timeout = timeout;
        self
    }

    /// The realm this resolver resolves on behalf of.
    pub fn calling_realm(&self) -> &str {
        &self.calling_realm
    }

    /// Resolve one capability request.
    ///
    /// Always terminates in exactly one [`CapabilityResponse`]; adapter and
    /// service errors never cross this boundary unstructured.
    pub async fn resolve_capability(&self, request: &CapabilityRequest) -> CapabilityResponse {
        if request.context.is_cancelled() {
            return self.cancelled_response(&request.capability);
        }

        let Some(binding) = self.capabilities.binding(&request.capability) else {
            return self.unavailable_response(&request.capability, &[]);
        };
        let operation = binding
            .operation
            .as_deref()
            .unwrap_or(&request.capability)
            .to_string();

        let mut attempted: Vec<&'static str> = Vec::new();

        // Tier 1 - domain service API. Failure here is expected and
        // retryable by design; log a warning and fall through.
        if let Some(service) = binding
            .domain_service
            .as_deref()
            .and_then(|name| self.domain_services.get(name))
        {
            attempted.push("domain_service");
            let attempt = self
                .guarded(
                    service.invoke(&operation, &request.arguments, &request.context),
                    &request.capability,
                    &request.context,
                )
                .await;
            match attempt {
                Ok(data) => return self.satisfied(&request.capability, Tier::DomainService, data),
                Err(Error::Cancelled { .. }) => {
                    return self.cancelled_response(&request.capability);
                }
                Err(err) => {
                    warn!(
                        capability = %request.capability,
                        service = service.name(),
                        "tier 1 domain service failed, falling through: {err}"
                    );
                }
            }
        }

        if request.context.is_cancelled() {
            return self.cancelled_response(&request.capability);
        }

        // Tier 2 - gateway abstraction. Denials are already audited by the
        // gateway; both denial and invocation failure fall through.
        if let Some(abstraction_name) = binding.abstraction.as_deref() {
            attempted.push("gateway_abstraction");
            match self
                .gateway
                .get_abstraction(&self.calling_realm, abstraction_name)
            {
                Ok(abstraction) => {
                    let attempt = self
                        .guarded(
                            abstraction.invoke(&operation, &request.arguments, &request.context),
                            &request.capability,
                            &request.context,
                        )
                        .await;
                    match attempt {
                        Ok(data) => {
                            return self.satisfied(
                                &request.capability,
                                Tier::GatewayAbstraction,
                                data,
                            );
                        }
                        Err(Error::Cancelled { .. }) => {
                            return self.cancelled_response(&request.capability);
                        }
                        Err(err) => {
                            warn!(
                                capability = %request.capability,
                                abstraction = abstraction_name,
                                "tier 2 abstraction failed, falling through: {err}"
                            );
                        }
                    }
                }
                Err(denial) => {
                    debug!(
                        capability = %request.capability,
                        code = denial.code,
                        "tier 2 gateway denied, falling through: {denial}"
                    );
                }
            }
        }

        // Tier 3 - graceful failure.
        self.unavailable_response(&request.capability, &attempted)
    }

    /// Run one tier attempt under the per-tier deadline and the request's
    /// cancellation scope.
    async fn guarded<F>(&self, attempt: F, capability: &str, ctx: &UserContext) -> Result<Value>
    where
        F: Future<Output = Result<Value>>,
    {
        tokio::select! {
            () = ctx.cancellation().cancelled() => Err(Error::cancelled(capability)),
            outcome = tokio::time::timeout(self.tier_timeout, attempt) => match outcome {
                Ok(result) => result,
                Err(_) => Err(Error::timeout(capability)),
            },
        }
    }

    fn satisfied(&self, capability: &str, tier: Tier, data: Value) -> CapabilityResponse {
        self.telemetry.emit(TelemetryEvent::new(
            "resolver.satisfied",
            json!({
                "realm": self.calling_realm,
                "capability": capability,
                "tier": u8::from(tier),
            }),
        ));
        CapabilityResponse::success(tier, data)
    }

    fn cancelled_response(&self, capability: &str) -> CapabilityResponse {
        self.telemetry.emit(TelemetryEvent::new(
            "resolver.cancelled",
            json!({
                "realm": self.calling_realm,
                "capability": capability,
            }),
        ));
        CapabilityResponse::failure(
            codes::CANCELLED,
            format!("resolution of '{capability}' was cancelled"),
        )
    }

    fn unavailable_response(&self, capability: &str, attempted: &[&str]) -> CapabilityResponse {
        self.telemetry.emit(TelemetryEvent::new(
            "resolver.exhausted",
            json!({
                "realm": self.calling_realm,
                "capability": capability,
                "attempted": attempted,
            }),
        ));
        let tiers = if attempted.is_empty() {
            "no tiers are registered for this capability".to_string()
        } else {
            format!("tiers attempted: {}", attempted.join(", "))
        };
        CapabilityResponse::failure(
            codes::CAPABILITY_UNAVAILABLE,
            format!("capability '{capability}' is unavailable; {tiers}"),
        )
    }
}

impl std::fmt::Debug for CapabilityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityResolver")
            .field("calling_realm", &self.calling_realm)
            .field("domain_services", &self.domain_services.len())
            .field("tier_timeout", &self.tier_timeout)
            .finish_non_exhaustive()
    }
}
