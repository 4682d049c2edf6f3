//! Telemetry events and structured error reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::OperationContext;
use crate::error::Error;

/// One append-only telemetry event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Event name, e.g. `"service.ready"` or `"gateway.access_denied"`
    pub name: String,
    /// Structured attributes
    pub attributes: Value,
    /// Emission timestamp
    pub timestamp: DateTime<Utc>,
}

impl TelemetryEvent {
    /// Create an event stamped with the current time.
    pub fn new(name: impl Into<String>, attributes: Value) -> Self {
        Self {
            name: name.into(),
            attributes,
            timestamp: Utc::now(),
        }
    }
}

/// Structured payload returned by `handle_error_with_audit`.
///
/// This is the terminal form of every audited error: the original failure
/// summarized, attributed, coded, and timestamped. It never carries raw
/// transport detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Stable wire code for the failure
    pub error_code: String,
    /// Summarized human-readable description
    pub message: String,
    /// Operation that failed
    pub operation: String,
    /// Service reporting the failure
    pub service: String,
    /// Realm the service belongs to
    pub realm: String,
    /// Structured detail carried from the operation context
    pub context: Value,
    /// Report timestamp
    pub timestamp: DateTime<Utc>,
}

impl ErrorReport {
    /// Build a report from an error and its operation context.
    pub fn from_error(error: &Error, ctx: &OperationContext) -> Self {
        Self {
            error_code: error.error_code().to_string(),
            message: error.to_string(),
            operation: ctx.operation.clone(),
            service: ctx.service.clone(),
            realm: ctx.realm.clone(),
            context: ctx.extra.clone(),
            timestamp: Utc::now(),
        }
    }
}
