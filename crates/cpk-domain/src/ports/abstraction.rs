//! Abstraction port
//!
//! An abstraction coordinates one or more adapters behind a stable,
//! technology-agnostic contract. It may route by content (e.g. choose an
//! adapter by payload kind) but exposes none of the underlying technology.

use async_trait::async_trait;
use serde_json::Value;

use crate::context::UserContext;
use crate::error::Result;

/// A technology-agnostic contract over 1..N adapters.
///
/// Implementations catch adapter failures at this boundary and surface them
/// as [`crate::error::Error::AdapterFailure`]; raw adapter errors never
/// cross an abstraction.
#[async_trait]
pub trait Abstraction: Send + Sync {
    /// Unique abstraction name, e.g. `"content_store"`
    fn name(&self) -> &str;

    /// Identifier of the protocol contract this abstraction fulfils
    fn contract_id(&self) -> &str;

    /// Invoke one capability operation.
    async fn invoke(&self, operation: &str, arguments: &Value, ctx: &UserContext) -> Result<Value>;
}

impl std::fmt::Debug for dyn Abstraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Abstraction")
            .field("name", &self.name())
            .field("contract_id", &self.contract_id())
            .finish()
    }
}
