//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the Capability Platform Kernel
#[derive(Error, Debug)]
pub enum Error {
    /// Startup-time failure: missing dependency, dependency cycle, duplicate
    /// registration. Always fatal - the container never serves requests after
    /// one of these.
    #[error("Initialization error: {message}")]
    Initialization {
        /// Description of the initialization failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Realm policy denied access to an abstraction
    #[error("Access denied for realm '{realm}' to '{abstraction}': {reason}")]
    AccessDenied {
        /// The calling realm
        realm: String,
        /// The abstraction that was requested
        abstraction: String,
        /// Denial reason for audit
        reason: String,
    },

    /// Tenant validation rejected the request
    #[error("Tenant access denied: {message}")]
    TenantAccessDenied {
        /// Description of the tenant mismatch
        message: String,
    },

    /// An adapter-level operation failed. Caught at the abstraction boundary
    /// and converted to a structured response - never propagated raw.
    #[error("Adapter failure in '{adapter}': {message}")]
    AdapterFailure {
        /// Name of the failing adapter
        adapter: String,
        /// Summarized failure description (no transport detail)
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// All resolution tiers were exhausted without success
    #[error("Capability unavailable: {message}")]
    CapabilityUnavailable {
        /// Which capability and which tiers were attempted
        message: String,
    },

    /// The request's cancellation token fired
    #[error("Operation cancelled: {operation}")]
    Cancelled {
        /// The operation that was cancelled
        operation: String,
    },

    /// A tier attempt exceeded its deadline
    #[error("Operation timed out: {operation}")]
    Timeout {
        /// The operation that timed out
        operation: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Startup and access error creation methods
impl Error {
    /// Create an initialization error
    pub fn initialization<S: Into<String>>(message: S) -> Self {
        Self::Initialization {
            message: message.into(),
            source: None,
        }
    }

    /// Create an initialization error with source
    pub fn initialization_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Initialization {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an access denied error
    pub fn access_denied<R, A, M>(realm: R, abstraction: A, reason: M) -> Self
    where
        R: Into<String>,
        A: Into<String>,
        M: Into<String>,
    {
        Self::AccessDenied {
            realm: realm.into(),
            abstraction: abstraction.into(),
            reason: reason.into(),
        }
    }

    /// Create a tenant access denied error
    pub fn tenant_access_denied<S: Into<String>>(message: S) -> Self {
        Self::TenantAccessDenied {
            message: message.into(),
        }
    }
}

// Runtime error creation methods
impl Error {
    /// Create an adapter failure error
    pub fn adapter_failure<A: Into<String>, S: Into<String>>(adapter: A, message: S) -> Self {
        Self::AdapterFailure {
            adapter: adapter.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create an adapter failure error with source
    pub fn adapter_failure_with_source<
        A: Into<String>,
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        adapter: A,
        message: S,
        source: E,
    ) -> Self {
        Self::AdapterFailure {
            adapter: adapter.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a capability unavailable error
    pub fn capability_unavailable<S: Into<String>>(message: S) -> Self {
        Self::CapabilityUnavailable {
            message: message.into(),
        }
    }

    /// Create a cancelled error
    pub fn cancelled<S: Into<String>>(operation: S) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(operation: S) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }
}

// Configuration and misc error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl Error {
    /// Map this error to its stable wire code.
    ///
    /// Every structured response carries one of these codes; callers match
    /// on the code, never on the human-readable message.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Initialization { .. } => crate::capability::codes::INITIALIZATION_FAILED,
            Self::AccessDenied { .. } => crate::capability::codes::ACCESS_DENIED,
            Self::TenantAccessDenied { .. } => crate::capability::codes::TENANT_ACCESS_DENIED,
            Self::AdapterFailure { .. } => crate::capability::codes::ADAPTER_FAILURE,
            Self::CapabilityUnavailable { .. } => crate::capability::codes::CAPABILITY_UNAVAILABLE,
            Self::Cancelled { .. } => crate::capability::codes::CANCELLED,
            Self::Timeout { .. } => crate::capability::codes::TIMEOUT,
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::Json { .. } => "SERIALIZATION_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}
