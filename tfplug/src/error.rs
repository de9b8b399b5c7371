//! Error types for tfplug

use std::time::Duration;

/// Outcome of a failed call against a remote management API.
///
/// Remote clients translate their transport-level failures into this
/// taxonomy so the lifecycle controller can decide between "absent",
/// "success" and "real error" without knowing anything about HTTP.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemoteError {
    #[error("remote object not found")]
    NotFound,

    /// The remote service refused the operation because the object is
    /// protected (for example the default configuration of a cluster).
    #[error("remote object is protected: {0}")]
    Protected(String),

    #[error("remote call timed out after {0:?}")]
    Timeout(Duration),

    #[error("remote call cancelled")]
    Cancelled,

    #[error("remote service unavailable: {0}")]
    Unavailable(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("remote API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
}

impl RemoteError {
    /// Transient failures that the caller may retry as a whole operation.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RemoteError::Timeout(_) | RemoteError::Unavailable(_)
        ) || matches!(self, RemoteError::Api { status, .. } if *status == 429 || *status >= 500)
    }
}

/// Error type for tfplug operations
#[derive(Debug, thiserror::Error)]
pub enum TfplugError {
    #[error("invalid value for '{attribute}': {message}")]
    Validation { attribute: String, message: String },

    #[error("{0}")]
    CrossFieldInvariant(String),

    #[error("{operation} {kind} '{identity}': remote object not found")]
    RemoteNotFound {
        operation: &'static str,
        kind: String,
        identity: String,
    },

    #[error("{operation} {kind} '{identity}': {source}")]
    Remote {
        operation: &'static str,
        kind: String,
        identity: String,
        #[source]
        source: RemoteError,
    },

    #[error("expected import id with format: {expected}, got: {got:?}")]
    ImportFormat { expected: String, got: String },

    #[error("failed to find {kind} with the following name: {key}")]
    ImportResolution { kind: String, key: String },

    #[error("changing {} requires replacing the resource", .0.join(", "))]
    RequiresReplace(Vec<String>),

    #[error("Resource type not found: {0}")]
    ResourceNotFound(String),

    #[error("Data source type not found: {0}")]
    DataSourceNotFound(String),

    #[error("Provider not configured")]
    ProviderNotConfigured,

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("{0}")]
    Custom(String),
}

impl TfplugError {
    pub fn validation(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        TfplugError::Validation {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// True when repeating the whole operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TfplugError::Remote { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Short summary line used when the error is surfaced as a diagnostic.
    pub fn summary(&self) -> &'static str {
        match self {
            TfplugError::Validation { .. } => "Invalid configuration",
            TfplugError::CrossFieldInvariant(_) => "Invalid attribute combination",
            TfplugError::RemoteNotFound { .. } => "Remote object not found",
            TfplugError::Remote { .. } => "Remote API error",
            TfplugError::ImportFormat { .. } => "Invalid import id",
            TfplugError::ImportResolution { .. } => "Import failed",
            TfplugError::RequiresReplace(_) => "Resource must be replaced",
            TfplugError::ProviderNotConfigured => "Provider not configured",
            _ => "Provider error",
        }
    }
}

/// Result type alias for tfplug operations
pub type Result<T> = std::result::Result<T, TfplugError>;

impl From<String> for TfplugError {
    fn from(s: String) -> Self {
        TfplugError::Custom(s)
    }
}

impl From<&str> for TfplugError {
    fn from(s: &str) -> Self {
        TfplugError::Custom(s.to_string())
    }
}
