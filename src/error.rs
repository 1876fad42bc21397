//! Error types for syncstore.
//!
//! All errors are strongly typed using thiserror. Request failures carry
//! enough structure for the orchestrator to translate them into follow-up
//! actions (field-level validation errors versus generic failures).

use std::collections::BTreeMap;

use thiserror::Error;

/// Failures reported by the Query Capability for an executed request.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// The backend rejected specific fields of a submitted form.
    #[error("Validation failed for {} field(s)", errors.len())]
    Validation {
        /// Map from field name to the backend's rejection reason.
        errors: BTreeMap<String, String>,
    },

    /// Network or server failure with no structured field information.
    #[error("Request failed: {message}")]
    Request {
        /// Transport-level failure description.
        message: String,
    },

    /// The requested model/id combination does not exist.
    #[error("Not found: {model_name}")]
    NotFound {
        /// The model the lookup targeted.
        model_name: String,
    },
}

impl RequestError {
    /// Returns true if this is a field-validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// The rejected field names, in stable (sorted) order.
    ///
    /// Empty for non-validation errors.
    #[must_use]
    pub fn failed_fields(&self) -> Vec<String> {
        match self {
            Self::Validation { errors } => errors.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }
}

/// Errors produced while resolving schema metadata during request building.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// The schema has no descriptor for the given field.
    #[error("Unknown field: {model_name}.{field_name}")]
    UnknownField {
        /// The model looked up.
        model_name: String,
        /// The missing field.
        field_name: String,
    },

    /// The field exists but is not a relation, so it has no target model.
    #[error("Field {model_name}.{field_name} is not a relation")]
    NotARelation {
        /// The model looked up.
        model_name: String,
        /// The non-relation field.
        field_name: String,
    },
}

/// Errors raised by the runtime's action queue.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// The bounded action queue is full.
    #[error("Action queue is full (capacity {capacity})")]
    QueueFull {
        /// The queue's configured capacity.
        capacity: usize,
    },

    /// The runtime has shut down and no longer accepts actions.
    #[error("Runtime disconnected")]
    Disconnected,

    /// Waiting for in-flight requests exceeded the given timeout.
    #[error("Settle timed out after {duration_ms}ms")]
    Timeout {
        /// The timeout that elapsed, in milliseconds.
        duration_ms: u64,
    },
}

/// Top-level error type for syncstore.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Schema resolution failed while building a request.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// An executed request failed.
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// The runtime's action queue rejected a dispatch.
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A broken internal invariant.
    #[error("Internal error: {message}")]
    Internal {
        /// What went wrong.
        message: String,
    },
}

impl SyncError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a schema-resolution error.
    #[must_use]
    pub const fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }

    /// Returns true if this wraps a request failure.
    #[must_use]
    pub const fn is_request(&self) -> bool {
        matches!(self, Self::Request(_))
    }

    /// Returns true if this is a queue/dispatch error.
    #[must_use]
    pub const fn is_dispatch(&self) -> bool {
        matches!(self, Self::Dispatch(_))
    }
}

/// Result type alias for syncstore operations.
pub type SyncResult<T> = Result<T, SyncError>;
