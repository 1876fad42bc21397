//! The Query Capability: request construction and execution.
//!
//! Network transport and query-language details live behind the
//! [`QueryClient`] trait; the orchestrator only builds a [`QuerySpec`],
//! hands the resulting descriptor plus variables to `send_request`, and
//! interprets the outcome.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::{RequestError, SyncResult};

/// The operation kinds a request can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    /// Create a new entity from form input.
    Create,
    /// List a model's entities for select menus.
    Select,
    /// List distinct existing values of a free-text field.
    SelectExistingFields,
    /// Fetch a tooltip-shaped projection of one entity.
    Tooltip,
    /// Fetch one entity in full (used by collaborators outside this core).
    Detail,
    /// Fetch a model's index listing.
    Index,
    /// Delete an entity.
    Delete,
}

/// What a handler wants from the backend; input to `build_query`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuerySpec {
    /// The model the query targets.
    pub model_name: String,
    /// The field scope, for field-level queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    /// The operation kind.
    pub query_type: QueryType,
}

impl QuerySpec {
    /// A model-scoped spec with no field.
    #[must_use]
    pub fn model(model_name: impl Into<String>, query_type: QueryType) -> Self {
        Self {
            model_name: model_name.into(),
            field_name: None,
            query_type,
        }
    }

    /// A field-scoped spec.
    #[must_use]
    pub fn field(
        model_name: impl Into<String>,
        field_name: impl Into<String>,
        query_type: QueryType,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            field_name: Some(field_name.into()),
            query_type,
        }
    }
}

/// An executable request produced by `build_query`.
///
/// The `document` is whatever the client's transport needs (a GraphQL
/// document, a URL, …); this crate treats it as opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// The spec this descriptor was built from.
    pub spec: QuerySpec,
    /// Opaque transport payload.
    pub document: String,
}

/// Injected network capability.
///
/// `send_request` blocks; the runtime always calls it from a request worker
/// thread, never from the dispatcher.
pub trait QueryClient: Send + Sync {
    /// Produces a request descriptor for the given spec.
    fn build_query(&self, spec: &QuerySpec) -> SyncResult<RequestDescriptor>;

    /// Executes a request, resolving to response data or a structured error.
    fn send_request(
        &self,
        request: &RequestDescriptor,
        variables: Json,
    ) -> Result<Json, RequestError>;
}
