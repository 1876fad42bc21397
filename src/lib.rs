//! # syncstore - Client-side data synchronization core
//!
//! syncstore keeps a normalized client-side cache of backend entities in
//! sync with user interactions. Every change flows through a single action
//! queue: reducers fold actions into state, and an orchestrator turns
//! trigger actions into backend requests whose completions come back as
//! further actions.
//!
//! ## Core Concepts
//!
//! - **Action**: A typed description of something that happened
//! - **AppState**: The reducer-owned state, one slice per concern
//! - **Orchestrator**: Builds, executes, and translates backend requests
//! - **SyncRuntime**: Single dispatcher thread plus a request worker pool
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use syncstore::{Action, ModelScope, RuntimeConfig, SyncRuntime};
//!
//! let runtime = SyncRuntime::start(schema, query_client, RuntimeConfig::default());
//!
//! let request_id = runtime.dispatch(Action::SaveCreate(ModelScope {
//!     model_name: "Widget".to_string(),
//! }))?;
//!
//! let state = runtime.settle(std::time::Duration::from_secs(1))?;
//! assert!(state.create.form("Widget").is_none());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod action;
pub mod alert;
pub mod error;
pub mod query;
pub mod schema;
pub mod value;

// State slices and reducers
pub mod create;
pub mod edit;
pub mod model;
pub mod options;
pub mod search;
pub mod state;
pub mod tooltip;
pub mod validation;

// Request pipeline and runtime
pub mod orchestrator;
pub mod runtime;

// Re-export primary types at crate root for convenience
pub use action::{
    Action, ActionEnvelope, AttributeEditPayload, CreateInputPayload, DetailPayload,
    FieldEditScope, FieldScope, IndexPayload, InputChangePayload, ModelScope, NodeScope,
    RowEditPayload,
};
pub use alert::{Alert, AlertKind, AlertState};
pub use create::CreateState;
pub use edit::{EditRecord, EditState};
pub use error::{DispatchError, RequestError, SchemaError, SyncError, SyncResult};
pub use model::{
    paginated_node, slice_page, ModelState, ModelStore, PageCursors, DEFAULT_PAGE_SIZE,
};
pub use options::OptionsState;
pub use orchestrator::{HandlerKind, Orchestrator, PreparedRequest, RequestContext};
pub use query::{QueryClient, QuerySpec, QueryType, RequestDescriptor};
pub use runtime::{RuntimeConfig, SyncRuntime};
pub use schema::{FieldDescriptor, ModelDescriptor, Schema, StaticSchema};
pub use search::{SearchEntry, SearchFilter, SearchState};
pub use state::AppState;
pub use tooltip::TooltipState;
pub use validation::ValidationState;
pub use value::{deep_merge, Choice, EditValue, FieldKind, NodeId, ScalarKind};
