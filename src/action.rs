//! The action catalogue.
//!
//! Every state transition in this crate is driven by an [`Action`]. Each
//! variant carries a payload struct with exactly the fields its consumers
//! need; model-scoped payloads always carry `model_name`. Trigger actions
//! (the first group) are consumed by the orchestrator and leave state
//! untouched; store actions are consumed by the reducers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use uuid::Uuid;

use crate::alert::AlertKind;
use crate::value::{EditValue, NodeId};

/// Scope payload: a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelScope {
    /// The model this action targets.
    pub model_name: String,
}

/// Scope payload: a model field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldScope {
    /// The model owning the field.
    pub model_name: String,
    /// The field this action targets.
    pub field_name: String,
}

/// Scope payload: one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeScope {
    /// The entity's model.
    pub model_name: String,
    /// The entity's id.
    pub id: NodeId,
}

/// Scope payload: one field of one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEditScope {
    /// The entity's model.
    pub model_name: String,
    /// The entity's id.
    pub id: NodeId,
    /// The field under edit.
    pub field_name: String,
}

/// Payload for an index refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexPayload {
    /// The model whose listing is refreshed.
    pub model_name: String,
    /// Entity nodes in response order.
    pub data: Vec<Json>,
}

/// Payload for a single-entity detail update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailPayload {
    /// The entity's model.
    pub model_name: String,
    /// The entity's id.
    pub id: NodeId,
    /// The full fetched node.
    pub data: Json,
}

/// Payload seeding a whole-row edit from a committed entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowEditPayload {
    /// The entity's model.
    pub model_name: String,
    /// The entity's id.
    pub id: NodeId,
    /// The committed entity node to seed from.
    pub node: Json,
}

/// Payload seeding a single-field edit from a committed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeEditPayload {
    /// The entity's model.
    pub model_name: String,
    /// The entity's id.
    pub id: NodeId,
    /// The field entering edit mode.
    pub field_name: String,
    /// The committed raw value to seed from.
    pub value: Json,
}

/// Payload for a keystroke/selection on a field under edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputChangePayload {
    /// The entity's model.
    pub model_name: String,
    /// The entity's id.
    pub id: NodeId,
    /// The field under edit.
    pub field_name: String,
    /// The new current (display-shaped) value.
    pub value: EditValue,
}

/// Payload for a keystroke/selection on a create-form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateInputPayload {
    /// The model being created.
    pub model_name: String,
    /// The form field.
    pub field_name: String,
    /// The entered (display-shaped) value.
    pub value: EditValue,
}

/// Payload marking which fields the backend rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPayload {
    /// The model whose submission was rejected.
    pub model_name: String,
    /// The rejected field names.
    pub errors: Vec<String>,
}

/// Payload replacing a free-text field's existing-value options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionValuesPayload {
    /// The model owning the field.
    pub model_name: String,
    /// The free-text selectable field.
    pub field_name: String,
    /// Raw distinct values reported by the backend.
    pub values: Vec<Json>,
}

/// Payload replacing a relation field's options with fetched entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDataPayload {
    /// The model owning the relation field.
    pub model_name: String,
    /// The relation field.
    pub field_name: String,
    /// Fetched target-model entity nodes.
    pub data: Vec<Json>,
}

/// Payload updating the per-entity tooltip cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipPayload {
    /// The entity's model.
    pub model_name: String,
    /// The entity's id.
    pub id: NodeId,
    /// The tooltip-shaped projection.
    pub data: Json,
}

/// Payload carrying raw search matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDataPayload {
    /// Raw matches; each node carries `__typename` and `id`.
    pub data: Vec<Json>,
}

/// Payload for search-box text changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTextPayload {
    /// The search box contents.
    pub query_text: String,
}

/// Payload for a user-visible alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPayload {
    /// Severity.
    pub kind: AlertKind,
    /// Message text.
    pub message: String,
}

/// All recognized actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Action {
    // -- triggers (handled by the orchestrator) --
    /// Submit the create form for a model.
    SaveCreate(ModelScope),
    /// A free-text selectable field's menu was opened.
    QuerySelectMenuOpen(FieldScope),
    /// A relation field's dropdown menu was opened.
    RelationshipSelectMenuOpen(FieldScope),
    /// A tooltip was opened for an entity.
    FetchTooltip(NodeScope),

    // -- normalized entity store --
    /// Replace a model's visible listing, deep-merging cached nodes.
    UpdateModelIndex(IndexPayload),
    /// Merge-free replace of one entity.
    UpdateModelDetail(DetailPayload),
    /// Remove an entity from the store entirely.
    DeleteModel(NodeScope),
    /// Tombstone an entity in place (dangling relation reference).
    RemoveInstance(NodeScope),
    /// Replace a model's store with the not-found sentinel.
    ModelNotFound(ModelScope),

    // -- edit overlay --
    /// Enter whole-row edit mode.
    TableRowEdit(RowEditPayload),
    /// Enter single-attribute edit mode.
    AttributeEdit(AttributeEditPayload),
    /// Keystroke/selection on a field under edit.
    EditInputChange(InputChangePayload),
    /// Cancel a whole-row edit.
    TableEditCancel(NodeScope),
    /// Cancel a single-attribute edit.
    AttributeEditCancel(FieldEditScope),
    /// Submit a row edit from an index table.
    IndexEditSubmit(NodeScope),
    /// Submit a row edit from a detail-page table.
    DetailTableEditSubmit(NodeScope),
    /// Submit a single-attribute edit from a detail page.
    DetailAttributeSubmit(NodeScope),
    /// File-field submission; deliberately inert (upload is out of scope).
    FileSubmit(FieldEditScope),

    // -- create form --
    /// Keystroke/selection on a create-form field.
    CreateInputChange(CreateInputPayload),
    /// The backend accepted a create submission.
    SaveCreateSuccessful(ModelScope),
    /// The backend rejected specific fields of a create submission.
    ValidationErrorCreate(ValidationPayload),

    // -- field options --
    /// Replace a free-text field's option list with existing values.
    ExistingValueUpdate(OptionValuesPayload),
    /// Replace a relation field's option list with fetched entities.
    DataOptionsUpdate(OptionDataPayload),

    // -- tooltips --
    /// Update the per-entity tooltip cache.
    UpdateModelTooltip(TooltipPayload),

    // -- search --
    /// New quick-search (dropdown) results arrived.
    UpdateQuickSearchEntries(SearchDataPayload),
    /// New search-page results arrived.
    UpdateSearchPageEntries(SearchDataPayload),
    /// The search box text changed.
    SearchQueryTextChanged(QueryTextPayload),
    /// A search-page model filter checkbox was toggled.
    SearchFilterToggled(ModelScope),
    /// A search result link was followed.
    SearchLinkClicked,
    /// Focus left the search box.
    SearchBlur,
    /// Focus entered the search box.
    TriggerSearch,

    // -- alerts --
    /// Queue a user-visible alert.
    AddAlert(AlertPayload),
}

impl Action {
    /// The model this action is scoped to, when it is model-scoped.
    #[must_use]
    pub fn model_name(&self) -> Option<&str> {
        match self {
            Self::SaveCreate(p)
            | Self::ModelNotFound(p)
            | Self::SaveCreateSuccessful(p)
            | Self::SearchFilterToggled(p) => Some(&p.model_name),
            Self::QuerySelectMenuOpen(p) | Self::RelationshipSelectMenuOpen(p) => {
                Some(&p.model_name)
            }
            Self::FetchTooltip(p)
            | Self::DeleteModel(p)
            | Self::RemoveInstance(p)
            | Self::TableEditCancel(p)
            | Self::IndexEditSubmit(p)
            | Self::DetailTableEditSubmit(p)
            | Self::DetailAttributeSubmit(p) => Some(&p.model_name),
            Self::UpdateModelIndex(p) => Some(&p.model_name),
            Self::UpdateModelDetail(p) => Some(&p.model_name),
            Self::TableRowEdit(p) => Some(&p.model_name),
            Self::AttributeEdit(p) => Some(&p.model_name),
            Self::EditInputChange(p) => Some(&p.model_name),
            Self::AttributeEditCancel(p) | Self::FileSubmit(p) => Some(&p.model_name),
            Self::CreateInputChange(p) => Some(&p.model_name),
            Self::ValidationErrorCreate(p) => Some(&p.model_name),
            Self::ExistingValueUpdate(p) => Some(&p.model_name),
            Self::DataOptionsUpdate(p) => Some(&p.model_name),
            Self::UpdateModelTooltip(p) => Some(&p.model_name),
            Self::UpdateQuickSearchEntries(_)
            | Self::UpdateSearchPageEntries(_)
            | Self::SearchQueryTextChanged(_)
            | Self::SearchLinkClicked
            | Self::SearchBlur
            | Self::TriggerSearch
            | Self::AddAlert(_) => None,
        }
    }
}

/// A dispatched action plus correlation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEnvelope {
    /// Unique identifier for tracing/debugging.
    pub request_id: Uuid,
    /// When the action was dispatched.
    pub timestamp: DateTime<Utc>,
    /// The action itself.
    pub action: Action,
}

impl ActionEnvelope {
    /// Wraps an action with a fresh id and the current time.
    #[must_use]
    pub fn new(action: Action) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            action,
        }
    }

    /// Wraps a follow-up action under the request id of the trigger that
    /// caused it, so the whole round trip shares one correlation id.
    #[must_use]
    pub fn correlated(request_id: Uuid, action: Action) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
            action,
        }
    }
}
