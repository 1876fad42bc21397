//! The action-processing orchestrator.
//!
//! Maps each trigger action to a three-stage pipeline: **build** derives a
//! request from the action payload and a state snapshot (synchronous, no
//! suspension), **execute** hands the request to the Query Capability, and
//! **translate** turns the outcome into follow-up actions for the reducers.
//! The orchestrator never mutates state itself.
//!
//! Registration is an explicit static table ([`HandlerKind::for_action`]),
//! not a naming convention: every trigger action names its handler in one
//! place, built once, with no runtime reflection.

use std::sync::Arc;

use serde_json::{json, Value as Json};

use crate::action::{
    Action, AlertPayload, IndexPayload, ModelScope, OptionDataPayload, OptionValuesPayload,
    TooltipPayload, ValidationPayload,
};
use crate::alert::AlertKind;
use crate::error::{RequestError, SchemaError, SyncError, SyncResult};
use crate::query::{QueryClient, QuerySpec, QueryType, RequestDescriptor};
use crate::state::AppState;
use crate::value::NodeId;

/// The handlers the orchestrator registers, one per trigger action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// Submit the create form.
    SaveCreate,
    /// Load distinct existing values for a free-text selectable field.
    QuerySelectMenuOpen,
    /// Load a relation field's target entities.
    RelationshipSelectMenuOpen,
    /// Fetch a tooltip projection for one entity.
    FetchTooltip,
}

impl HandlerKind {
    /// Every registered handler.
    pub const ALL: [Self; 4] = [
        Self::SaveCreate,
        Self::QuerySelectMenuOpen,
        Self::RelationshipSelectMenuOpen,
        Self::FetchTooltip,
    ];

    /// The registration table: trigger action type → handler.
    ///
    /// Non-trigger actions have no handler and are reducer-only.
    #[must_use]
    pub fn for_action(action: &Action) -> Option<Self> {
        match action {
            Action::SaveCreate(_) => Some(Self::SaveCreate),
            Action::QuerySelectMenuOpen(_) => Some(Self::QuerySelectMenuOpen),
            Action::RelationshipSelectMenuOpen(_) => Some(Self::RelationshipSelectMenuOpen),
            Action::FetchTooltip(_) => Some(Self::FetchTooltip),
            _ => None,
        }
    }
}

/// Everything translate needs to interpret a completed request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Which handler issued the request.
    pub kind: HandlerKind,
    /// The model the triggering action was scoped to.
    pub model_name: String,
    /// The field scope, for field-level handlers.
    pub field_name: Option<String>,
    /// The relation's target model, for relation option loading.
    pub target_model: Option<String>,
    /// The entity scope, for tooltip fetches.
    pub id: Option<NodeId>,
}

/// A built, not-yet-executed request.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// The executable descriptor from the Query Capability.
    pub descriptor: RequestDescriptor,
    /// Request variables.
    pub variables: Json,
    /// Carried through to translate.
    pub context: RequestContext,
}

const CREATE_FAILED_MSG: &str = "Error submitting form.";
const OPTION_FAILED_MSG: &str = "Error loading form option.";

/// Normalizes response data into an entity list: either the payload is the
/// list itself, or it wraps one under `result`.
fn result_list(data: &Json) -> Vec<Json> {
    if let Some(list) = data.as_array() {
        return list.clone();
    }
    if let Some(list) = data.get("result").and_then(Json::as_array) {
        return list.clone();
    }
    Vec::new()
}

/// Normalizes response data into a single node, unwrapping `result`.
fn result_node(data: Json) -> Json {
    match data {
        Json::Object(ref obj) if obj.contains_key("result") => {
            data.get("result").cloned().unwrap_or(Json::Null)
        }
        other => other,
    }
}

/// Builds requests from trigger actions and translates their outcomes into
/// follow-up actions.
#[derive(Clone)]
pub struct Orchestrator {
    schema: Arc<dyn crate::schema::Schema>,
    query: Arc<dyn QueryClient>,
}

impl Orchestrator {
    /// Creates an orchestrator over the injected capabilities.
    #[must_use]
    pub fn new(schema: Arc<dyn crate::schema::Schema>, query: Arc<dyn QueryClient>) -> Self {
        Self { schema, query }
    }

    /// The schema the orchestrator resolves relations against.
    #[must_use]
    pub fn schema(&self) -> &dyn crate::schema::Schema {
        self.schema.as_ref()
    }

    /// Stage one: derive a request from the trigger and a state snapshot.
    pub fn build(
        &self,
        kind: HandlerKind,
        action: &Action,
        state: &AppState,
    ) -> SyncResult<PreparedRequest> {
        match (kind, action) {
            (HandlerKind::SaveCreate, Action::SaveCreate(scope)) => {
                self.build_save_create(scope, state)
            }
            (HandlerKind::QuerySelectMenuOpen, Action::QuerySelectMenuOpen(scope)) => {
                let spec = QuerySpec::field(
                    &scope.model_name,
                    &scope.field_name,
                    QueryType::SelectExistingFields,
                );
                let descriptor = self.query.build_query(&spec)?;
                Ok(PreparedRequest {
                    descriptor,
                    variables: json!({
                        "modelName": scope.model_name,
                        "fieldName": scope.field_name,
                    }),
                    context: RequestContext {
                        kind,
                        model_name: scope.model_name.clone(),
                        field_name: Some(scope.field_name.clone()),
                        target_model: None,
                        id: None,
                    },
                })
            }
            (HandlerKind::RelationshipSelectMenuOpen, Action::RelationshipSelectMenuOpen(scope)) => {
                let descriptor_for_field = self
                    .schema
                    .field(&scope.model_name, &scope.field_name)
                    .ok_or_else(|| SchemaError::UnknownField {
                        model_name: scope.model_name.clone(),
                        field_name: scope.field_name.clone(),
                    })?;
                let target = descriptor_for_field
                    .kind
                    .target()
                    .ok_or_else(|| SchemaError::NotARelation {
                        model_name: scope.model_name.clone(),
                        field_name: scope.field_name.clone(),
                    })?
                    .to_string();

                let spec = QuerySpec::model(&target, QueryType::Select);
                let descriptor = self.query.build_query(&spec)?;
                Ok(PreparedRequest {
                    descriptor,
                    variables: json!({
                        "sort": [{"field": "id", "direction": "asc"}],
                    }),
                    context: RequestContext {
                        kind,
                        model_name: scope.model_name.clone(),
                        field_name: Some(scope.field_name.clone()),
                        target_model: Some(target),
                        id: None,
                    },
                })
            }
            (HandlerKind::FetchTooltip, Action::FetchTooltip(scope)) => {
                let spec = QuerySpec::model(&scope.model_name, QueryType::Tooltip);
                let descriptor = self.query.build_query(&spec)?;
                Ok(PreparedRequest {
                    descriptor,
                    variables: json!({"id": scope.id.as_str()}),
                    context: RequestContext {
                        kind,
                        model_name: scope.model_name.clone(),
                        field_name: None,
                        target_model: None,
                        id: Some(scope.id.clone()),
                    },
                })
            }
            _ => Err(SyncError::internal(
                "trigger action does not match its registered handler",
            )),
        }
    }

    fn build_save_create(&self, scope: &ModelScope, state: &AppState) -> SyncResult<PreparedRequest> {
        // Client-side id placeholders never reach the backend.
        let mut input = serde_json::Map::new();
        if let Some(form) = state.create.form(&scope.model_name) {
            for (field_name, value) in form {
                if field_name == "id" {
                    continue;
                }
                input.insert(field_name.clone(), value.to_wire());
            }
        }

        let spec = QuerySpec::model(&scope.model_name, QueryType::Create);
        let descriptor = self.query.build_query(&spec)?;
        Ok(PreparedRequest {
            descriptor,
            variables: json!({"input": Json::Object(input)}),
            context: RequestContext {
                kind: HandlerKind::SaveCreate,
                model_name: scope.model_name.clone(),
                field_name: None,
                target_model: None,
                id: None,
            },
        })
    }

    /// Stage two: execute a prepared request through the Query Capability.
    ///
    /// Blocking; the runtime calls this from a request worker.
    pub fn execute(&self, prepared: &PreparedRequest) -> Result<Json, RequestError> {
        self.query
            .send_request(&prepared.descriptor, prepared.variables.clone())
    }

    /// Stage three: translate a request outcome into follow-up actions.
    #[must_use]
    pub fn translate(
        &self,
        context: &RequestContext,
        result: Result<Json, RequestError>,
    ) -> Vec<Action> {
        match result {
            Ok(data) => self.translate_success(context, data),
            Err(error) => self.translate_error(context, &error),
        }
    }

    fn translate_success(&self, context: &RequestContext, data: Json) -> Vec<Action> {
        match context.kind {
            HandlerKind::SaveCreate => vec![
                Action::SaveCreateSuccessful(ModelScope {
                    model_name: context.model_name.clone(),
                }),
                Action::AddAlert(AlertPayload {
                    kind: AlertKind::Success,
                    message: format!("{} successfully created.", context.model_name),
                }),
            ],
            HandlerKind::QuerySelectMenuOpen => vec![Action::ExistingValueUpdate(
                OptionValuesPayload {
                    model_name: context.model_name.clone(),
                    field_name: context.field_name.clone().unwrap_or_default(),
                    values: result_list(&data),
                },
            )],
            HandlerKind::RelationshipSelectMenuOpen => {
                let entities = result_list(&data);
                let target = context
                    .target_model
                    .clone()
                    .unwrap_or_else(|| context.model_name.clone());
                // Options first, then the normalized cache.
                vec![
                    Action::DataOptionsUpdate(OptionDataPayload {
                        model_name: context.model_name.clone(),
                        field_name: context.field_name.clone().unwrap_or_default(),
                        data: entities.clone(),
                    }),
                    Action::UpdateModelIndex(IndexPayload {
                        model_name: target,
                        data: entities,
                    }),
                ]
            }
            HandlerKind::FetchTooltip => match context.id.clone() {
                Some(id) => vec![Action::UpdateModelTooltip(TooltipPayload {
                    model_name: context.model_name.clone(),
                    id,
                    data: result_node(data),
                })],
                None => Vec::new(),
            },
        }
    }

    fn translate_error(&self, context: &RequestContext, error: &RequestError) -> Vec<Action> {
        tracing::error!(
            handler = ?context.kind,
            model = %context.model_name,
            field = context.field_name.as_deref().unwrap_or(""),
            %error,
            "request failed"
        );

        match context.kind {
            HandlerKind::SaveCreate => {
                let mut actions = Vec::with_capacity(2);
                if error.is_validation() {
                    actions.push(Action::ValidationErrorCreate(ValidationPayload {
                        model_name: context.model_name.clone(),
                        errors: error.failed_fields(),
                    }));
                }
                actions.push(Action::AddAlert(AlertPayload {
                    kind: AlertKind::Danger,
                    message: CREATE_FAILED_MSG.to_string(),
                }));
                actions
            }
            HandlerKind::QuerySelectMenuOpen | HandlerKind::RelationshipSelectMenuOpen => {
                vec![Action::AddAlert(AlertPayload {
                    kind: AlertKind::Danger,
                    message: OPTION_FAILED_MSG.to_string(),
                })]
            }
            // Tooltip failures are log-only; no store action, no alert.
            HandlerKind::FetchTooltip => Vec::new(),
        }
    }

    /// Follow-up actions for a request that failed before it was issued
    /// (schema resolution, descriptor construction).
    #[must_use]
    pub fn build_failure_actions(&self, kind: HandlerKind, error: &SyncError) -> Vec<Action> {
        tracing::error!(handler = ?kind, %error, "request build failed");
        match kind {
            HandlerKind::SaveCreate => vec![Action::AddAlert(AlertPayload {
                kind: AlertKind::Danger,
                message: CREATE_FAILED_MSG.to_string(),
            })],
            HandlerKind::QuerySelectMenuOpen | HandlerKind::RelationshipSelectMenuOpen => {
                vec![Action::AddAlert(AlertPayload {
                    kind: AlertKind::Danger,
                    message: OPTION_FAILED_MSG.to_string(),
                })]
            }
            HandlerKind::FetchTooltip => Vec::new(),
        }
    }
}
