//! The combined application state and its reducer.
//!
//! Every slice applies each action independently; trigger actions fall
//! through all slices untouched and are picked up by the orchestrator
//! instead.

use crate::action::Action;
use crate::alert::AlertState;
use crate::create::CreateState;
use crate::edit::EditState;
use crate::model::ModelState;
use crate::options::OptionsState;
use crate::schema::Schema;
use crate::search::SearchState;
use crate::tooltip::TooltipState;
use crate::validation::ValidationState;

/// The whole in-memory application state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    /// The normalized entity cache.
    pub models: ModelState,
    /// In-flight edits, tracked apart from committed data.
    pub edit: EditState,
    /// Search dropdown/page state.
    pub search: SearchState,
    /// Select-menu option lists.
    pub options: OptionsState,
    /// Per-entity tooltip cache.
    pub tooltips: TooltipState,
    /// Create-form validation failures.
    pub validation: ValidationState,
    /// Create-form values.
    pub create: CreateState,
    /// Pending user-visible alerts.
    pub alerts: AlertState,
}

impl AppState {
    /// Applies one action across every slice.
    pub fn apply(&mut self, schema: &dyn Schema, action: &Action) {
        self.models.apply(action);
        self.edit.apply(schema, action);
        self.search.apply(schema, action);
        self.options.apply(schema, action);
        self.tooltips.apply(action);
        self.validation.apply(action);
        self.create.apply(action);
        self.alerts.apply(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{IndexPayload, ModelScope, RowEditPayload};
    use crate::schema::StaticSchema;
    use crate::value::NodeId;
    use serde_json::json;

    #[test]
    fn trigger_actions_leave_state_untouched() {
        let schema = StaticSchema::new();
        let mut state = AppState::default();
        let before = state.clone();

        state.apply(
            &schema,
            &Action::SaveCreate(ModelScope {
                model_name: "Widget".to_string(),
            }),
        );
        // SaveCreate also clears (already empty) validation state.
        assert_eq!(state, before);
    }

    #[test]
    fn edit_then_cancel_never_touches_the_entity_store() {
        let schema = StaticSchema::new();
        let mut state = AppState::default();
        state.apply(
            &schema,
            &Action::UpdateModelIndex(IndexPayload {
                model_name: "Widget".to_string(),
                data: vec![json!({"id": "w1", "name": "A"})],
            }),
        );
        let models_before = state.models.clone();

        state.apply(
            &schema,
            &Action::TableRowEdit(RowEditPayload {
                model_name: "Widget".to_string(),
                id: NodeId::new("w1"),
                node: json!({"id": "w1", "name": "A"}),
            }),
        );
        assert!(!state.edit.is_empty());
        assert_eq!(state.models, models_before);

        state.apply(
            &schema,
            &Action::TableEditCancel(crate::action::NodeScope {
                model_name: "Widget".to_string(),
                id: NodeId::new("w1"),
            }),
        );
        assert!(state.edit.is_empty());
        assert_eq!(state.models, models_before);
    }
}
