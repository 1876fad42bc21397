//! Option lists for select menus, keyed by `(model, field)`.
//!
//! Free-text selectable fields get their distinct existing values; relation
//! fields get the fetched target-model entities, labeled through the Schema
//! Capability. Each update replaces the field's whole list.

use std::collections::HashMap;

use serde_json::Value as Json;

use crate::action::Action;
use crate::schema::Schema;
use crate::value::{Choice, NodeId};

/// Per-field option lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsState {
    fields: HashMap<String, HashMap<String, Vec<Choice>>>,
}

fn scalar_label(value: &Json) -> String {
    match value {
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl OptionsState {
    /// The option list for a field; empty if never loaded.
    #[must_use]
    pub fn options(&self, model_name: &str, field_name: &str) -> &[Choice] {
        self.fields
            .get(model_name)
            .and_then(|fields| fields.get(field_name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Applies an options action; everything else is ignored.
    pub fn apply(&mut self, schema: &dyn Schema, action: &Action) {
        match action {
            Action::ExistingValueUpdate(payload) => {
                let choices = payload
                    .values
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(|v| {
                        let s = scalar_label(v);
                        Choice::new(s.clone(), s)
                    })
                    .collect();
                self.replace(&payload.model_name, &payload.field_name, choices);
            }
            Action::DataOptionsUpdate(payload) => {
                // Labels come from the relation's target model.
                let target = schema
                    .field(&payload.model_name, &payload.field_name)
                    .and_then(|descriptor| descriptor.kind.target().map(str::to_string))
                    .unwrap_or_else(|| payload.model_name.clone());

                let choices = payload
                    .data
                    .iter()
                    .filter_map(|node| {
                        let id = NodeId::of_node(node)?;
                        Some(Choice::new(schema.display_value(&target, node), id.as_str()))
                    })
                    .collect();
                self.replace(&payload.model_name, &payload.field_name, choices);
            }
            _ => {}
        }
    }

    fn replace(&mut self, model_name: &str, field_name: &str, choices: Vec<Choice>) {
        self.fields
            .entry(model_name.to_string())
            .or_default()
            .insert(field_name.to_string(), choices);
    }
}
