//! The edit overlay: in-flight edits tracked apart from committed data.
//!
//! Each `(model, id, field)` under active edit holds an [`EditRecord`] with
//! the value as it was when editing began and the value as the user has it
//! now. The overlay never touches the entity store; committed values only
//! change when the orchestrator's submit request succeeds and its follow-up
//! actions update the store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::action::Action;
use crate::schema::Schema;
use crate::value::{Choice, EditValue, FieldKind, NodeId};

/// One field's tracked edit state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRecord {
    /// The committed value at the moment editing began. Immutable for the
    /// life of the record.
    pub initial_value: EditValue,
    /// The value as currently entered.
    pub current_value: EditValue,
}

impl EditRecord {
    /// Seeds a record; initial and current start equal.
    #[must_use]
    pub fn seeded(value: EditValue) -> Self {
        Self {
            initial_value: value.clone(),
            current_value: value,
        }
    }

    /// Returns true if the user has changed the value since seeding.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.initial_value != self.current_value
    }
}

type FieldRecords = HashMap<String, EditRecord>;

/// All edit records, keyed by model, then id, then field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditState {
    rows: HashMap<String, HashMap<NodeId, FieldRecords>>,
}

/// Transforms a committed raw value into its display/edit shape.
///
/// Relations become `{label, value}` pairs (lists for to-many, `Null` for a
/// null to-one); enums become a `{label, value}` pair looked up from the
/// schema's choices, falling back to the raw value as its own label; plain
/// scalars pass through unchanged. Unknown fields are treated as scalars.
#[must_use]
pub fn edit_value(schema: &dyn Schema, model_name: &str, field_name: &str, raw: &Json) -> EditValue {
    let Some(descriptor) = schema.field(model_name, field_name) else {
        return EditValue::Scalar(raw.clone());
    };

    match descriptor.kind {
        FieldKind::ToMany { target } => {
            let nodes = raw.as_array().map(Vec::as_slice).unwrap_or(&[]);
            let choices = nodes
                .iter()
                .filter_map(|node| {
                    let id = NodeId::of_node(node)?;
                    Some(Choice::new(
                        schema.display_value(&target, node),
                        id.as_str(),
                    ))
                })
                .collect();
            EditValue::Choices(choices)
        }
        FieldKind::ToOne { target } => {
            if raw.is_null() {
                return EditValue::Null;
            }
            match NodeId::of_node(raw) {
                Some(id) => EditValue::Choice(Choice::new(
                    schema.display_value(&target, raw),
                    id.as_str(),
                )),
                None => EditValue::Null,
            }
        }
        FieldKind::Enum { choices } => {
            if raw.is_null() {
                return EditValue::Null;
            }
            let value = match raw {
                Json::String(s) => s.clone(),
                other => other.to_string(),
            };
            let label = choices.get(&value).cloned().unwrap_or_else(|| value.clone());
            EditValue::Choice(Choice::new(label, value))
        }
        FieldKind::Scalar { .. } => EditValue::Scalar(raw.clone()),
    }
}

impl EditState {
    /// The record for one field under edit.
    #[must_use]
    pub fn record(&self, model_name: &str, id: &NodeId, field_name: &str) -> Option<&EditRecord> {
        self.rows
            .get(model_name)
            .and_then(|rows| rows.get(id))
            .and_then(|fields| fields.get(field_name))
    }

    /// All records for one entity.
    #[must_use]
    pub fn row(&self, model_name: &str, id: &NodeId) -> Option<&FieldRecords> {
        self.rows.get(model_name).and_then(|rows| rows.get(id))
    }

    /// Returns true if no edits are in flight anywhere.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Applies an edit-overlay action; everything else is ignored.
    pub fn apply(&mut self, schema: &dyn Schema, action: &Action) {
        match action {
            Action::TableRowEdit(payload) => {
                let Some(fields) = payload.node.as_object() else {
                    return;
                };
                let records: FieldRecords = fields
                    .iter()
                    .map(|(field_name, raw)| {
                        let value = edit_value(schema, &payload.model_name, field_name, raw);
                        (field_name.clone(), EditRecord::seeded(value))
                    })
                    .collect();
                self.rows
                    .entry(payload.model_name.clone())
                    .or_default()
                    .insert(payload.id.clone(), records);
            }
            Action::AttributeEdit(payload) => {
                let value = edit_value(
                    schema,
                    &payload.model_name,
                    &payload.field_name,
                    &payload.value,
                );
                self.rows
                    .entry(payload.model_name.clone())
                    .or_default()
                    .entry(payload.id.clone())
                    .or_default()
                    .insert(payload.field_name.clone(), EditRecord::seeded(value));
            }
            Action::EditInputChange(payload) => {
                // Only existing records accept input; a change for a field
                // that never entered edit mode is dropped so seeded
                // initial values stay authoritative.
                if let Some(record) = self
                    .rows
                    .get_mut(&payload.model_name)
                    .and_then(|rows| rows.get_mut(&payload.id))
                    .and_then(|fields| fields.get_mut(&payload.field_name))
                {
                    record.current_value = payload.value.clone();
                }
            }
            Action::TableEditCancel(payload)
            | Action::IndexEditSubmit(payload)
            | Action::DetailTableEditSubmit(payload)
            | Action::DetailAttributeSubmit(payload) => {
                // Cancel and the submit variants all clear the row; for
                // submits the entity store update arriving from the
                // orchestrator is the source of truth for the new value.
                self.remove_row(&payload.model_name, &payload.id);
            }
            Action::AttributeEditCancel(payload) => {
                self.remove_field(&payload.model_name, &payload.id, &payload.field_name);
            }
            Action::FileSubmit(_) => {
                // File upload is out of scope; deliberately inert.
            }
            _ => {}
        }
    }

    fn remove_row(&mut self, model_name: &str, id: &NodeId) {
        if let Some(rows) = self.rows.get_mut(model_name) {
            rows.remove(id);
            if rows.is_empty() {
                self.rows.remove(model_name);
            }
        }
    }

    fn remove_field(&mut self, model_name: &str, id: &NodeId, field_name: &str) {
        let Some(rows) = self.rows.get_mut(model_name) else {
            return;
        };
        if let Some(fields) = rows.get_mut(id) {
            fields.remove(field_name);
            if fields.is_empty() {
                rows.remove(id);
            }
        }
        if rows.is_empty() {
            self.rows.remove(model_name);
        }
    }
}
