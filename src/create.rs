//! The per-model create form.
//!
//! Holds the display-shaped values entered into a "new entity" form. The
//! SaveCreate handler reads these to build the create request; a successful
//! submission clears the form.

use std::collections::HashMap;

use crate::action::Action;
use crate::value::EditValue;

/// Create-form values keyed by model, then field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateState {
    forms: HashMap<String, HashMap<String, EditValue>>,
}

impl CreateState {
    /// The form values for a model, if any input has been entered.
    #[must_use]
    pub fn form(&self, model_name: &str) -> Option<&HashMap<String, EditValue>> {
        self.forms.get(model_name)
    }

    /// Applies a create-form action; everything else is ignored.
    pub fn apply(&mut self, action: &Action) {
        match action {
            Action::CreateInputChange(payload) => {
                self.forms
                    .entry(payload.model_name.clone())
                    .or_default()
                    .insert(payload.field_name.clone(), payload.value.clone());
            }
            Action::SaveCreateSuccessful(payload) => {
                self.forms.remove(&payload.model_name);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{CreateInputPayload, ModelScope};
    use serde_json::json;

    #[test]
    fn collects_input_and_clears_on_success() {
        let mut state = CreateState::default();
        state.apply(&Action::CreateInputChange(CreateInputPayload {
            model_name: "Widget".to_string(),
            field_name: "name".to_string(),
            value: EditValue::Scalar(json!("A")),
        }));
        state.apply(&Action::CreateInputChange(CreateInputPayload {
            model_name: "Widget".to_string(),
            field_name: "name".to_string(),
            value: EditValue::Scalar(json!("AB")),
        }));

        let form = state.form("Widget").unwrap();
        assert_eq!(form.get("name"), Some(&EditValue::Scalar(json!("AB"))));

        state.apply(&Action::SaveCreateSuccessful(ModelScope {
            model_name: "Widget".to_string(),
        }));
        assert!(state.form("Widget").is_none());
    }
}
