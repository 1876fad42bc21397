//! Field-validation failure state for the create form.
//!
//! Holds which fields the backend rejected on the most recent create
//! submission, so the form can highlight them. Cleared on resubmission and
//! on success.

use crate::action::Action;

/// The most recent create-submission validation failure, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationState {
    model_name: Option<String>,
    failed_fields: Vec<String>,
}

impl ValidationState {
    /// Returns true if the given field failed validation on the last
    /// submission for this model.
    #[must_use]
    pub fn failed(&self, model_name: &str, field_name: &str) -> bool {
        self.model_name.as_deref() == Some(model_name)
            && self.failed_fields.iter().any(|f| f == field_name)
    }

    /// The rejected field names.
    #[must_use]
    pub fn failed_fields(&self) -> &[String] {
        &self.failed_fields
    }

    /// Applies a validation-relevant action; everything else is ignored.
    pub fn apply(&mut self, action: &Action) {
        match action {
            Action::ValidationErrorCreate(payload) => {
                self.model_name = Some(payload.model_name.clone());
                self.failed_fields = payload.errors.clone();
            }
            Action::SaveCreate(_) | Action::SaveCreateSuccessful(_) => {
                self.model_name = None;
                self.failed_fields.clear();
            }
            _ => {}
        }
    }
}
