//! The Schema Capability: read-only model/field metadata.
//!
//! The schema is an external collaborator; this crate only consumes it. The
//! [`Schema`] trait is the contract, and [`StaticSchema`] is a map-backed
//! implementation for embedders and tests.

use std::collections::HashMap;

use serde_json::Value as Json;

use crate::value::FieldKind;

/// Metadata for a single model field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// The field's kind (scalar, enum, relation).
    pub kind: FieldKind,
}

impl FieldDescriptor {
    /// Creates a descriptor for the given kind.
    #[must_use]
    pub const fn new(kind: FieldKind) -> Self {
        Self { kind }
    }
}

/// Read-only model/field metadata lookup.
///
/// Missing models or fields are reported as `None` / fallback strings; no
/// method panics on unknown names.
pub trait Schema: Send + Sync {
    /// The descriptor for `model_name.field_name`, if the schema knows it.
    fn field(&self, model_name: &str, field_name: &str) -> Option<FieldDescriptor>;

    /// Display label for a model. Falls back to the model name.
    fn model_label(&self, model_name: &str) -> String;

    /// Pluralized display label for a model.
    fn model_label_plural(&self, model_name: &str) -> String;

    /// Human-readable display string for an entity node of the model.
    fn display_value(&self, model_name: &str, node: &Json) -> String;
}

/// Per-model metadata for [`StaticSchema`].
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    name: String,
    label: Option<String>,
    label_plural: Option<String>,
    display_field: String,
    fields: HashMap<String, FieldDescriptor>,
}

impl ModelDescriptor {
    /// Creates a descriptor for the named model. The display field defaults
    /// to `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            label_plural: None,
            display_field: "name".to_string(),
            fields: HashMap::new(),
        }
    }

    /// Sets an explicit display label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets an explicit plural display label.
    #[must_use]
    pub fn label_plural(mut self, label: impl Into<String>) -> Self {
        self.label_plural = Some(label.into());
        self
    }

    /// Sets which field supplies an entity's display string.
    #[must_use]
    pub fn display_field(mut self, field: impl Into<String>) -> Self {
        self.display_field = field.into();
        self
    }

    /// Registers a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), FieldDescriptor::new(kind));
        self
    }
}

/// Map-backed [`Schema`] implementation.
#[derive(Debug, Clone, Default)]
pub struct StaticSchema {
    models: HashMap<String, ModelDescriptor>,
}

impl StaticSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a model descriptor.
    #[must_use]
    pub fn with_model(mut self, model: ModelDescriptor) -> Self {
        self.models.insert(model.name.clone(), model);
        self
    }
}

impl Schema for StaticSchema {
    fn field(&self, model_name: &str, field_name: &str) -> Option<FieldDescriptor> {
        self.models
            .get(model_name)
            .and_then(|m| m.fields.get(field_name))
            .cloned()
    }

    fn model_label(&self, model_name: &str) -> String {
        self.models
            .get(model_name)
            .and_then(|m| m.label.clone())
            .unwrap_or_else(|| model_name.to_string())
    }

    fn model_label_plural(&self, model_name: &str) -> String {
        self.models
            .get(model_name)
            .and_then(|m| m.label_plural.clone())
            .unwrap_or_else(|| format!("{}s", self.model_label(model_name)))
    }

    fn display_value(&self, model_name: &str, node: &Json) -> String {
        let display_field = self
            .models
            .get(model_name)
            .map_or("name", |m| m.display_field.as_str());

        let raw = node.get(display_field).or_else(|| node.get("id"));
        match raw {
            Some(Json::String(s)) => s.clone(),
            Some(Json::Number(n)) => n.to_string(),
            Some(Json::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }
}
