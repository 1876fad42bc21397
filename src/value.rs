//! Field kinds and the value shapes shared across stores.
//!
//! Entity attribute data rides as raw `serde_json::Value` objects, mirroring
//! the backend response shape. Values under active edit are transformed into
//! display-shaped [`EditValue`]s so selects and relation widgets can render
//! `{label, value}` pairs without re-consulting the schema on every frame.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Scalar field classifications recognized by the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ScalarKind {
    String,
    Text,
    Int,
    Float,
    Bool,
    Date,
    Url,
    File,
    Currency,
}

/// Schema-level kind of a model field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// A plain scalar attribute.
    Scalar {
        /// The concrete scalar type.
        scalar: ScalarKind,
    },

    /// An enumerated value with display labels per choice.
    Enum {
        /// Map from stored choice value to display label.
        choices: BTreeMap<String, String>,
    },

    /// A to-one relation reference.
    ToOne {
        /// The related model's name.
        target: String,
    },

    /// A to-many relation reference list.
    ToMany {
        /// The related model's name.
        target: String,
    },
}

impl FieldKind {
    /// Returns true for to-one and to-many relations.
    #[must_use]
    pub const fn is_relation(&self) -> bool {
        matches!(self, Self::ToOne { .. } | Self::ToMany { .. })
    }

    /// Returns true for to-many relations.
    #[must_use]
    pub const fn is_to_many(&self) -> bool {
        matches!(self, Self::ToMany { .. })
    }

    /// The relation target model, if this is a relation.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::ToOne { target } | Self::ToMany { target } => Some(target),
            _ => None,
        }
    }
}

/// Opaque backend entity identifier.
///
/// Backends emit ids as strings or integers; both normalize to the string
/// form so `(model, id)` addressing stays uniform across stores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates an id from anything string-like.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Extracts an id from a raw JSON id value (string or number).
    #[must_use]
    pub fn from_json(value: &Json) -> Option<Self> {
        match value {
            Json::String(s) => Some(Self(s.clone())),
            Json::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// Extracts the `id` field of a raw entity node.
    #[must_use]
    pub fn of_node(node: &Json) -> Option<Self> {
        node.get("id").and_then(Self::from_json)
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A display-labeled selectable value.
///
/// Used for relation references (`value` is the target id), enum choices
/// (`value` is the stored choice), and select option lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Human-readable label.
    pub label: String,
    /// The underlying stored value.
    pub value: String,
}

impl Choice {
    /// Creates a labeled choice.
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A field value in its display/edit form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "value", rename_all = "snake_case")]
pub enum EditValue {
    /// A plain scalar, carried verbatim.
    Scalar(Json),
    /// A to-one relation or enum selection.
    Choice(Choice),
    /// A to-many relation selection list.
    Choices(Vec<Choice>),
    /// An unset relation or enum.
    Null,
}

impl EditValue {
    /// Returns true if this is the null shape.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The single choice, if this is a choice shape.
    #[must_use]
    pub const fn as_choice(&self) -> Option<&Choice> {
        match self {
            Self::Choice(c) => Some(c),
            _ => None,
        }
    }

    /// Serializes back to the wire shape expected by the backend:
    /// choices collapse to their stored values, scalars pass through.
    #[must_use]
    pub fn to_wire(&self) -> Json {
        match self {
            Self::Scalar(v) => v.clone(),
            Self::Choice(c) => Json::String(c.value.clone()),
            Self::Choices(cs) => {
                Json::Array(cs.iter().map(|c| Json::String(c.value.clone())).collect())
            }
            Self::Null => Json::Null,
        }
    }
}

impl Default for EditValue {
    fn default() -> Self {
        Self::Null
    }
}

/// Deep-merges `incoming` onto `existing`.
///
/// Objects merge recursively: fields absent from `incoming` are preserved,
/// everything else (scalars, arrays, nulls) is taken from `incoming`.
#[must_use]
pub fn deep_merge(existing: &Json, incoming: &Json) -> Json {
    match (existing, incoming) {
        (Json::Object(old), Json::Object(new)) => {
            let mut out = old.clone();
            for (key, new_value) in new {
                match out.get(key) {
                    Some(old_value) => {
                        let merged = deep_merge(old_value, new_value);
                        out.insert(key.clone(), merged);
                    }
                    None => {
                        out.insert(key.clone(), new_value.clone());
                    }
                }
            }
            Json::Object(out)
        }
        (_, new) => new.clone(),
    }
}
