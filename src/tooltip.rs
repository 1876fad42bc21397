//! Per-entity tooltip projection cache.

use std::collections::HashMap;

use serde_json::Value as Json;

use crate::action::Action;
use crate::value::NodeId;

/// Cached tooltip data keyed by `(model, id)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TooltipState {
    tooltips: HashMap<String, HashMap<NodeId, Json>>,
}

impl TooltipState {
    /// The cached tooltip projection for an entity, if fetched.
    #[must_use]
    pub fn tooltip(&self, model_name: &str, id: &NodeId) -> Option<&Json> {
        self.tooltips
            .get(model_name)
            .and_then(|nodes| nodes.get(id))
    }

    /// Applies a tooltip action; everything else is ignored.
    pub fn apply(&mut self, action: &Action) {
        if let Action::UpdateModelTooltip(payload) = action {
            self.tooltips
                .entry(payload.model_name.clone())
                .or_default()
                .insert(payload.id.clone(), payload.data.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::TooltipPayload;
    use serde_json::json;

    #[test]
    fn caches_and_replaces_per_entity() {
        let mut state = TooltipState::default();
        let update = |data: Json| {
            Action::UpdateModelTooltip(TooltipPayload {
                model_name: "Widget".to_string(),
                id: NodeId::new("w1"),
                data,
            })
        };

        state.apply(&update(json!({"name": "A"})));
        assert_eq!(
            state.tooltip("Widget", &NodeId::new("w1")),
            Some(&json!({"name": "A"}))
        );

        state.apply(&update(json!({"name": "B"})));
        assert_eq!(
            state.tooltip("Widget", &NodeId::new("w1")),
            Some(&json!({"name": "B"}))
        );
        assert!(state.tooltip("Widget", &NodeId::new("w2")).is_none());
    }
}
