//! Search index state: quick-search dropdown, search page, per-model filters.
//!
//! Raw matches are projected into display entries using the Schema
//! Capability. Page filters are re-derived from each result set, but a
//! filter's `checked` flag persists across refreshes for models still
//! present; counts do not persist.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::action::Action;
use crate::schema::Schema;

/// A projected search match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    /// The matched entity's id.
    pub id: String,
    /// The matched entity's model.
    pub model_name: String,
    /// Display label for the model.
    pub model_label: String,
    /// Display string for the entity.
    pub name: String,
    /// Route to the entity's detail page.
    pub detail_url: String,
}

/// A per-model visibility toggle on the search page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// The model this filter covers.
    pub model_name: String,
    /// Pluralized display label.
    pub display_label: String,
    /// Whether results for this model are shown.
    pub checked: bool,
    /// Match count in the current result set.
    pub count: usize,
}

/// The whole search slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    /// The current search box text.
    pub query_text: String,
    /// Quick-search (dropdown) results.
    pub quick_search_entries: Vec<SearchEntry>,
    /// Search-page results.
    pub search_page_entries: Vec<SearchEntry>,
    /// Per-model filters derived from the page results.
    pub search_page_filters: Vec<SearchFilter>,
    /// Whether the quick-search dropdown is open.
    pub dropdown_open: bool,
}

fn project_entries(schema: &dyn Schema, data: &[Json]) -> Vec<SearchEntry> {
    data.iter()
        .filter_map(|entry| {
            let model_name = entry.get("__typename")?.as_str()?.to_string();
            let id = crate::value::NodeId::of_node(entry)?;
            Some(SearchEntry {
                detail_url: format!("/{model_name}/{id}"),
                model_label: schema.model_label(&model_name),
                name: schema.display_value(&model_name, entry),
                id: id.as_str().to_string(),
                model_name,
            })
        })
        .collect()
}

impl SearchState {
    /// Applies a search action; everything else is ignored.
    pub fn apply(&mut self, schema: &dyn Schema, action: &Action) {
        match action {
            Action::UpdateQuickSearchEntries(payload) => {
                self.quick_search_entries = project_entries(schema, &payload.data);
            }
            Action::UpdateSearchPageEntries(payload) => {
                if payload.data.is_empty() {
                    self.search_page_entries.clear();
                    self.search_page_filters.clear();
                    return;
                }
                let entries = project_entries(schema, &payload.data);
                self.search_page_filters = self.derive_filters(schema, &entries);
                self.search_page_entries = entries;
            }
            Action::SearchQueryTextChanged(payload) => {
                if payload.query_text.is_empty() {
                    // Clearing the box resets everything except the page
                    // results, which stay on screen until replaced.
                    let kept = std::mem::take(&mut self.search_page_entries);
                    *self = Self {
                        search_page_entries: kept,
                        ..Self::default()
                    };
                } else {
                    self.query_text = payload.query_text.clone();
                }
            }
            Action::SearchFilterToggled(payload) => {
                for filter in &mut self.search_page_filters {
                    if filter.model_name == payload.model_name {
                        filter.checked = !filter.checked;
                    }
                }
            }
            Action::SearchLinkClicked => {
                *self = Self::default();
            }
            Action::SearchBlur => {
                self.dropdown_open = false;
            }
            Action::TriggerSearch => {
                self.dropdown_open = true;
            }
            _ => {}
        }
    }

    /// One filter per distinct model in `entries`, first-seen order.
    /// `checked` carries over from the previous filters where present.
    fn derive_filters(&self, schema: &dyn Schema, entries: &[SearchEntry]) -> Vec<SearchFilter> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for entry in entries {
            let count = counts.entry(entry.model_name.as_str()).or_insert(0);
            if *count == 0 {
                order.push(entry.model_name.as_str());
            }
            *count += 1;
        }

        order
            .into_iter()
            .map(|model_name| {
                let prior_checked = self
                    .search_page_filters
                    .iter()
                    .find(|f| f.model_name == model_name)
                    .map_or(true, |f| f.checked);
                SearchFilter {
                    model_name: model_name.to_string(),
                    display_label: schema.model_label_plural(model_name),
                    checked: prior_checked,
                    count: counts[model_name],
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ModelScope, QueryTextPayload, SearchDataPayload};
    use crate::schema::{ModelDescriptor, StaticSchema};
    use serde_json::json;

    fn schema() -> StaticSchema {
        StaticSchema::new()
            .with_model(ModelDescriptor::new("User").label_plural("Users"))
            .with_model(ModelDescriptor::new("Widget").label_plural("Widgets"))
    }

    fn matches() -> Vec<Json> {
        vec![
            json!({"__typename": "User", "id": "u1", "name": "Alice"}),
            json!({"__typename": "Widget", "id": "w1", "name": "Widget A"}),
            json!({"__typename": "User", "id": "u2", "name": "Bob"}),
        ]
    }

    fn page_update(data: Vec<Json>) -> Action {
        Action::UpdateSearchPageEntries(SearchDataPayload { data })
    }

    #[test]
    fn quick_entries_are_projected() {
        let schema = schema();
        let mut state = SearchState::default();
        state.apply(
            &schema,
            &Action::UpdateQuickSearchEntries(SearchDataPayload { data: matches() }),
        );

        assert_eq!(state.quick_search_entries.len(), 3);
        let first = &state.quick_search_entries[0];
        assert_eq!(first.model_name, "User");
        assert_eq!(first.name, "Alice");
        assert_eq!(first.detail_url, "/User/u1");

        // An empty result clears the list.
        state.apply(
            &schema,
            &Action::UpdateQuickSearchEntries(SearchDataPayload { data: vec![] }),
        );
        assert!(state.quick_search_entries.is_empty());
    }

    #[test]
    fn entries_without_typename_or_id_are_skipped() {
        let schema = schema();
        let mut state = SearchState::default();
        state.apply(
            &schema,
            &Action::UpdateQuickSearchEntries(SearchDataPayload {
                data: vec![json!({"id": "x"}), json!({"__typename": "User"})],
            }),
        );
        assert!(state.quick_search_entries.is_empty());
    }

    #[test]
    fn page_filters_count_by_model_in_first_seen_order() {
        let schema = schema();
        let mut state = SearchState::default();
        state.apply(&schema, &page_update(matches()));

        assert_eq!(state.search_page_entries.len(), 3);
        assert_eq!(state.search_page_filters.len(), 2);

        let users = &state.search_page_filters[0];
        assert_eq!(users.model_name, "User");
        assert_eq!(users.display_label, "Users");
        assert_eq!(users.count, 2);
        assert!(users.checked);

        assert_eq!(state.search_page_filters[1].count, 1);
    }

    #[test]
    fn filter_checked_persists_across_refreshes() {
        let schema = schema();
        let mut state = SearchState::default();
        state.apply(&schema, &page_update(matches()));

        state.apply(
            &schema,
            &Action::SearchFilterToggled(ModelScope {
                model_name: "User".to_string(),
            }),
        );
        assert!(!state.search_page_filters[0].checked);
        // Other filters untouched.
        assert!(state.search_page_filters[1].checked);

        // New results still containing User: toggle survives, count is fresh.
        state.apply(
            &schema,
            &page_update(vec![json!({"__typename": "User", "id": "u9", "name": "Zed"})]),
        );
        assert_eq!(state.search_page_filters.len(), 1);
        assert_eq!(state.search_page_filters[0].count, 1);
        assert!(!state.search_page_filters[0].checked);

        // A model absent from the response has no filter entry at all.
        assert!(!state
            .search_page_filters
            .iter()
            .any(|f| f.model_name == "Widget"));
    }

    #[test]
    fn clearing_query_text_keeps_page_entries_only() {
        let schema = schema();
        let mut state = SearchState::default();
        state.apply(
            &schema,
            &Action::SearchQueryTextChanged(QueryTextPayload {
                query_text: "wid".to_string(),
            }),
        );
        state.apply(
            &schema,
            &Action::UpdateQuickSearchEntries(SearchDataPayload { data: matches() }),
        );
        state.apply(&schema, &page_update(matches()));
        state.apply(&schema, &Action::TriggerSearch);

        state.apply(
            &schema,
            &Action::SearchQueryTextChanged(QueryTextPayload {
                query_text: String::new(),
            }),
        );

        assert_eq!(state.query_text, "");
        assert!(state.quick_search_entries.is_empty());
        assert!(state.search_page_filters.is_empty());
        assert!(!state.dropdown_open);
        // The deliberate asymmetry: page results survive the reset.
        assert_eq!(state.search_page_entries.len(), 3);
    }

    #[test]
    fn link_click_resets_everything() {
        let schema = schema();
        let mut state = SearchState::default();
        state.apply(&schema, &page_update(matches()));
        state.apply(&schema, &Action::SearchLinkClicked);
        assert_eq!(state, SearchState::default());
    }

    #[test]
    fn blur_and_focus_toggle_dropdown_only() {
        let schema = schema();
        let mut state = SearchState::default();
        state.apply(&schema, &page_update(matches()));
        let entries_before = state.search_page_entries.clone();

        state.apply(&schema, &Action::TriggerSearch);
        assert!(state.dropdown_open);
        state.apply(&schema, &Action::SearchBlur);
        assert!(!state.dropdown_open);
        assert_eq!(state.search_page_entries, entries_before);
    }
}
