//! The normalized entity store.
//!
//! Per model, entities are cached as an insertion-ordered id list plus an
//! id-to-node map. Index refreshes replace the visible listing while
//! deep-merging node data; detail updates replace a single node. A model's
//! store can be displaced wholesale by the not-found sentinel when the
//! backend reports the model/id combination as nonexistent — readers must
//! check for the sentinel before touching fields.

use std::collections::HashMap;

use serde_json::Value as Json;

use crate::action::Action;
use crate::schema::Schema;
use crate::value::{deep_merge, NodeId};

/// Fixed page size for to-many relation slicing.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// A single model's cache: tracked entities, or the not-found sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelStore {
    /// The structured store.
    Tracked {
        /// Entity ids in display order. No duplicates; exactly the keys of
        /// `values`.
        order: Vec<NodeId>,
        /// Entity nodes by id. A `Json::Null` value is a tombstone for a
        /// deleted-but-still-referenced entity.
        values: HashMap<NodeId, Json>,
    },
    /// The backend reported this model/id combination as nonexistent.
    NotFound,
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::Tracked {
            order: Vec::new(),
            values: HashMap::new(),
        }
    }
}

impl ModelStore {
    /// Returns true if this store holds the not-found sentinel.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// The display order, empty for the sentinel.
    #[must_use]
    pub fn order(&self) -> &[NodeId] {
        match self {
            Self::Tracked { order, .. } => order,
            Self::NotFound => &[],
        }
    }

    /// Looks up a node by id. `None` for the sentinel or unknown ids;
    /// tombstoned nodes come back as `Some(&Json::Null)`.
    #[must_use]
    pub fn get(&self, id: &NodeId) -> Option<&Json> {
        match self {
            Self::Tracked { values, .. } => values.get(id),
            Self::NotFound => None,
        }
    }

    /// The cached nodes in display order.
    #[must_use]
    pub fn ordered_values(&self) -> Vec<&Json> {
        match self {
            Self::Tracked { order, values } => {
                order.iter().filter_map(|id| values.get(id)).collect()
            }
            Self::NotFound => Vec::new(),
        }
    }
}

/// All model stores, keyed by model name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelState {
    models: HashMap<String, ModelStore>,
}

impl ModelState {
    /// The store for a model, if any action has touched it.
    #[must_use]
    pub fn store(&self, model_name: &str) -> Option<&ModelStore> {
        self.models.get(model_name)
    }

    /// Convenience: the ordered nodes of a model's listing.
    #[must_use]
    pub fn ordered_values(&self, model_name: &str) -> Vec<&Json> {
        self.models
            .get(model_name)
            .map(ModelStore::ordered_values)
            .unwrap_or_default()
    }

    /// Applies a model-store action; everything else is ignored.
    pub fn apply(&mut self, action: &Action) {
        match action {
            Action::UpdateModelIndex(payload) => {
                self.update_index(&payload.model_name, &payload.data);
            }
            Action::UpdateModelDetail(payload) => {
                self.update_detail(&payload.model_name, payload.id.clone(), payload.data.clone());
            }
            Action::DeleteModel(payload) => {
                self.delete(&payload.model_name, &payload.id);
            }
            Action::RemoveInstance(payload) => {
                self.remove_instance(&payload.model_name, &payload.id);
            }
            Action::ModelNotFound(payload) => {
                self.mark_not_found(&payload.model_name);
            }
            _ => {}
        }
    }

    /// Replaces a model's listing with `data`, deep-merging each incoming
    /// node onto any previously cached node with the same id. Ids absent
    /// from `data` drop out of the store.
    pub fn update_index(&mut self, model_name: &str, data: &[Json]) {
        let old_store = self.models.remove(model_name).unwrap_or_default();

        let mut order = Vec::with_capacity(data.len());
        let mut values = HashMap::with_capacity(data.len());
        for node in data {
            let Some(id) = NodeId::of_node(node) else {
                tracing::warn!(model = model_name, "index node without id dropped");
                continue;
            };
            if values.contains_key(&id) {
                // Duplicate ids in a response collapse to the first
                // occurrence so `order` stays duplicate-free.
                continue;
            }
            let merged = match old_store.get(&id) {
                Some(old_node) => deep_merge(old_node, node),
                None => node.clone(),
            };
            order.push(id.clone());
            values.insert(id, merged);
        }

        self.models
            .insert(model_name.to_string(), ModelStore::Tracked { order, values });
    }

    /// Merge-free replace of one entity; appends to `order` when the id is
    /// new. A successful detail fetch supersedes the not-found sentinel.
    pub fn update_detail(&mut self, model_name: &str, id: NodeId, data: Json) {
        let store = self
            .models
            .entry(model_name.to_string())
            .or_default();
        if store.is_not_found() {
            *store = ModelStore::default();
        }
        if let ModelStore::Tracked { order, values } = store {
            if !values.contains_key(&id) {
                order.push(id.clone());
            }
            values.insert(id, data);
        }
    }

    /// Removes an entity from both `order` and `values`.
    pub fn delete(&mut self, model_name: &str, id: &NodeId) {
        if let Some(ModelStore::Tracked { order, values }) = self.models.get_mut(model_name) {
            values.remove(id);
            order.retain(|existing| existing != id);
        }
    }

    /// Tombstones a tracked entity in place, preserving list positions.
    /// A no-op for untracked ids and the sentinel.
    pub fn remove_instance(&mut self, model_name: &str, id: &NodeId) {
        if let Some(ModelStore::Tracked { values, .. }) = self.models.get_mut(model_name) {
            if let Some(slot) = values.get_mut(id) {
                *slot = Json::Null;
            }
        }
    }

    /// Replaces a model's entire store with the not-found sentinel.
    pub fn mark_not_found(&mut self, model_name: &str) {
        self.models
            .insert(model_name.to_string(), ModelStore::NotFound);
    }
}

/// UI pagination cursors: `(model, field) → current page`, consumed
/// read-only when slicing to-many relation values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCursors {
    pages: HashMap<String, HashMap<String, usize>>,
}

impl PageCursors {
    /// Creates an empty cursor set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current page for a field.
    pub fn set_page(&mut self, model_name: &str, field_name: &str, page: usize) {
        self.pages
            .entry(model_name.to_string())
            .or_default()
            .insert(field_name.to_string(), page.max(1));
    }

    /// The current page for a field; absent cursors default to page 1.
    #[must_use]
    pub fn page(&self, model_name: &str, field_name: &str) -> usize {
        self.pages
            .get(model_name)
            .and_then(|fields| fields.get(field_name))
            .copied()
            .unwrap_or(1)
    }
}

/// Slices a full value list into the fixed-size window for `page`.
///
/// Page `n` covers items `[(n-1)*size, n*size)`, clamped to the list.
#[must_use]
pub fn slice_page(list: &[Json], page: usize, page_size: usize) -> &[Json] {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size);
    if start >= list.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(list.len());
    &list[start..end]
}

/// Read-time view of a cached entity with every to-many relation field
/// sliced to its current page.
///
/// Returns `None` when the model store holds the not-found sentinel or the
/// id is untracked/tombstoned.
#[must_use]
pub fn paginated_node(
    schema: &dyn Schema,
    state: &ModelState,
    cursors: &PageCursors,
    model_name: &str,
    id: &NodeId,
) -> Option<Json> {
    let store = state.store(model_name)?;
    let node = store.get(id)?;
    let fields = node.as_object()?;

    let mut out = serde_json::Map::with_capacity(fields.len());
    for (field_name, raw) in fields {
        let is_to_many = schema
            .field(model_name, field_name)
            .is_some_and(|descriptor| descriptor.kind.is_to_many());

        match raw.as_array() {
            Some(items) if is_to_many && !items.is_empty() => {
                let page = cursors.page(model_name, field_name);
                let window = slice_page(items, page, DEFAULT_PAGE_SIZE);
                out.insert(field_name.clone(), Json::Array(window.to_vec()));
            }
            _ => {
                out.insert(field_name.clone(), raw.clone());
            }
        }
    }
    Some(Json::Object(out))
}
