use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver};
use serde_json::{json, Value as Json};

use syncstore::{
    Action, AlertKind, FieldKind, FieldScope, ModelDescriptor, NodeId, QueryClient, QuerySpec,
    QueryType, RequestDescriptor, RequestError, RuntimeConfig, StaticSchema, SyncResult,
    SyncRuntime,
};

/// Client that answers by query type and records specs.
struct ByTypeClient {
    responses: Vec<(QueryType, Result<Json, RequestError>)>,
    specs: Mutex<Vec<QuerySpec>>,
}

impl ByTypeClient {
    fn new(responses: Vec<(QueryType, Result<Json, RequestError>)>) -> Self {
        Self {
            responses,
            specs: Mutex::new(Vec::new()),
        }
    }
}

impl QueryClient for ByTypeClient {
    fn build_query(&self, spec: &QuerySpec) -> SyncResult<RequestDescriptor> {
        Ok(RequestDescriptor {
            spec: spec.clone(),
            document: String::new(),
        })
    }

    fn send_request(
        &self,
        request: &RequestDescriptor,
        _variables: Json,
    ) -> Result<Json, RequestError> {
        self.specs.lock().unwrap().push(request.spec.clone());
        self.responses
            .iter()
            .find(|(query_type, _)| *query_type == request.spec.query_type)
            .map_or(
                Err(RequestError::Request {
                    message: "no canned response".to_string(),
                }),
                |(_, response)| response.clone(),
            )
    }
}

/// Client whose calls block until the test releases each response, in call
/// order.
struct GatedClient {
    gates: Mutex<VecDeque<Receiver<Json>>>,
}

impl QueryClient for GatedClient {
    fn build_query(&self, spec: &QuerySpec) -> SyncResult<RequestDescriptor> {
        Ok(RequestDescriptor {
            spec: spec.clone(),
            document: String::new(),
        })
    }

    fn send_request(
        &self,
        _request: &RequestDescriptor,
        _variables: Json,
    ) -> Result<Json, RequestError> {
        let gate = self
            .gates
            .lock()
            .unwrap()
            .pop_front()
            .expect("one gate per request");
        gate.recv().map_err(|_| RequestError::Request {
            message: "gate closed".to_string(),
        })
    }
}

fn schema() -> Arc<StaticSchema> {
    Arc::new(
        StaticSchema::new()
            .with_model(
                ModelDescriptor::new("Widget")
                    .field(
                        "owner",
                        FieldKind::ToOne {
                            target: "User".to_string(),
                        },
                    )
                    .field(
                        "color",
                        FieldKind::Scalar {
                            scalar: syncstore::ScalarKind::String,
                        },
                    ),
            )
            .with_model(ModelDescriptor::new("User").display_field("username")),
    )
}

#[test]
fn relation_menu_open_fills_options_and_entity_cache() {
    let users = json!([
        {"id": "u1", "username": "alice"},
        {"id": "u2", "username": "bob"},
    ]);
    let client = Arc::new(ByTypeClient::new(vec![(QueryType::Select, Ok(users))]));
    let runtime = SyncRuntime::start(schema(), client.clone(), RuntimeConfig::default());

    runtime
        .dispatch(Action::RelationshipSelectMenuOpen(FieldScope {
            model_name: "Widget".to_string(),
            field_name: "owner".to_string(),
        }))
        .unwrap();

    let state = runtime.settle(Duration::from_secs(1)).unwrap();

    // Options carry the target model's display values.
    let options = state.options.options("Widget", "owner");
    let labels: Vec<_> = options.iter().map(|choice| choice.label.as_str()).collect();
    let values: Vec<_> = options.iter().map(|choice| choice.value.as_str()).collect();
    assert_eq!(labels, vec!["alice", "bob"]);
    assert_eq!(values, vec!["u1", "u2"]);

    // The same payload lands in the normalized cache under the target model.
    let store = state.models.store("User").expect("User store populated");
    assert_eq!(store.order(), &[NodeId::new("u1"), NodeId::new("u2")]);
    assert!(state.models.store("Widget").is_none());

    // The request was built against the relation's target.
    let specs = client.specs.lock().unwrap();
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].model_name, "User");
}

#[test]
fn reopened_menu_replaces_options_instead_of_appending() {
    let users = json!([{"id": "u1", "username": "alice"}]);
    let client = Arc::new(ByTypeClient::new(vec![(QueryType::Select, Ok(users))]));
    let runtime = SyncRuntime::start(schema(), client, RuntimeConfig::default());

    let open = Action::RelationshipSelectMenuOpen(FieldScope {
        model_name: "Widget".to_string(),
        field_name: "owner".to_string(),
    });
    runtime.dispatch(open.clone()).unwrap();
    runtime.settle(Duration::from_secs(1)).unwrap();
    runtime.dispatch(open).unwrap();

    let state = runtime.settle(Duration::from_secs(1)).unwrap();
    assert_eq!(state.options.options("Widget", "owner").len(), 1);
}

#[test]
fn overlapping_menu_loads_apply_in_completion_order() {
    let (first_release, first_gate) = bounded::<Json>(1);
    let (second_release, second_gate) = bounded::<Json>(1);
    let client = Arc::new(GatedClient {
        gates: Mutex::new(VecDeque::from([first_gate, second_gate])),
    });
    let runtime = SyncRuntime::start(
        schema(),
        client,
        RuntimeConfig {
            queue_capacity: 64,
            request_workers: 2,
        },
    );

    // Two loads for the same field, both in flight at once.
    let open = Action::RelationshipSelectMenuOpen(FieldScope {
        model_name: "Widget".to_string(),
        field_name: "owner".to_string(),
    });
    runtime.dispatch(open.clone()).unwrap();
    runtime.dispatch(open).unwrap();

    // Release one response and wait for it to apply.
    second_release
        .send(json!([{"id": "u9", "username": "zed"}]))
        .unwrap();
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let state = runtime.snapshot().unwrap();
        let applied = state
            .options
            .options("Widget", "owner")
            .iter()
            .any(|choice| choice.value == "u9");
        if applied {
            break;
        }
        assert!(Instant::now() < deadline, "released response never applied");
        thread::sleep(Duration::from_millis(1));
    }

    // The other response completes last, so it wins. No coalescing: both
    // requests ran to completion and each rewrote the option list.
    first_release
        .send(json!([{"id": "u1", "username": "alice"}]))
        .unwrap();
    let state = runtime.settle(Duration::from_secs(2)).unwrap();

    let options = state.options.options("Widget", "owner");
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].value, "u1");
    assert_eq!(
        state.models.store("User").expect("User store").order(),
        &[NodeId::new("u1")]
    );
}

#[test]
fn string_select_menu_open_fills_self_labeled_options() {
    let values = json!(["red", "blue", null, "green"]);
    let client = Arc::new(ByTypeClient::new(vec![(
        QueryType::SelectExistingFields,
        Ok(values),
    )]));
    let runtime = SyncRuntime::start(schema(), client, RuntimeConfig::default());

    runtime
        .dispatch(Action::QuerySelectMenuOpen(FieldScope {
            model_name: "Widget".to_string(),
            field_name: "color".to_string(),
        }))
        .unwrap();

    let state = runtime.settle(Duration::from_secs(1)).unwrap();
    let options = state.options.options("Widget", "color");
    let labels: Vec<_> = options.iter().map(|choice| choice.label.as_str()).collect();
    // Nulls are dropped; each surviving value labels itself.
    assert_eq!(labels, vec!["red", "blue", "green"]);
    assert!(options.iter().all(|choice| choice.label == choice.value));
}

#[test]
fn option_load_failure_raises_a_danger_alert() {
    let client = Arc::new(ByTypeClient::new(vec![(
        QueryType::Select,
        Err(RequestError::Request {
            message: "boom".to_string(),
        }),
    )]));
    let runtime = SyncRuntime::start(schema(), client, RuntimeConfig::default());

    runtime
        .dispatch(Action::RelationshipSelectMenuOpen(FieldScope {
            model_name: "Widget".to_string(),
            field_name: "owner".to_string(),
        }))
        .unwrap();

    let state = runtime.settle(Duration::from_secs(1)).unwrap();
    assert!(state.options.options("Widget", "owner").is_empty());
    let alerts = state.alerts.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::Danger);
    assert_eq!(alerts[0].message, "Error loading form option.");
}

#[test]
fn menu_open_on_a_non_relation_field_fails_at_build_time() {
    let client = Arc::new(ByTypeClient::new(Vec::new()));
    let runtime = SyncRuntime::start(schema(), client.clone(), RuntimeConfig::default());

    runtime
        .dispatch(Action::RelationshipSelectMenuOpen(FieldScope {
            model_name: "Widget".to_string(),
            field_name: "color".to_string(),
        }))
        .unwrap();

    let state = runtime.settle(Duration::from_secs(1)).unwrap();
    // No request was ever sent; the failure surfaced as an alert.
    assert!(client.specs.lock().unwrap().is_empty());
    assert_eq!(state.alerts.alerts().len(), 1);
    assert_eq!(state.alerts.alerts()[0].kind, AlertKind::Danger);
}
