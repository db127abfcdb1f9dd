// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn http_request_projects_implicit_bindings() {
    let mut path_parameters = ValueMap::new();
    path_parameters.insert("id".into(), Value::string("42"));
    let event = Event::HttpRequest {
        method: "GET".into(),
        path: "/users/42".into(),
        path_parameters,
        query_parameters: ValueMap::new(),
        headers: ValueMap::new(),
        body: Value::Null,
    };
    assert_eq!(event.event_type(), "HTTPRequest");
    let payload = event.to_payload();
    let params = payload.get("pathParameters").unwrap().as_mapping().unwrap();
    assert_eq!(params.get("id"), Some(&Value::string("42")));
}

#[test]
fn custom_event_with_mapping_payload_flattens_into_top_level_keys() {
    let mut inner = ValueMap::new();
    inner.insert("orderId".into(), Value::string("o-1"));
    let event = Event::Custom { event_type: "OrderCreated".into(), payload: Value::Mapping(inner) };
    assert_eq!(event.event_type(), "OrderCreated");
    let payload = event.to_payload();
    assert_eq!(payload.get("orderId"), Some(&Value::string("o-1")));
}

#[test]
fn repository_changed_carries_change_kind() {
    let event = Event::RepositoryChanged {
        business_activity: "orders".into(),
        name: "order-repository".into(),
        change: RepositoryChangeKind::Added,
    };
    let payload = event.to_payload();
    assert_eq!(payload.get("change"), Some(&Value::string("added")));
}

#[test]
fn null_publisher_accepts_and_drops() {
    let publisher = NullPublisher;
    publisher.publish(Event::WaitStateEntered);
}
