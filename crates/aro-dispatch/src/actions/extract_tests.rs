// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use aro_core::repository::{RepositoryKey, RepositoryRegistry};
use aro_core::{ErrorKind, ExecutionContext, Value, ValueMap};

use super::*;
use crate::descriptor::Preposition;

fn ctx() -> ExecutionContext {
    ExecutionContext::standalone("F", "activity")
}

#[test]
fn extract_navigates_a_nested_property() {
    let ctx = ctx();
    let mut inner = ValueMap::new();
    inner.insert("id".into(), Value::string("42"));
    let mut outer = ValueMap::new();
    outer.insert("pathParameters".into(), Value::Mapping(inner));
    ctx.bind("request", Value::Mapping(outer)).unwrap();

    let result = ResultDescriptor::simple("id");
    let object = ObjectDescriptor::new(Preposition::From, "request", vec!["pathParameters".into(), "id".into()]);
    let outcome = extract(&result, &object, &ctx);
    assert!(outcome.succeeded);
    assert_eq!(outcome.value, Some(Value::string("42")));
}

#[test]
fn extract_fails_with_property_missing_when_absent() {
    let ctx = ctx();
    ctx.bind("request", Value::Mapping(ValueMap::new())).unwrap();
    let result = ResultDescriptor::simple("id");
    let object = ObjectDescriptor::new(Preposition::From, "request", vec!["missing".into()]);
    let outcome = extract(&result, &object, &ctx);
    assert!(!outcome.succeeded);
    assert_eq!(outcome.error.unwrap().0, ErrorKind::PropertyMissing);
}

#[test]
fn retrieve_from_empty_repository_is_an_empty_sequence_not_an_error() {
    let registry = Arc::new(RepositoryRegistry::new());
    let ctx = ExecutionContext::new(
        "F",
        "activity",
        Arc::new(aro_core::context::PublishedBindings::new()),
        Arc::new(aro_core::event::NullPublisher),
        None,
    )
    .with_repositories(registry);
    let result = ResultDescriptor::simple("items");
    let object = ObjectDescriptor::new(Preposition::From, "message-repository", vec![]);
    let outcome = retrieve(&result, &object, &ctx);
    assert!(outcome.succeeded);
    assert_eq!(outcome.value, Some(Value::Sequence(Vec::new())));
}

#[test]
fn retrieve_applies_a_per_item_predicate() {
    let registry = Arc::new(RepositoryRegistry::new());
    let key = RepositoryKey::new("activity", "message-repository");
    let repo = registry.get_or_create(key);
    let mut a = ValueMap::new();
    a.insert("text".into(), Value::string("keep"));
    repo.append(Value::Mapping(a));
    let mut b = ValueMap::new();
    b.insert("text".into(), Value::string("drop"));
    repo.append(Value::Mapping(b));

    let ctx = ExecutionContext::new(
        "F",
        "activity",
        Arc::new(aro_core::context::PublishedBindings::new()),
        Arc::new(aro_core::event::NullPublisher),
        None,
    )
    .with_repositories(registry);

    let predicate = serde_json::json!({
        "$binary": {"op": "==", "left": {"$var": "item", "$specs": ["text"]}, "right": {"$lit": "keep"}}
    });
    ctx.bind_force("_predicate_", Value::string(predicate.to_string()));

    let result = ResultDescriptor::simple("items");
    let object = ObjectDescriptor::new(Preposition::From, "message-repository", vec![]);
    let outcome = retrieve(&result, &object, &ctx);
    assert!(outcome.succeeded);
    let Value::Sequence(items) = outcome.value.unwrap() else { panic!("expected sequence") };
    assert_eq!(items.len(), 1);
}

#[test]
fn read_parses_json_when_hinted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(&path, br#"{"a":1}"#).unwrap();

    let ctx = ctx();
    ctx.bind("file", Value::string(path.to_string_lossy())).unwrap();
    let result = ResultDescriptor::new("data", vec!["json".into()]);
    let object = ObjectDescriptor::new(Preposition::From, "file", vec![]);
    let outcome = read(&result, &object, &ctx);
    assert!(outcome.succeeded);
    assert_eq!(outcome.value.unwrap().get_path(&["a".to_string()]).cloned(), Some(Value::Int(1)));
}

#[test]
fn parse_reads_the_date_hint() {
    let ctx = ctx();
    ctx.bind("raw", Value::string("2026-01-02T03:04:05Z")).unwrap();
    let result = ResultDescriptor::new("when", vec!["date".into()]);
    let object = ObjectDescriptor::new(Preposition::From, "raw", vec![]);
    let outcome = parse(&result, &object, &ctx);
    assert!(outcome.succeeded);
    assert!(matches!(outcome.value, Some(Value::DateTime(_))));
}
