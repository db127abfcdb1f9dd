// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::value::{Value, ValueMap};

#[test]
fn bind_then_resolve_round_trips() {
    let ctx = ExecutionContext::standalone("Greet", "greeting");
    ctx.bind("name", Value::string("Ada")).unwrap();
    assert_eq!(ctx.resolve("name"), Some(Value::string("Ada")));
}

#[test]
fn rebinding_an_existing_name_is_rejected() {
    let ctx = ExecutionContext::standalone("Greet", "greeting");
    ctx.bind("name", Value::string("Ada")).unwrap();
    let err = ctx.bind("name", Value::string("Grace")).unwrap_err();
    assert_eq!(err, BindError::ImmutableRebind);
}

#[test]
fn expression_and_literal_are_always_rebindable() {
    let ctx = ExecutionContext::standalone("Greet", "greeting");
    ctx.bind("_expression_", Value::Int(1)).unwrap();
    ctx.bind("_expression_", Value::Int(2)).unwrap();
    assert_eq!(ctx.resolve("_expression_"), Some(Value::Int(2)));
}

#[test]
fn unbind_then_rebind_succeeds() {
    let ctx = ExecutionContext::standalone("Greet", "greeting");
    ctx.bind("name", Value::string("Ada")).unwrap();
    ctx.unbind("name");
    ctx.bind("name", Value::string("Grace")).unwrap();
    assert_eq!(ctx.resolve("name"), Some(Value::string("Grace")));
}

#[test]
fn bind_force_overwrites_regardless_of_rule() {
    let ctx = ExecutionContext::standalone("Greet", "greeting");
    ctx.bind("name", Value::string("Ada")).unwrap();
    ctx.bind_force("name", Value::string("Grace"));
    assert_eq!(ctx.resolve("name"), Some(Value::string("Grace")));
}

#[test]
fn child_context_reads_parent_bindings_but_writes_stay_private() {
    let parent = Arc::new(ExecutionContext::standalone("Outer", "loop"));
    parent.bind("shared", Value::Int(7)).unwrap();
    let child = parent.create_child("Outer/iteration");
    assert_eq!(child.resolve("shared"), Some(Value::Int(7)));

    child.bind("local", Value::Int(1)).unwrap();
    assert_eq!(parent.resolve("local"), None);
}

#[test]
fn resolve_falls_back_to_published_bindings() {
    let published = Arc::new(PublishedBindings::new());
    published.publish("config", Value::string("prod"));
    let ctx = ExecutionContext::new(
        "Start",
        "boot",
        Arc::clone(&published),
        Arc::new(NullPublisher),
        None,
    );
    assert_eq!(ctx.resolve("config"), Some(Value::string("prod")));
}

#[test]
fn publish_global_is_visible_to_a_sibling_context() {
    let published = Arc::new(PublishedBindings::new());
    let one = ExecutionContext::new("A", "act", Arc::clone(&published), Arc::new(NullPublisher), None);
    one.publish_global("flag", Value::Bool(true));
    let two = ExecutionContext::new("B", "act", Arc::clone(&published), Arc::new(NullPublisher), None);
    assert_eq!(two.resolve("flag"), Some(Value::Bool(true)));
}

#[test]
fn first_response_wins_and_terminates_the_activation() {
    let ctx = ExecutionContext::standalone("Handler", "orders");
    assert!(!ctx.is_terminated());
    ctx.set_response(ResponseStatus::Ok, ValueMap::new());
    let mut second = ValueMap::new();
    second.insert("ignored".into(), Value::Bool(true));
    ctx.set_response(ResponseStatus::Created, second);
    assert_eq!(ctx.get_response().unwrap().status, ResponseStatus::Ok);
    assert!(ctx.is_terminated());
}

#[test]
fn first_execution_error_wins() {
    let ctx = ExecutionContext::standalone("Handler", "orders");
    ctx.set_execution_error(ErrorKind::PropertyMissing, "Cannot extract id");
    ctx.set_execution_error(ErrorKind::ComputationError, "Cannot compute total");
    assert_eq!(ctx.execution_error().unwrap().kind, ErrorKind::PropertyMissing);
    assert!(ctx.is_terminated());
}

#[test]
fn wait_state_starts_false_and_latches_true() {
    let ctx = ExecutionContext::standalone("Server", "sockets");
    assert!(!ctx.is_waiting());
    ctx.enter_wait_state();
    assert!(ctx.is_waiting());
}
