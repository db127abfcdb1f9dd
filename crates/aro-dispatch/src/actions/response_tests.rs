// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use aro_core::{ExecutionContext, ResponseStatus, Value, ValueMap};

use super::*;
use crate::descriptor::Preposition;

fn ctx() -> ExecutionContext {
    ExecutionContext::standalone("F", "activity")
}

#[test]
fn return_installs_a_response_with_the_named_status() {
    let ctx = ctx();
    let mut data = ValueMap::new();
    data.insert("id".into(), Value::string("42"));
    ctx.bind_force("_expression_", Value::Mapping(data));

    let result = ResultDescriptor::simple("created");
    let object = ObjectDescriptor::new(Preposition::With, "unused", vec![]);
    let outcome = return_(&result, &object, &ctx);
    assert!(outcome.succeeded);

    let response = ctx.get_response().unwrap();
    assert_eq!(response.status, ResponseStatus::Created);
    assert_eq!(response.data.get("id"), Some(&Value::string("42")));
}

#[test]
fn return_defaults_to_ok_for_an_unrecognized_status_name() {
    let ctx = ctx();
    let result = ResultDescriptor::simple("whatever");
    let object = ObjectDescriptor::new(Preposition::With, "unused", vec![]);
    let outcome = return_(&result, &object, &ctx);
    assert!(outcome.succeeded);
    assert_eq!(ctx.get_response().unwrap().status, ResponseStatus::Ok);
}

#[test]
fn return_only_installs_the_first_response_in_an_activation() {
    let ctx = ctx();
    let first = ResultDescriptor::simple("ok");
    let second = ResultDescriptor::simple("notfound");
    let object = ObjectDescriptor::new(Preposition::With, "unused", vec![]);
    return_(&first, &object, &ctx);
    return_(&second, &object, &ctx);
    assert_eq!(ctx.get_response().unwrap().status, ResponseStatus::Ok);
}

#[test]
fn throw_installs_a_thrown_error_with_the_named_type() {
    let ctx = ctx();
    ctx.bind_force("_expression_", Value::string("widget 7 does not exist"));
    let result = ResultDescriptor::simple("NotFoundError");
    let object = ObjectDescriptor::new(Preposition::With, "unused", vec![]);
    let outcome = throw(&result, &object, &ctx);
    assert!(outcome.succeeded);

    let error = ctx.execution_error().unwrap();
    assert_eq!(error.kind, aro_core::ErrorKind::ThrownError);
    assert_eq!(error.thrown_type.as_deref(), Some("NotFoundError"));
    assert_eq!(error.message, "widget 7 does not exist");
    assert_eq!(error.http_status(), 404);
}

#[test]
fn throw_does_not_set_a_response() {
    let ctx = ctx();
    let result = ResultDescriptor::simple("ValidationError");
    let object = ObjectDescriptor::new(Preposition::With, "unused", vec![]);
    throw(&result, &object, &ctx);
    assert!(!ctx.has_response());
    assert!(ctx.has_execution_error());
}
