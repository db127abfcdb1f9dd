// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use aro_core::{ExecutionContext, Value};

use super::*;
use crate::descriptor::Preposition;

fn ctx() -> ExecutionContext {
    ExecutionContext::standalone("F", "activity")
}

fn bind_body(ctx: &ExecutionContext, node: serde_json::Value) {
    ctx.bind_force("_body_", Value::string(node.to_string()));
}

#[test]
fn map_evaluates_the_body_once_per_item() {
    let ctx = ctx();
    ctx.bind("numbers", Value::Sequence(vec![Value::Int(1), Value::Int(2), Value::Int(3)])).unwrap();
    bind_body(&ctx, serde_json::json!({"$binary": {"op": "*", "left": {"$var": "item"}, "right": {"$lit": 10}}}));

    let result = ResultDescriptor::simple("scaled");
    let object = ObjectDescriptor::new(Preposition::From, "numbers", vec![]);
    let outcome = map(&result, &object, &ctx);
    assert!(outcome.succeeded);
    assert_eq!(outcome.value, Some(Value::Sequence(vec![Value::Int(10), Value::Int(20), Value::Int(30)])));
}

#[test]
fn filter_keeps_only_items_for_which_the_body_is_truthy() {
    let ctx = ctx();
    ctx.bind("numbers", Value::Sequence(vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)])).unwrap();
    bind_body(&ctx, serde_json::json!({"$binary": {"op": ">", "left": {"$var": "item"}, "right": {"$lit": 2}}}));

    let result = ResultDescriptor::simple("big");
    let object = ObjectDescriptor::new(Preposition::From, "numbers", vec![]);
    let outcome = filter(&result, &object, &ctx);
    assert!(outcome.succeeded);
    assert_eq!(outcome.value, Some(Value::Sequence(vec![Value::Int(3), Value::Int(4)])));
}

#[test]
fn reduce_folds_the_body_with_a_seeded_accumulator() {
    let ctx = ctx();
    ctx.bind("numbers", Value::Sequence(vec![Value::Int(1), Value::Int(2), Value::Int(3)])).unwrap();
    ctx.bind("seed", Value::Int(100)).unwrap();
    bind_body(&ctx, serde_json::json!({"$binary": {"op": "+", "left": {"$var": "accumulator"}, "right": {"$var": "item"}}}));

    let result = ResultDescriptor::simple("total");
    let object = ObjectDescriptor::new(Preposition::From, "numbers", vec!["seed".into()]);
    let outcome = reduce(&result, &object, &ctx);
    assert!(outcome.succeeded);
    assert_eq!(outcome.value, Some(Value::Int(106)));
}

#[test]
fn reduce_defaults_the_seed_to_null_when_no_specifier_is_given() {
    let ctx = ctx();
    ctx.bind("items", Value::Sequence(Vec::new())).unwrap();
    bind_body(&ctx, serde_json::json!({"$lit": 0}));
    let result = ResultDescriptor::simple("total");
    let object = ObjectDescriptor::new(Preposition::From, "items", vec![]);
    let outcome = reduce(&result, &object, &ctx);
    assert!(outcome.succeeded);
    assert_eq!(outcome.value, Some(Value::Null));
}

#[test]
fn map_fails_when_the_source_is_not_a_sequence() {
    let ctx = ctx();
    ctx.bind("notASequence", Value::Int(1)).unwrap();
    bind_body(&ctx, serde_json::json!({"$var": "item"}));
    let result = ResultDescriptor::simple("out");
    let object = ObjectDescriptor::new(Preposition::From, "notASequence", vec![]);
    let outcome = map(&result, &object, &ctx);
    assert!(!outcome.succeeded);
}
