// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use aro_core::{ExecutionContext, Value};

use super::*;
use crate::descriptor::{ObjectDescriptor, Preposition, ResultDescriptor};

#[test]
fn every_role_table_verb_is_registered() {
    let table = standard_verb_table();
    let verbs = [
        "extract", "fetch", "request", "retrieve", "read", "parse", "compute", "create", "transform", "validate",
        "compare", "set", "configure", "split", "map", "filter", "reduce", "update", "merge", "accept", "return",
        "throw", "store", "write", "publish", "log", "send", "emit", "delete", "broadcast", "list", "stat", "exists",
        "copy", "move", "append", "createdirectory", "start", "stop", "listen", "watch", "connect", "close",
        "keepalive", "call",
    ];
    for verb in verbs {
        assert!(table.role_of(verb).is_some(), "expected '{verb}' to be registered");
    }
}

#[test]
fn verb_lookup_is_case_insensitive() {
    let table = standard_verb_table();
    assert_eq!(table.role_of("Extract"), table.role_of("extract"));
    assert_eq!(table.role_of("RETURN"), table.role_of("return"));
}

#[test]
fn configure_and_set_share_an_implementation_and_roles() {
    let table = standard_verb_table();
    assert_eq!(table.role_of("set"), Some(SemanticRole::Own));
    assert_eq!(table.role_of("configure"), Some(SemanticRole::Own));

    let ctx = ExecutionContext::standalone("F", "activity");
    ctx.bind_force("_expression_", Value::Int(5));
    let result = ResultDescriptor::simple("threshold");
    let object = ObjectDescriptor::new(Preposition::With, "unused", vec![]);
    let outcome = table.dispatch("configure", &result, &object, &ctx, true);
    assert!(outcome.succeeded);
    assert_eq!(ctx.resolve("threshold"), Some(Value::Int(5)));
}

#[test]
fn response_verbs_are_registered_with_the_response_role() {
    let table = standard_verb_table();
    assert_eq!(table.role_of("return"), Some(SemanticRole::Response));
    assert_eq!(table.role_of("throw"), Some(SemanticRole::Response));
}

#[test]
fn dispatching_an_unknown_verb_is_an_internal_error() {
    let table = standard_verb_table();
    let ctx = ExecutionContext::standalone("F", "activity");
    let result = ResultDescriptor::simple("x");
    let object = ObjectDescriptor::new(Preposition::With, "unused", vec![]);
    table.dispatch("frobnicate", &result, &object, &ctx, true);
    let error = ctx.execution_error().unwrap();
    assert_eq!(error.kind, aro_core::ErrorKind::InternalError);
}
