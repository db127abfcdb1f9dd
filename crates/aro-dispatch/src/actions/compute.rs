// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compute, Create, Transform, Validate, Compare, Set/Configure (§4.3).

use aro_core::{ErrorKind, ExecutionContext, Value, ValueMap};

use crate::descriptor::{ObjectDescriptor, ResultDescriptor};
use crate::registry::ActionOutcome;

use super::support::{expression, fail, literal, navigate};

/// `Compute <result: specifier> from|with <object>` — dispatches by the
/// *specifier*, not the base (§4.3). Falls back to arithmetic evaluation of
/// `_expression_` when no built-in specifier matches.
pub fn compute(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let Some(specifier) = result.primary_specifier() else {
        return match expression(ctx) {
            Some(v) => ActionOutcome::ok(v),
            None => fail("Compute", result, object, ErrorKind::ComputationError, "no specifier and no expression to evaluate"),
        };
    };

    let source = navigate(object, ctx).ok().or_else(|| expression(ctx));
    match specifier.to_ascii_lowercase().as_str() {
        "length" | "count" => match &source {
            Some(Value::String(s)) => ActionOutcome::ok(Value::Int(s.chars().count() as i64)),
            Some(Value::Sequence(s)) => ActionOutcome::ok(Value::Int(s.len() as i64)),
            Some(Value::Mapping(m)) => ActionOutcome::ok(Value::Int(m.len() as i64)),
            _ => fail("Compute", result, object, ErrorKind::ComputationError, "length/count needs a string, sequence, or mapping"),
        },
        "uppercase" => match source.as_ref().and_then(Value::as_str) {
            Some(s) => ActionOutcome::ok(Value::string(s.to_uppercase())),
            None => fail("Compute", result, object, ErrorKind::ComputationError, "uppercase needs a string"),
        },
        "lowercase" => match source.as_ref().and_then(Value::as_str) {
            Some(s) => ActionOutcome::ok(Value::string(s.to_lowercase())),
            None => fail("Compute", result, object, ErrorKind::ComputationError, "lowercase needs a string"),
        },
        "hash" => match source.as_ref().and_then(Value::as_str) {
            Some(s) => {
                use sha1::{Digest, Sha1};
                let digest = Sha1::digest(s.as_bytes());
                ActionOutcome::ok(Value::string(format!("{digest:x}")))
            }
            None => fail("Compute", result, object, ErrorKind::ComputationError, "hash needs a string"),
        },
        "identity" => match source {
            Some(v) => ActionOutcome::ok(v),
            None => fail("Compute", result, object, ErrorKind::ComputationError, "identity needs a source value"),
        },
        _ => match expression(ctx) {
            Some(v) => ActionOutcome::ok(v),
            None => fail("Compute", result, object, ErrorKind::ComputationError, format!("unknown computation '{specifier}'")),
        },
    }
}

/// `Create <result> with <object literal>` — binds `_expression_` (an object
/// literal or resolved reference) to the result name; when the object
/// descriptor's preposition is `with` and the caller pre-evaluated a literal
/// directly (`_literal_`), that takes precedence (§4.3).
pub fn create(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    if let Some(v) = literal(ctx).or_else(|| expression(ctx)) {
        return ActionOutcome::ok(v);
    }
    match navigate(object, ctx) {
        Ok(v) => ActionOutcome::ok(v),
        Err(detail) => fail("Create", result, object, ErrorKind::ComputationError, detail),
    }
}

/// `Transform <result> from <source>[ with <patch>]` — deep-merges `with`
/// over `from`; the original source is not mutated (§4.3).
pub fn transform(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let source = match navigate(object, ctx) {
        Ok(v) => v,
        Err(detail) => return fail("Transform", result, object, ErrorKind::ComputationError, detail),
    };
    match expression(ctx) {
        Some(patch) => ActionOutcome::ok(source.deep_merge(&patch)),
        None => ActionOutcome::ok(source),
    }
}

/// `Validate <result> against <schema>` — sets a sibling `validation`
/// binding, never the error slot (§4.3, §7).
pub fn validate(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let value = match navigate(object, ctx) {
        Ok(v) => v,
        Err(_) => expression(ctx).unwrap_or(Value::Null),
    };
    let schema_name = &result.base;
    let outcome = match ctx.schema_registry() {
        Some(registry) => registry.validate(schema_name, &value),
        None => aro_core::schema::ValidationOutcome::success(),
    };

    let mut report = ValueMap::new();
    report.insert("success".into(), Value::Bool(outcome.success));
    report.insert("errors".into(), Value::Sequence(outcome.errors.into_iter().map(Value::string).collect()));
    ctx.bind_force("validation", Value::Mapping(report));
    ActionOutcome::ok(value)
}

/// `Compare <result> with <object>` — `{equal, lessThan, greaterThan}`;
/// ISO-8601 strings compare chronologically when both sides parse (§4.3).
pub fn compare(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let left = match navigate(object, ctx) {
        Ok(v) => v,
        Err(detail) => return fail("Compare", result, object, ErrorKind::ComputationError, detail),
    };
    let Some(right) = expression(ctx) else {
        return fail("Compare", result, object, ErrorKind::ComputationError, "compare needs a right-hand expression");
    };

    let (left, right) = match (as_datetime(&left), as_datetime(&right)) {
        (Some(a), Some(b)) => (Value::DateTime(a), Value::DateTime(b)),
        _ => (left, right),
    };

    let equal = eval_bool(aro_expr::BinaryOp::Eq, &left, &right);
    let less = eval_bool(aro_expr::BinaryOp::Lt, &left, &right);
    let greater = eval_bool(aro_expr::BinaryOp::Gt, &left, &right);

    let mut out = ValueMap::new();
    out.insert("equal".into(), Value::Bool(equal));
    out.insert("lessThan".into(), Value::Bool(less));
    out.insert("greaterThan".into(), Value::Bool(greater));
    ActionOutcome::ok(Value::Mapping(out))
}

fn as_datetime(v: &Value) -> Option<chrono::DateTime<chrono::Utc>> {
    match v {
        Value::DateTime(dt) => Some(*dt),
        Value::String(s) => chrono::DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&chrono::Utc)),
        _ => None,
    }
}

fn eval_bool(op: aro_expr::BinaryOp, left: &Value, right: &Value) -> bool {
    aro_expr::apply_binary_op(op, left, right).ok().and_then(|v| v.as_bool()).unwrap_or(false)
}

/// `Set`/`Configure <result> with <object>` — unconditional rebind (§4.3,
/// Open Question 1: the only verbs, besides the dispatcher's own
/// `_expression_`/`_literal_` seeding, allowed to force a rebind).
pub fn set(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let value = match expression(ctx) {
        Some(v) => v,
        None => match navigate(object, ctx) {
            Ok(v) => v,
            Err(detail) => return fail("Set", result, object, ErrorKind::ComputationError, detail),
        },
    };
    ctx.bind_force(&result.base, value.clone());
    ActionOutcome::ok(value)
}

/// `Split <result> from <source>[ with <delimiter>]` — splits a string into
/// a sequence (role table §4.2; no dedicated bullet in §4.3, treated as a
/// sibling of Compute's string operations). `_expression_`, when a string,
/// is the delimiter; otherwise splits on whitespace.
pub fn split(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let Some(source) = navigate(object, ctx).ok().and_then(|v| v.as_str().map(str::to_string)) else {
        return fail("Split", result, object, ErrorKind::ComputationError, "split needs a string source");
    };
    let parts: Vec<Value> = match expression(ctx).as_ref().and_then(Value::as_str) {
        Some(delimiter) if !delimiter.is_empty() => source.split(delimiter).map(Value::string).collect(),
        _ => source.split_whitespace().map(Value::string).collect(),
    };
    ActionOutcome::ok(Value::Sequence(parts))
}

#[cfg(test)]
#[path = "compute_tests.rs"]
mod tests;
