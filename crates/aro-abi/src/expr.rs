// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Expression evaluation (§6, §4.4): `evaluate_expression`/`evaluate_and_bind`
//! over [`aro_expr::eval`], plus `evaluate_when_guard`, `interpolate_string`,
//! and `match_pattern`.

use std::ffi::c_char;

use aro_core::{ExecutionContext, Value};

use crate::strings::{borrow_str, into_owned_ptr};

fn parse_json(json: *const c_char) -> Option<serde_json::Value> {
    let json = unsafe { borrow_str(json) }?;
    serde_json::from_str(json).ok()
}

/// `evaluate_expression(context, json)` (§6): evaluates the JSON expression
/// tree and binds its result to `_expression_` (§4.2 step 3's seeding, here
/// exposed directly for compiled code that wants the value without going
/// through the dispatcher). Returns the result JSON-encoded, or null on
/// error.
///
/// # Safety
/// `ctx` must be a live context handle; `json` must be null or a valid
/// NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn aro_evaluate_expression(ctx: *const ExecutionContext, json: *const c_char) -> *mut c_char {
    let Some(ctx) = ctx.as_ref() else { return std::ptr::null_mut() };
    let Some(node) = parse_json(json) else { return std::ptr::null_mut() };
    match aro_expr::eval(&node, ctx) {
        Ok(value) => {
            ctx.bind_force("_expression_", value.clone());
            into_owned_ptr(value.to_json().to_string())
        }
        Err(err) => {
            tracing::debug!(error = %err, "evaluate_expression failed");
            std::ptr::null_mut()
        }
    }
}

/// `evaluate_and_bind(context, name, json)` (§6): evaluate and bind straight
/// to `name` rather than `_expression_`. Returns `true` on success.
///
/// # Safety
/// `ctx` must be a live context handle; `name`/`json` must be null or valid
/// NUL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn aro_evaluate_and_bind(ctx: *const ExecutionContext, name: *const c_char, json: *const c_char) -> bool {
    let (Some(ctx), Some(name)) = (ctx.as_ref(), borrow_str(name)) else { return false };
    let Some(node) = parse_json(json) else { return false };
    match aro_expr::eval(&node, ctx) {
        Ok(value) => ctx.bind(name, value).is_ok(),
        Err(err) => {
            tracing::debug!(error = %err, "evaluate_and_bind failed");
            false
        }
    }
}

/// `evaluate_when_guard(context, json) -> 0|1` (§6, §4.2 step 2).
///
/// # Safety
/// `ctx` must be a live context handle; `json` must be null or a valid
/// NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn aro_evaluate_when_guard(ctx: *const ExecutionContext, json: *const c_char) -> i32 {
    let Some(ctx) = ctx.as_ref() else { return 0 };
    let Some(node) = parse_json(json) else { return 0 };
    match aro_expr::eval(&node, ctx) {
        Ok(value) if value.is_truthy() => 1,
        _ => 0,
    }
}

/// `interpolate_string(context, template) -> string` (§6, §4.4
/// `$interpolated`). Implemented by routing through [`aro_expr::eval`]'s
/// `$interpolated` node rather than duplicating the substitution logic.
///
/// # Safety
/// `ctx` must be a live context handle; `template` must be null or a valid
/// NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn aro_interpolate_string(ctx: *const ExecutionContext, template: *const c_char) -> *mut c_char {
    let Some(ctx) = ctx.as_ref() else { return std::ptr::null_mut() };
    let Some(template) = borrow_str(template) else { return std::ptr::null_mut() };
    let node = serde_json::json!({ "$interpolated": template });
    match aro_expr::eval(&node, ctx) {
        Ok(value) => into_owned_ptr(value.as_str().unwrap_or("").to_string()),
        Err(err) => {
            tracing::debug!(error = %err, "interpolate_string failed");
            std::ptr::null_mut()
        }
    }
}

/// `match_pattern(context, subject-json, pattern-json) -> 0|1` (§6).
///
/// Not specified further by the interface than its signature; implemented
/// as structural matching over the parsed JSON shapes — a mapping pattern
/// matches when every one of its keys is present in the subject and its
/// value matches recursively (extra subject keys are ignored), a sequence
/// pattern matches element-by-element of equal length, the string `"*"`
/// matches anything, and any other scalar matches by equality. `context` is
/// accepted for signature symmetry with the rest of this module but isn't
/// consulted — matching is pure.
///
/// # Safety
/// `ctx` must be a live context handle; both JSON arguments must be null or
/// valid NUL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn aro_match_pattern(
    ctx: *const ExecutionContext,
    subject: *const c_char,
    pattern: *const c_char,
) -> i32 {
    if ctx.is_null() {
        return 0;
    }
    let (Some(subject), Some(pattern)) = (parse_json(subject), parse_json(pattern)) else { return 0 };
    i32::from(structural_match(&Value::from_json(subject), &Value::from_json(pattern)))
}

fn structural_match(subject: &Value, pattern: &Value) -> bool {
    match pattern {
        Value::String(s) if s == "*" => true,
        Value::Mapping(pattern_map) => {
            let Some(subject_map) = subject.as_mapping() else { return false };
            pattern_map.iter().all(|(k, v)| subject_map.get(k).is_some_and(|sv| structural_match(sv, v)))
        }
        Value::Sequence(pattern_seq) => {
            let Some(subject_seq) = subject.as_sequence() else { return false };
            subject_seq.len() == pattern_seq.len()
                && subject_seq.iter().zip(pattern_seq).all(|(s, p)| structural_match(s, p))
        }
        other => subject == other,
    }
}

#[cfg(test)]
#[path = "expr_tests.rs"]
mod tests;
