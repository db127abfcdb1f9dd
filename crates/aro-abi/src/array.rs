// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Arrays/parallel (§6): `array_count`, `array_get`,
//! `parallel_for_each_execute` over [`aro_events::Scheduler::parallel_for_each`]
//! (Open Question 4: run-all-report-all).

use std::ffi::c_char;

use aro_core::Value;

use crate::context::ptr_to_arc;
use crate::runtime::RuntimeHandle;
use crate::strings::{borrow_str, free_string, into_owned_ptr};

/// `array_count(json) -> int` (§6): length of a JSON array, or `-1` if
/// `json` doesn't parse as one.
///
/// # Safety
/// `json` must be null or a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn aro_array_count(json: *const c_char) -> i32 {
    let Some(json) = borrow_str(json) else { return -1 };
    match serde_json::from_str::<serde_json::Value>(json) {
        Ok(serde_json::Value::Array(items)) => items.len() as i32,
        _ => -1,
    }
}

/// `array_get(json, index) -> string` (§6): the JSON-encoded element at
/// `index`, or null if out of bounds or `json` isn't an array.
///
/// # Safety
/// Same as [`aro_array_count`].
#[no_mangle]
pub unsafe extern "C" fn aro_array_get(json: *const c_char, index: i32) -> *mut c_char {
    let Some(json) = borrow_str(json) else { return std::ptr::null_mut() };
    let Ok(serde_json::Value::Array(items)) = serde_json::from_str::<serde_json::Value>(json) else {
        return std::ptr::null_mut();
    };
    if index < 0 {
        return std::ptr::null_mut();
    }
    match items.get(index as usize) {
        Some(item) => into_owned_ptr(item.to_string()),
        None => std::ptr::null_mut(),
    }
}

/// A loop body: called with a fresh per-iteration child context, returns the
/// JSON-encoded contribution for that iteration. The returned string is
/// consumed (freed) by the caller of this module, not retained by compiled
/// code.
///
/// # Safety
/// Implementations must treat the context pointer as borrowed for the
/// duration of the call and return a string this module may free.
pub type AroLoopBodyFn = unsafe extern "C" fn(*const aro_core::ExecutionContext) -> *mut c_char;

/// `parallel_for_each_execute(runtime, ctx, collection, body-fn, concurrency,
/// item-name, index-name)` (§6): runs `body` once per element of
/// `collection` JSON array, each against its own child context (§4.3
/// Map/Filter's sibling parallel loop). Returns
/// `{"results": [...], "error": string|null}` JSON-encoded.
///
/// # Safety
/// `handle` must have come from [`crate::runtime::aro_runtime_init`]. `ctx`
/// must be a live context handle. `collection`/`item_name` must be null or
/// valid NUL-terminated C strings; `index_name` may additionally be null to
/// mean "don't bind an index". `body` must be a valid function pointer.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn aro_parallel_for_each_execute(
    handle: *const RuntimeHandle,
    ctx: *const aro_core::ExecutionContext,
    collection: *const c_char,
    body: AroLoopBodyFn,
    concurrency: i32,
    item_name: *const c_char,
    index_name: *const c_char,
) -> *mut c_char {
    let Some(runtime) = handle.as_ref() else { return std::ptr::null_mut() };
    let Some(parent) = ptr_to_arc(ctx) else { return std::ptr::null_mut() };
    let Some(item_name) = borrow_str(item_name) else {
        std::mem::forget(parent);
        return std::ptr::null_mut();
    };
    let index_name = borrow_str(index_name);

    let items: Vec<Value> = match borrow_str(collection).and_then(|s| serde_json::from_str::<serde_json::Value>(s).ok()) {
        Some(serde_json::Value::Array(items)) => items.into_iter().map(Value::from_json).collect(),
        _ => {
            std::mem::forget(parent);
            return std::ptr::null_mut();
        }
    };

    let outcome = runtime.bus.scheduler().parallel_for_each(
        &parent,
        items,
        item_name,
        index_name,
        concurrency.max(1) as usize,
        &|child: &aro_core::ExecutionContext| {
            let raw = body(child as *const aro_core::ExecutionContext);
            if raw.is_null() {
                return Value::Null;
            }
            let rendered = std::ffi::CStr::from_ptr(raw).to_str().ok().and_then(|s| serde_json::from_str(s).ok());
            free_string(raw);
            rendered.map(Value::from_json).unwrap_or(Value::Null)
        },
    );
    std::mem::forget(parent);

    let rendered = serde_json::json!({
        "results": outcome.results.iter().map(Value::to_json).collect::<Vec<_>>(),
        "error": outcome.first_error.map(|e| e.message),
    });
    into_owned_ptr(rendered.to_string())
}

#[cfg(test)]
#[path = "array_tests.rs"]
mod tests;
