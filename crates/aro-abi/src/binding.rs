// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Binding and resolution (§6): `bind_string/int/double/bool/value/dict/array`,
//! `unbind`, `variable_resolve`, `variable_resolve_string/int` — the C
//! surface over [`aro_core::ExecutionContext::bind`]/`resolve` (§4.1).

use std::ffi::c_char;

use aro_core::{ExecutionContext, Value};

use crate::strings::{borrow_str, into_owned_ptr};

/// # Safety
/// `ctx` must be a live context handle; `name`/`value` must be null or valid
/// NUL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn aro_bind_string(ctx: *const ExecutionContext, name: *const c_char, value: *const c_char) -> bool {
    let (Some(ctx), Some(name)) = (ctx.as_ref(), borrow_str(name)) else { return false };
    let value = borrow_str(value).unwrap_or("").to_string();
    ctx.bind(name, Value::string(value)).is_ok()
}

/// # Safety
/// `ctx` must be a live context handle; `name` must be null or a valid
/// NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn aro_bind_int(ctx: *const ExecutionContext, name: *const c_char, value: i64) -> bool {
    let (Some(ctx), Some(name)) = (ctx.as_ref(), borrow_str(name)) else { return false };
    ctx.bind(name, Value::Int(value)).is_ok()
}

/// # Safety
/// Same as [`aro_bind_int`].
#[no_mangle]
pub unsafe extern "C" fn aro_bind_double(ctx: *const ExecutionContext, name: *const c_char, value: f64) -> bool {
    let (Some(ctx), Some(name)) = (ctx.as_ref(), borrow_str(name)) else { return false };
    ctx.bind(name, Value::Double(value)).is_ok()
}

/// # Safety
/// Same as [`aro_bind_int`].
#[no_mangle]
pub unsafe extern "C" fn aro_bind_bool(ctx: *const ExecutionContext, name: *const c_char, value: bool) -> bool {
    let (Some(ctx), Some(name)) = (ctx.as_ref(), borrow_str(name)) else { return false };
    ctx.bind(name, Value::Bool(value)).is_ok()
}

/// Bind an arbitrary JSON-encoded value, preserving its shape (§4.1 `bind`
/// accepts any of the value model's variants).
///
/// # Safety
/// `ctx` must be a live context handle; `name`/`json` must be null or valid
/// NUL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn aro_bind_value(ctx: *const ExecutionContext, name: *const c_char, json: *const c_char) -> bool {
    let (Some(ctx), Some(name), Some(json)) = (ctx.as_ref(), borrow_str(name), borrow_str(json)) else { return false };
    let Ok(parsed) = serde_json::from_str::<serde_json::Value>(json) else { return false };
    ctx.bind(name, Value::from_json(parsed)).is_ok()
}

/// Bind a JSON object, rejecting anything that doesn't parse as one.
///
/// # Safety
/// Same as [`aro_bind_value`].
#[no_mangle]
pub unsafe extern "C" fn aro_bind_dict(ctx: *const ExecutionContext, name: *const c_char, json: *const c_char) -> bool {
    let (Some(ctx), Some(name), Some(json)) = (ctx.as_ref(), borrow_str(name), borrow_str(json)) else { return false };
    let Ok(parsed) = serde_json::from_str::<serde_json::Value>(json) else { return false };
    if !parsed.is_object() {
        return false;
    }
    ctx.bind(name, Value::from_json(parsed)).is_ok()
}

/// Bind a JSON array, rejecting anything that doesn't parse as one.
///
/// # Safety
/// Same as [`aro_bind_value`].
#[no_mangle]
pub unsafe extern "C" fn aro_bind_array(ctx: *const ExecutionContext, name: *const c_char, json: *const c_char) -> bool {
    let (Some(ctx), Some(name), Some(json)) = (ctx.as_ref(), borrow_str(name), borrow_str(json)) else { return false };
    let Ok(parsed) = serde_json::from_str::<serde_json::Value>(json) else { return false };
    if !parsed.is_array() {
        return false;
    }
    ctx.bind(name, Value::from_json(parsed)).is_ok()
}

/// # Safety
/// `ctx` must be a live context handle; `name` must be null or a valid
/// NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn aro_unbind(ctx: *const ExecutionContext, name: *const c_char) {
    let (Some(ctx), Some(name)) = (ctx.as_ref(), borrow_str(name)) else { return };
    ctx.unbind(name);
}

/// `variable_resolve(context, name)` (§6): the resolved value, JSON-encoded,
/// or null if unresolved. Caller owns the returned string.
///
/// # Safety
/// Same as [`aro_unbind`].
#[no_mangle]
pub unsafe extern "C" fn aro_variable_resolve(ctx: *const ExecutionContext, name: *const c_char) -> *mut c_char {
    let (Some(ctx), Some(name)) = (ctx.as_ref(), borrow_str(name)) else { return std::ptr::null_mut() };
    match ctx.resolve(name) {
        Some(value) => into_owned_ptr(value.to_json().to_string()),
        None => std::ptr::null_mut(),
    }
}

/// `variable_resolve_string(context, name)` (§6): null unless the resolved
/// value is a string.
///
/// # Safety
/// Same as [`aro_unbind`].
#[no_mangle]
pub unsafe extern "C" fn aro_variable_resolve_string(ctx: *const ExecutionContext, name: *const c_char) -> *mut c_char {
    let (Some(ctx), Some(name)) = (ctx.as_ref(), borrow_str(name)) else { return std::ptr::null_mut() };
    match ctx.resolve(name).and_then(|v| v.as_str().map(str::to_string)) {
        Some(s) => into_owned_ptr(s),
        None => std::ptr::null_mut(),
    }
}

/// `variable_resolve_int(context, name, out)` (§6): writes the resolved
/// integer into `*out` and returns `true`, or leaves `*out` untouched and
/// returns `false` when the name doesn't resolve to an integer.
///
/// # Safety
/// `ctx` must be a live context handle; `name` must be null or a valid
/// NUL-terminated C string; `out` must point at a valid, writable `i64`.
#[no_mangle]
pub unsafe extern "C" fn aro_variable_resolve_int(ctx: *const ExecutionContext, name: *const c_char, out: *mut i64) -> bool {
    let (Some(ctx), Some(name)) = (ctx.as_ref(), borrow_str(name)) else { return false };
    match ctx.resolve(name).and_then(|v| v.as_int()) {
        Some(i) => {
            if !out.is_null() {
                *out = i;
            }
            true
        }
        None => false,
    }
}

#[cfg(test)]
#[path = "binding_tests.rs"]
mod tests;
