// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Context lifecycle (§6): `context_create`/`context_create_named`/
//! `context_create_child`/`context_destroy`, plus the three inspection
//! helpers a compiled binary's generated `main` uses to report its own
//! outcome (`context_print_response`, `context_has_error`,
//! `context_print_error`).
//!
//! Every context handle is an `Arc<ExecutionContext>` reinterpreted as a raw
//! pointer (`Arc::into_raw`/`Arc::from_raw`), the same convention
//! [`crate::runtime::RuntimeHandle`] uses — `create_child` already requires
//! `&Arc<Self>` (§9 weak-self pattern), so the handle has to be an `Arc` to
//! begin with rather than a bare `Box`.

use std::ffi::c_char;
use std::sync::Arc;

use aro_core::ExecutionContext;

use crate::runtime::RuntimeHandle;
use crate::strings::{borrow_str, into_owned_ptr};

/// `context_create(handle, feature_set_name)` (§6): a top-level context
/// whose `businessActivity` defaults to the feature set name itself — the
/// common case for a CLI entry point that isn't an OpenAPI operation or
/// event handler.
///
/// # Safety
/// `handle` must have come from [`crate::runtime::aro_runtime_init`].
/// `feature_set_name` must be null or a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn aro_context_create(
    handle: *const RuntimeHandle,
    feature_set_name: *const c_char,
) -> *const ExecutionContext {
    aro_context_create_named(handle, feature_set_name, feature_set_name)
}

/// `context_create_named(handle, feature_set_name, business_activity)` (§6).
///
/// # Safety
/// `handle` must have come from [`crate::runtime::aro_runtime_init`]. Both
/// string arguments must be null or valid NUL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn aro_context_create_named(
    handle: *const RuntimeHandle,
    feature_set_name: *const c_char,
    business_activity: *const c_char,
) -> *const ExecutionContext {
    let Some(runtime) = handle.as_ref() else { return std::ptr::null() };
    let feature_set_name = borrow_str(feature_set_name).unwrap_or("").to_string();
    let business_activity = borrow_str(business_activity).unwrap_or("").to_string();

    let ctx = ExecutionContext::new(
        feature_set_name,
        business_activity,
        Arc::clone(&runtime.published),
        Arc::clone(&runtime.bus) as Arc<dyn aro_core::EventPublisher>,
        Some(Arc::clone(&runtime.schema_registry) as Arc<dyn aro_core::SchemaRegistry>),
    )
    .with_repositories(Arc::clone(&runtime.repositories))
    .with_services(Arc::clone(&runtime.services) as Arc<dyn aro_core::ServiceManager>);

    Arc::into_raw(Arc::new(ctx))
}

/// `context_create_child(handle, parent, feature_set_name)` (§3 Lifecycle
/// (b), §4.3 `parallel_for_each_execute`'s per-iteration contexts).
///
/// # Safety
/// `parent` must have come from one of this module's `create` functions and
/// not yet have been destroyed.
#[no_mangle]
pub unsafe extern "C" fn aro_context_create_child(
    parent: *const ExecutionContext,
    feature_set_name: *const c_char,
) -> *const ExecutionContext {
    let Some(parent) = ptr_to_arc(parent) else { return std::ptr::null() };
    let feature_set_name = borrow_str(feature_set_name).unwrap_or("").to_string();
    let child = parent.create_child(feature_set_name);
    std::mem::forget(parent);
    Arc::into_raw(child)
}

/// `context_destroy(ctx)` (§3 Lifecycle "destroyed when its owning feature
/// set returns").
///
/// # Safety
/// `ctx` must have come from one of this module's `create` functions and
/// must not already have been destroyed.
#[no_mangle]
pub unsafe extern "C" fn aro_context_destroy(ctx: *const ExecutionContext) {
    if ctx.is_null() {
        return;
    }
    drop(Arc::from_raw(ctx));
}

/// `context_print_response(ctx)` (§6): renders the activation's response (if
/// any) as JSON to stdout, the shape a compiled binary's entry point uses to
/// report its own result.
///
/// # Safety
/// `ctx` must have come from one of this module's `create` functions and not
/// yet have been destroyed.
#[no_mangle]
pub unsafe extern "C" fn aro_context_print_response(ctx: *const ExecutionContext) {
    let Some(ctx) = ctx.as_ref() else { return };
    if let Some(response) = ctx.get_response() {
        let rendered = aro_core::Value::Mapping(response.data).to_json();
        println!("{{\"status\":\"{}\",\"data\":{rendered}}}", response.status);
    }
}

/// `context_has_error(ctx)` (§6).
///
/// # Safety
/// `ctx` must have come from one of this module's `create` functions and not
/// yet have been destroyed.
#[no_mangle]
pub unsafe extern "C" fn aro_context_has_error(ctx: *const ExecutionContext) -> bool {
    let Some(ctx) = ctx.as_ref() else { return false };
    ctx.has_execution_error()
}

/// `context_print_error(ctx)` (§6): renders the activation's error (if any)
/// to stderr. Returns the rendered message as an owned C string the caller
/// must free, or null when there is no error.
///
/// # Safety
/// `ctx` must have come from one of this module's `create` functions and not
/// yet have been destroyed.
#[no_mangle]
pub unsafe extern "C" fn aro_context_print_error(ctx: *const ExecutionContext) -> *mut c_char {
    let Some(ctx) = ctx.as_ref() else { return std::ptr::null_mut() };
    let Some(error) = ctx.execution_error() else { return std::ptr::null_mut() };
    eprintln!("{}", error.message);
    into_owned_ptr(error.message)
}

/// Borrow a raw context pointer as a fresh `Arc` without decrementing the
/// strong count the caller still owns — `Arc::from_raw` followed by a
/// balancing `std::mem::forget` rather than `Arc::increment_strong_count`,
/// to keep the unsafe surface in one place. Used wherever an API needs
/// `&Arc<ExecutionContext>` (e.g. `create_child`, `parallel_for_each`)
/// rather than `&ExecutionContext`.
pub(crate) unsafe fn ptr_to_arc(ptr: *const ExecutionContext) -> Option<Arc<ExecutionContext>> {
    if ptr.is_null() {
        return None;
    }
    let arc = Arc::from_raw(ptr);
    Some(arc)
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
