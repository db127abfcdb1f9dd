// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events & routing (§6): `runtime_register_handler`,
//! `register_repository_observer_with_guard`, `http_register_route`.
//!
//! Every compiled handler crosses the boundary as a bare C function pointer
//! over `*const ExecutionContext` — a plain `fn` item, `Copy` and
//! `Send + Sync` on its own, so wrapping one in the `Arc<dyn Fn(..)>`
//! closures [`aro_events::EventBus`]/[`aro_services::NativeServiceManager`]
//! expect is just a capturing closure away.

use std::ffi::c_char;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use aro_core::ExecutionContext;
use aro_services::RouteEntry;

use crate::runtime::RuntimeHandle;
use crate::strings::borrow_str;

/// A compiled event/repository-observer handler, called with the delivery
/// context.
///
/// # Safety
/// Implementations must treat the pointer as borrowed for the duration of
/// the call only.
pub type AroEventHandlerFn = unsafe extern "C" fn(*const ExecutionContext);

/// A compiled HTTP route handler, called with the request context.
///
/// # Safety
/// Same as [`AroEventHandlerFn`].
pub type AroRouteHandlerFn = unsafe extern "C" fn(*const ExecutionContext);

static NEXT_SUBSCRIBER_ID: AtomicU64 = AtomicU64::new(1);

fn fresh_subscriber_id(prefix: &str) -> String {
    format!("{prefix}-{}", NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::SeqCst))
}

/// `runtime_register_handler(handle, eventType, function-ptr)` (§6):
/// subscribes `handler` to every `eventType` delivery.
///
/// # Safety
/// `handle` must have come from [`crate::runtime::aro_runtime_init`].
/// `event_type` must be null or a valid NUL-terminated C string. `handler`
/// must be a valid function pointer for the lifetime of the runtime.
#[no_mangle]
pub unsafe extern "C" fn aro_runtime_register_handler(
    handle: *const RuntimeHandle,
    event_type: *const c_char,
    handler: AroEventHandlerFn,
) -> bool {
    let (Some(runtime), Some(event_type)) = (handle.as_ref(), borrow_str(event_type)) else { return false };
    let subscriber_id = fresh_subscriber_id("handler");
    runtime.bus.subscribe(
        subscriber_id,
        event_type,
        event_type,
        Arc::new(move |ctx: Arc<ExecutionContext>| handler(Arc::as_ptr(&ctx))),
    );
    true
}

/// `register_repository_observer_with_guard(handle, repo-name, function-ptr,
/// when-json?)` (§6): subscribes `handler` to `RepositoryChanged` events
/// naming `repo_name`, additionally gated on `when_json` (a `$binary`/`$var`
/// expression tree) when it's non-null.
///
/// # Safety
/// Same as [`aro_runtime_register_handler`], plus: `when_json`, if non-null,
/// must be a valid NUL-terminated C string holding a JSON expression tree.
#[no_mangle]
pub unsafe extern "C" fn aro_register_repository_observer_with_guard(
    handle: *const RuntimeHandle,
    repo_name: *const c_char,
    handler: AroEventHandlerFn,
    when_json: *const c_char,
) -> bool {
    let (Some(runtime), Some(repo_name)) = (handle.as_ref(), borrow_str(repo_name)) else { return false };
    let guard = match borrow_str(when_json) {
        Some(json) => match serde_json::from_str(json) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!(error = %err, "repository observer guard failed to parse");
                return false;
            }
        },
        None => None,
    };
    let subscriber_id = fresh_subscriber_id("repo-observer");
    runtime.bus.observe_repository(
        subscriber_id,
        repo_name,
        repo_name,
        guard,
        Arc::new(move |ctx: Arc<ExecutionContext>| handler(Arc::as_ptr(&ctx))),
    );
    true
}

/// `http_register_route(handle, method, path, operationId, handler)` (§6).
/// The interface names only `(method, path, operationId)`; a handler
/// function pointer is added here because an OpenAPI-derived route with no
/// way to reach compiled code would never produce a response — see
/// DESIGN.md.
///
/// # Safety
/// `handle` must have come from [`crate::runtime::aro_runtime_init`], before
/// its `http-server` has been started (routes/handlers are snapshotted at
/// `Start`, §5). `method`/`path`/`operation_id` must be null or valid
/// NUL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn aro_http_register_route(
    handle: *const RuntimeHandle,
    method: *const c_char,
    path: *const c_char,
    operation_id: *const c_char,
    handler: AroRouteHandlerFn,
) -> bool {
    let (Some(runtime), Some(method), Some(path), Some(operation_id)) =
        (handle.as_ref(), borrow_str(method), borrow_str(path), borrow_str(operation_id))
    else {
        return false;
    };
    runtime.services.register_route(RouteEntry::new(method, path, operation_id));
    runtime
        .services
        .register_handler(operation_id, Arc::new(move |ctx: &Arc<ExecutionContext>| handler(Arc::as_ptr(ctx))));
    true
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
