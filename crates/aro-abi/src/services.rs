// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Native services (§6): the HTTP server, raw TCP socket server, and file
//! watcher, all driven through [`aro_services::NativeServiceManager`].

use std::ffi::c_char;

use parking_lot::Mutex;

use aro_core::{ExecutionContext, OpaqueHandle, Value, ValueMap};
use aro_services::FileMonitor;

use crate::runtime::RuntimeHandle;
use crate::strings::borrow_str;

fn config_with_port(port: u16) -> Value {
    let mut map = ValueMap::new();
    map.insert("port".into(), Value::Int(port as i64));
    Value::Mapping(map)
}

/// `native_http_server_start(port, ctx)` (§6). Returns the bound port, or
/// `-1` on failure (port `0` binds an ephemeral port, §4.6).
///
/// # Safety
/// `handle` must have come from [`crate::runtime::aro_runtime_init`]. `ctx`
/// must be a live context handle.
#[no_mangle]
pub unsafe extern "C" fn aro_native_http_server_start(handle: *const RuntimeHandle, port: u16, ctx: *const ExecutionContext) -> i32 {
    let (Some(runtime), Some(ctx)) = (handle.as_ref(), ctx.as_ref()) else { return -1 };
    match runtime.services.start("http-server", &config_with_port(port), ctx) {
        Ok(value) => value.as_mapping().and_then(|m| m.get("port")).and_then(Value::as_int).map(|p| p as i32).unwrap_or(-1),
        Err(err) => {
            tracing::warn!(error = %err, "native_http_server_start failed");
            -1
        }
    }
}

/// `native_http_server_start_with_openapi(port, ctx)` (§6): installs
/// `openapi_json` into the embedded schema registry before starting, for
/// binaries that didn't already call `set_embedded_openapi`.
///
/// # Safety
/// Same as [`aro_native_http_server_start`], plus: `openapi_json` must be
/// null or a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn aro_native_http_server_start_with_openapi(
    handle: *const RuntimeHandle,
    port: u16,
    ctx: *const ExecutionContext,
    openapi_json: *const c_char,
) -> i32 {
    let Some(runtime) = handle.as_ref() else { return -1 };
    if let Some(json) = borrow_str(openapi_json) {
        if runtime.schema_registry.install(json).is_err() {
            return -1;
        }
    }
    aro_native_http_server_start(handle, port, ctx)
}

/// `native_http_server_stop` (§6).
///
/// # Safety
/// `handle` must have come from [`crate::runtime::aro_runtime_init`].
#[no_mangle]
pub unsafe extern "C" fn aro_native_http_server_stop(handle: *const RuntimeHandle) -> bool {
    let Some(runtime) = handle.as_ref() else { return false };
    runtime.services.stop("http-server").is_ok()
}

/// `native_socket_server_start(port)` (§6). Returns the bound port, or `-1`
/// on failure.
///
/// # Safety
/// `handle` must have come from [`crate::runtime::aro_runtime_init`]. `ctx`
/// must be a live context handle.
#[no_mangle]
pub unsafe extern "C" fn aro_native_socket_server_start(handle: *const RuntimeHandle, port: u16, ctx: *const ExecutionContext) -> i32 {
    let (Some(runtime), Some(ctx)) = (handle.as_ref(), ctx.as_ref()) else { return -1 };
    match runtime.services.start("socket-server", &config_with_port(port), ctx) {
        Ok(value) => value.as_mapping().and_then(|m| m.get("port")).and_then(Value::as_int).map(|p| p as i32).unwrap_or(-1),
        Err(err) => {
            tracing::warn!(error = %err, "native_socket_server_start failed");
            -1
        }
    }
}

/// `native_socket_server_stop` (§6).
///
/// # Safety
/// Same as [`aro_native_http_server_stop`].
#[no_mangle]
pub unsafe extern "C" fn aro_native_socket_server_stop(handle: *const RuntimeHandle) -> bool {
    let Some(runtime) = handle.as_ref() else { return false };
    runtime.services.stop("socket-server").is_ok()
}

/// `native_socket_send` (§6): write `bytes[..len]` to one connected client.
///
/// # Safety
/// `handle` must have come from [`crate::runtime::aro_runtime_init`].
/// `connection_kind` must be null or a valid NUL-terminated C string.
/// `bytes` must point at `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn aro_native_socket_send(
    handle: *const RuntimeHandle,
    connection_kind: *const c_char,
    connection_id: u64,
    bytes: *const u8,
    len: usize,
) -> bool {
    let Some(runtime) = handle.as_ref() else { return false };
    let Some(kind) = borrow_str(connection_kind) else { return false };
    if bytes.is_null() {
        return false;
    }
    let payload = std::slice::from_raw_parts(bytes, len);
    let connection = OpaqueHandle::new(kind, connection_id);
    runtime.services.socket_send(&connection, payload).is_ok()
}

/// `native_socket_broadcast` (§6): write `bytes[..len]` to every connected
/// client except an optional excluded one (pass a null `exclude_kind` to
/// exclude nobody).
///
/// # Safety
/// `handle` must have come from [`crate::runtime::aro_runtime_init`].
/// `exclude_kind` must be null or a valid NUL-terminated C string. `bytes`
/// must point at `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn aro_native_socket_broadcast(
    handle: *const RuntimeHandle,
    bytes: *const u8,
    len: usize,
    exclude_kind: *const c_char,
    exclude_id: u64,
) {
    let Some(runtime) = handle.as_ref() else { return };
    if bytes.is_null() {
        return;
    }
    let payload = std::slice::from_raw_parts(bytes, len);
    let exclude = borrow_str(exclude_kind).map(|kind| OpaqueHandle::new(kind, exclude_id));
    runtime.services.socket_broadcast(payload, exclude.as_ref());
}

/// A file watcher's granular create/start/stop/destroy handle (§6), distinct
/// from the path-keyed file monitors [`aro_services::NativeServiceManager`]
/// owns internally for `Start "file-monitor" from {path: ...}` statements —
/// this is the lower-level handle generated code manipulates directly.
pub struct FileWatcherHandle {
    runtime: *const RuntimeHandle,
    path: String,
    monitor: Mutex<Option<FileMonitor>>,
}

/// `native_file_watcher_create(path)` (§6): allocates a handle without
/// starting the watch.
///
/// # Safety
/// `handle` must have come from [`crate::runtime::aro_runtime_init`] and
/// outlive the returned watcher handle. `path` must be null or a valid
/// NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn aro_native_file_watcher_create(handle: *const RuntimeHandle, path: *const c_char) -> *mut FileWatcherHandle {
    if handle.is_null() {
        return std::ptr::null_mut();
    }
    let Some(path) = borrow_str(path) else { return std::ptr::null_mut() };
    Box::into_raw(Box::new(FileWatcherHandle { runtime: handle, path: path.to_string(), monitor: Mutex::new(None) }))
}

/// `native_file_watcher_start` (§6): begins watching the handle's path.
///
/// # Safety
/// `watcher` must have come from [`aro_native_file_watcher_create`] and not
/// yet have been destroyed.
#[no_mangle]
pub unsafe extern "C" fn aro_native_file_watcher_start(watcher: *const FileWatcherHandle) -> bool {
    let Some(watcher) = watcher.as_ref() else { return false };
    let Some(runtime) = watcher.runtime.as_ref() else { return false };
    match FileMonitor::start(&watcher.path, std::sync::Arc::clone(&runtime.bus) as std::sync::Arc<dyn aro_core::EventPublisher>) {
        Ok(monitor) => {
            *watcher.monitor.lock() = Some(monitor);
            true
        }
        Err(err) => {
            tracing::warn!(error = %err, path = %watcher.path, "native_file_watcher_start failed");
            false
        }
    }
}

/// `native_file_watcher_stop` (§6): stops watching without freeing the
/// handle; it can be started again.
///
/// # Safety
/// Same as [`aro_native_file_watcher_start`].
#[no_mangle]
pub unsafe extern "C" fn aro_native_file_watcher_stop(watcher: *const FileWatcherHandle) -> bool {
    let Some(watcher) = watcher.as_ref() else { return false };
    let mut guard = watcher.monitor.lock();
    match guard.take() {
        Some(monitor) => {
            monitor.stop();
            true
        }
        None => false,
    }
}

/// `native_file_watcher_destroy` (§6): stops the watch if still running and
/// frees the handle.
///
/// # Safety
/// `watcher` must have come from [`aro_native_file_watcher_create`] and must
/// not already have been destroyed.
#[no_mangle]
pub unsafe extern "C" fn aro_native_file_watcher_destroy(watcher: *mut FileWatcherHandle) {
    if watcher.is_null() {
        return;
    }
    let watcher = Box::from_raw(watcher);
    if let Some(monitor) = watcher.monitor.lock().take() {
        monitor.stop();
    }
}

#[cfg(test)]
#[path = "services_tests.rs"]
mod tests;
