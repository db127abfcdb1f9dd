// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime lifecycle (§6): `runtime_init`/`runtime_shutdown`/
//! `runtime_await_pending_events`, CLI argument installation, and the
//! embedded-resource setters.
//!
//! [`RuntimeHandle`] is the opaque pointer every other ABI function's
//! `handle` parameter refers to. It bundles the same five process-wide
//! pieces `aro-host`'s Rust-native `Runtime` assembles (§9 — the two crates
//! are siblings, not a chain: a compiled binary links one or the other, not
//! both), built the same way: construct the bus first, then the service
//! manager, then back-fill the bus's service reference (`EventBus::set_services`).

use std::collections::HashMap;
use std::ffi::c_char;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use aro_core::{PublishedBindings, RepositoryRegistry, SchemaRegistry, Value, ValidationOutcome};
use aro_dispatch::VerbTable;
use aro_events::{EventBus, Scheduler};
use aro_services::{NativeServiceManager, RouteTable};

use crate::strings::borrow_str;

/// A concrete [`SchemaRegistry`] over the OpenAPI document installed via
/// `set_embedded_openapi` (§6). Parsing is deferred to installation time and
/// held behind a lock so the same `Arc<dyn SchemaRegistry>` handed to the
/// bus and the service manager at `runtime_init` picks up the document once
/// the compiled binary's generated `main` calls `set_embedded_openapi`,
/// which typically happens after `runtime_init` (§1 "loading an OpenAPI
/// document is explicitly out of scope" bounds this to reading the already-
/// parsed `paths`/`components.schemas` maps, not a validating loader).
pub struct EmbeddedSchemaRegistry {
    document: RwLock<serde_json::Value>,
}

impl EmbeddedSchemaRegistry {
    pub fn new() -> Self {
        Self { document: RwLock::new(serde_json::Value::Null) }
    }

    pub fn install(&self, json: &str) -> Result<(), serde_json::Error> {
        let parsed: serde_json::Value = serde_json::from_str(json)?;
        *self.document.write() = parsed;
        Ok(())
    }
}

impl Default for EmbeddedSchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry for EmbeddedSchemaRegistry {
    /// A shallow `required`-properties check against
    /// `components.schemas.<name>` — full JSON-Schema validation is out of
    /// scope (Non-goal: strict typing), but §4.3 `Validate` still needs
    /// *something* to report on a missing field.
    fn validate(&self, schema_name: &str, value: &Value) -> ValidationOutcome {
        let document = self.document.read();
        let Some(schema) = document.pointer(&format!("/components/schemas/{schema_name}")) else {
            return ValidationOutcome::success();
        };
        let Some(required) = schema.get("required").and_then(|v| v.as_array()) else {
            return ValidationOutcome::success();
        };
        let Some(mapping) = value.as_mapping() else {
            return ValidationOutcome::failed(vec![format!("'{schema_name}' expects an object")]);
        };
        let mut errors = Vec::new();
        for key in required {
            if let Some(key) = key.as_str() {
                if !mapping.contains_key(key) {
                    errors.push(format!("missing required property '{key}'"));
                }
            }
        }
        if errors.is_empty() {
            ValidationOutcome::success()
        } else {
            ValidationOutcome::failed(errors)
        }
    }

    /// §4.6 step 7b: first key under `responses.200.content` (falling back
    /// to `201`) of the operation whose `operationId` matches.
    fn response_content_type(&self, operation_id: &str) -> Option<String> {
        let document = self.document.read();
        let paths = document.get("paths")?.as_object()?;
        for methods in paths.values() {
            let methods = methods.as_object()?;
            for operation in methods.values() {
                if operation.get("operationId").and_then(|v| v.as_str()) != Some(operation_id) {
                    continue;
                }
                for status in ["200", "201"] {
                    if let Some(content) = operation.pointer(&format!("/responses/{status}/content")) {
                        if let Some(key) = content.as_object().and_then(|o| o.keys().next()) {
                            return Some(key.clone());
                        }
                    }
                }
            }
        }
        None
    }
}

/// Everything a compiled binary's entry points need, reached through the
/// opaque pointer every ABI call's `handle` parameter is.
pub struct RuntimeHandle {
    pub verbs: VerbTable,
    pub published: Arc<PublishedBindings>,
    pub repositories: Arc<RepositoryRegistry>,
    pub schema_registry: Arc<EmbeddedSchemaRegistry>,
    pub bus: Arc<EventBus>,
    pub services: Arc<NativeServiceManager>,
    /// CLI args installed by `parse_arguments`, read back by `Extract …
    /// from parameters: …` (§6 "Environment & args").
    pub parameters: RwLock<HashMap<String, String>>,
    /// Templates installed by `set_embedded_templates`, keyed by name.
    pub templates: RwLock<HashMap<String, Value>>,
    started_at: Instant,
}

impl RuntimeHandle {
    fn new() -> Arc<Self> {
        let published = Arc::new(PublishedBindings::new());
        let repositories = Arc::new(RepositoryRegistry::new());
        let schema_registry = Arc::new(EmbeddedSchemaRegistry::new());
        let scheduler = Arc::new(Scheduler::new(aro_events::gate::default_capacity()));
        let bus = EventBus::new(
            scheduler,
            Arc::clone(&published),
            Some(Arc::clone(&schema_registry) as Arc<dyn SchemaRegistry>),
            Some(Arc::clone(&repositories)),
            None,
        );
        let services = NativeServiceManager::new(
            RouteTable::new(),
            HashMap::new(),
            "/ws",
            Arc::clone(&published),
            Arc::clone(&bus) as Arc<dyn aro_core::EventPublisher>,
            Some(Arc::clone(&schema_registry) as Arc<dyn SchemaRegistry>),
            Some(Arc::clone(&repositories)),
        );
        bus.set_services(Arc::clone(&services) as Arc<dyn aro_core::ServiceManager>);

        Arc::new(Self {
            verbs: aro_dispatch::standard_verb_table(),
            published,
            repositories,
            schema_registry,
            bus,
            services,
            parameters: RwLock::new(HashMap::new()),
            templates: RwLock::new(HashMap::new()),
            started_at: Instant::now(),
        })
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// `runtime_init() -> handle` (§6). Leaks the `Arc` into a raw pointer; the
/// matching `runtime_shutdown` reclaims it.
#[no_mangle]
pub extern "C" fn aro_runtime_init() -> *mut RuntimeHandle {
    Arc::into_raw(RuntimeHandle::new()) as *mut RuntimeHandle
}

/// `runtime_shutdown(handle)` (§6, §5 shutdown flow step 4 "close services").
///
/// # Safety
/// `handle` must have come from [`aro_runtime_init`] and not already have
/// been shut down.
#[no_mangle]
pub unsafe extern "C" fn aro_runtime_shutdown(handle: *mut RuntimeHandle) {
    if handle.is_null() {
        return;
    }
    let runtime = Arc::from_raw(handle as *const RuntimeHandle);
    let _ = runtime.services.stop("http-server");
    let _ = runtime.services.stop("socket-server");
    let _ = runtime.services.stop("file-monitor");
    drop(runtime);
}

/// `runtime_await_pending_events(handle, timeout) -> bool` (§6): drains
/// in-flight event deliveries, returning `true` iff the drain was clean
/// before `timeout_ms` elapsed (§5 "up to 10s drain").
///
/// # Safety
/// `handle` must have come from [`aro_runtime_init`] and not yet have been
/// shut down.
#[no_mangle]
pub unsafe extern "C" fn aro_runtime_await_pending_events(handle: *const RuntimeHandle, timeout_ms: u64) -> bool {
    let Some(runtime) = handle.as_ref() else { return false };
    runtime.bus.scheduler().drain(Duration::from_millis(timeout_ms))
}

/// `parse_arguments(argc, argv)` (§6): installs `argv[1..]` as named
/// parameters `arg0`, `arg1`, … for later `Extract … from parameters: …`
/// lookups. No CLI-parsing crate is warranted for a flat positional install.
///
/// # Safety
/// `handle` must have come from [`aro_runtime_init`]. `argv` must point at
/// `argc` valid, NUL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn aro_parse_arguments(handle: *const RuntimeHandle, argc: i32, argv: *const *const c_char) {
    let Some(runtime) = handle.as_ref() else { return };
    if argv.is_null() || argc <= 1 {
        return;
    }
    let mut parameters = runtime.parameters.write();
    for i in 1..argc as isize {
        let ptr = *argv.offset(i);
        if let Some(arg) = borrow_str(ptr) {
            parameters.insert(format!("arg{}", i - 1), arg.to_string());
        }
    }
}

/// `set_embedded_openapi(json-string)` (§6).
///
/// # Safety
/// `handle` must have come from [`aro_runtime_init`]. `json` must be null or
/// a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn aro_set_embedded_openapi(handle: *const RuntimeHandle, json: *const c_char) -> bool {
    let Some(runtime) = handle.as_ref() else { return false };
    let Some(json) = borrow_str(json) else { return false };
    match runtime.schema_registry.install(json) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "embedded OpenAPI document failed to parse");
            false
        }
    }
}

/// `set_embedded_templates(json-map)` (§6): installs a flat `{name: value}`
/// map of templates, read back by whatever `Interpolate`/`Transform`
/// statements name them.
///
/// # Safety
/// `handle` must have come from [`aro_runtime_init`]. `json` must be null or
/// a valid NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn aro_set_embedded_templates(handle: *const RuntimeHandle, json: *const c_char) -> bool {
    let Some(runtime) = handle.as_ref() else { return false };
    let Some(json) = borrow_str(json) else { return false };
    let parsed: serde_json::Value = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!(error = %err, "embedded templates document failed to parse");
            return false;
        }
    };
    let Some(map) = parsed.as_object() else { return false };
    let mut templates = runtime.templates.write();
    for (key, value) in map {
        templates.insert(key.clone(), Value::from_json(value.clone()));
    }
    true
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
