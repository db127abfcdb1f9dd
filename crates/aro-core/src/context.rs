// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-activation execution context (§3 Execution Context, §4.1).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::{ErrorKind, ExecutionError};
use crate::event::{Event, EventPublisher, NullPublisher};
use crate::repository::RepositoryRegistry;
use crate::response::{Response, ResponseStatus};
use crate::schema::SchemaRegistry;
use crate::service::ServiceManager;
use crate::value::Value;

/// Binding names the runtime reserves for implicit handler/dispatch state
/// (§3 Binding). `bind` still accepts writes to these — reservation only
/// means "the runtime itself may overwrite this without asking" — but
/// `_expression_`/`_literal_` are the only two exempt from the immutable-
/// rebind rule (Open Question 1).
pub const RESERVED_BINDINGS: &[&str] =
    &["_expression_", "_literal_", "_to_", "event", "request", "pathParameters", "queryParameters", "shutdown"];

/// Names always rebindable in place, regardless of whether a value is
/// already bound (§4.1 `bind`).
fn always_rebindable(name: &str) -> bool {
    name == "_expression_" || name == "_literal_"
}

/// Process-wide bindings installed via `Publish`, guarded by a single
/// reader/writer lock shared across every context (§4.1).
#[derive(Default)]
pub struct PublishedBindings {
    values: RwLock<HashMap<String, Value>>,
}

impl PublishedBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, name: impl Into<String>, value: Value) {
        self.values.write().insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.read().get(name).cloned()
    }
}

/// Why a `bind` call was refused (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindError {
    ImmutableRebind,
}

/// A thread's hook back into whatever is holding its concurrency-gate slot
/// (§4.5 "Yielding while blocked"). Lives in `aro-core` rather than
/// `aro-events` so both the gate's owner and the blocking actions that need
/// to release it (Fetch, a nested handler chain) can share it through the
/// context without a new crate dependency edge between them.
pub trait Yielder: Send + Sync {
    /// Run `blocking` with this thread's gate slot released, then reacquire
    /// one before returning.
    fn yield_while(&self, blocking: &mut dyn FnMut());
}

/// The per-activation environment threaded through every statement of a
/// feature set (§3, §4.1). Created per top-level activation and per
/// parallel-loop iteration; destroyed when its owning feature set returns.
pub struct ExecutionContext {
    pub feature_set_name: String,
    pub business_activity: String,
    bindings: RwLock<HashMap<String, Value>>,
    parent: Option<Arc<ExecutionContext>>,
    published: Arc<PublishedBindings>,
    response: Mutex<Option<Response>>,
    execution_error: Mutex<Option<ExecutionError>>,
    event_publisher: Arc<dyn EventPublisher>,
    schema_registry: Option<Arc<dyn SchemaRegistry>>,
    /// Not named among the §3 attributes, but every repository-targeting
    /// verb (Store/Retrieve/Delete, and `<name: count>` in the expression
    /// evaluator) needs a way to reach the process-wide registry from a
    /// context. Added for that purpose; see DESIGN.md.
    repositories: Option<Arc<RepositoryRegistry>>,
    services: Option<Arc<dyn ServiceManager>>,
    /// Set only on contexts built for a scheduler-dispatched delivery (event
    /// handlers); absent on the top-level activation, which doesn't hold a
    /// gate slot to begin with. See [`Yielder`].
    yielder: Option<Arc<dyn Yielder>>,
    wait_state: AtomicBool,
}

impl ExecutionContext {
    /// Construct a fresh top-level context (§3 Lifecycle (a)).
    pub fn new(
        feature_set_name: impl Into<String>,
        business_activity: impl Into<String>,
        published: Arc<PublishedBindings>,
        event_publisher: Arc<dyn EventPublisher>,
        schema_registry: Option<Arc<dyn SchemaRegistry>>,
    ) -> Self {
        Self {
            feature_set_name: feature_set_name.into(),
            business_activity: business_activity.into(),
            bindings: RwLock::new(HashMap::new()),
            parent: None,
            published,
            response: Mutex::new(None),
            execution_error: Mutex::new(None),
            event_publisher,
            schema_registry,
            repositories: None,
            services: None,
            yielder: None,
            wait_state: AtomicBool::new(false),
        }
    }

    /// Attach the process-wide repository registry. Chainable so callers
    /// can write `ExecutionContext::new(..).with_repositories(registry)`.
    pub fn with_repositories(mut self, repositories: Arc<RepositoryRegistry>) -> Self {
        self.repositories = Some(repositories);
        self
    }

    pub fn repositories(&self) -> Option<&Arc<RepositoryRegistry>> {
        self.repositories.as_ref()
    }

    /// Attach the native-service manager (§4.3 Start/Stop/Keepalive).
    pub fn with_services(mut self, services: Arc<dyn ServiceManager>) -> Self {
        self.services = Some(services);
        self
    }

    pub fn services(&self) -> Option<&Arc<dyn ServiceManager>> {
        self.services.as_ref()
    }

    /// Attach a gate-yield hook (§4.5 "Yielding while blocked").
    pub fn with_yielder(mut self, yielder: Arc<dyn Yielder>) -> Self {
        self.yielder = Some(yielder);
        self
    }

    /// Run `blocking` through this context's yield hook if one is attached
    /// (releasing the thread's gate slot for the duration), otherwise just
    /// run it directly — e.g. the top-level activation, which holds no gate
    /// slot to release. Call this around any blocking wait on downstream
    /// work: a nested `Fetch`, a recursive handler chain.
    pub fn yield_while_blocked<T>(&self, blocking: impl FnOnce() -> T) -> T {
        match &self.yielder {
            Some(yielder) => {
                let mut blocking = Some(blocking);
                let mut output = None;
                yielder.yield_while(&mut || output = Some((blocking.take().expect("called once"))()));
                output.expect("yield hook must invoke the closure exactly once")
            }
            None => blocking(),
        }
    }

    /// A minimal standalone context for expression evaluation and unit
    /// tests, with no event bus or schema registry backing it.
    pub fn standalone(feature_set_name: impl Into<String>, business_activity: impl Into<String>) -> Self {
        Self::new(feature_set_name, business_activity, Arc::new(PublishedBindings::new()), Arc::new(NullPublisher), None)
    }

    /// Create a child context for a parallel-loop iteration (§3 Lifecycle
    /// (b), §4.1 `createChild`). The child inherits the parent's event bus
    /// and schema registry and can read the parent's bindings through the
    /// scope chain, but its own writes stay private (§3 invariant).
    pub fn create_child(self: &Arc<Self>, feature_set_name: impl Into<String>) -> Arc<ExecutionContext> {
        Arc::new(Self {
            feature_set_name: feature_set_name.into(),
            business_activity: self.business_activity.clone(),
            bindings: RwLock::new(HashMap::new()),
            parent: Some(Arc::clone(self)),
            published: Arc::clone(&self.published),
            response: Mutex::new(None),
            execution_error: Mutex::new(None),
            event_publisher: Arc::clone(&self.event_publisher),
            schema_registry: self.schema_registry.clone(),
            repositories: self.repositories.clone(),
            services: self.services.clone(),
            yielder: self.yielder.clone(),
            wait_state: AtomicBool::new(false),
        })
    }

    /// Create a detached per-item scope for a collection-iteration body or
    /// predicate (§4.3 Map/Filter/Reduce, Retrieve's `where` clause), without
    /// requiring the caller to hold `self` behind an `Arc` the way
    /// `create_child` does. Shares the event bus, schema registry, and
    /// repository registry, but does not chain bindings back to `self` —
    /// callers bind everything the evaluated expression needs (`item`,
    /// `accumulator`) directly on the returned scope.
    pub fn child_scope(&self, feature_set_name: impl Into<String>) -> ExecutionContext {
        Self {
            feature_set_name: feature_set_name.into(),
            business_activity: self.business_activity.clone(),
            bindings: RwLock::new(HashMap::new()),
            parent: None,
            published: Arc::clone(&self.published),
            response: Mutex::new(None),
            execution_error: Mutex::new(None),
            event_publisher: Arc::clone(&self.event_publisher),
            schema_registry: self.schema_registry.clone(),
            repositories: self.repositories.clone(),
            services: self.services.clone(),
            yielder: self.yielder.clone(),
            wait_state: AtomicBool::new(false),
        }
    }

    /// Bind `name` to `value` in this scope. Fails with `ImmutableRebind`
    /// when `name` is already bound here and isn't one of the two always-
    /// rebindable statement-scoped names (§4.1).
    pub fn bind(&self, name: &str, value: Value) -> Result<(), BindError> {
        let mut guard = self.bindings.write();
        if !always_rebindable(name) && guard.contains_key(name) {
            return Err(BindError::ImmutableRebind);
        }
        guard.insert(name.to_string(), value);
        Ok(())
    }

    /// Force a rebind regardless of the immutable-rebind rule. Used by
    /// `Set`/`Configure`, which are specified to overwrite in place (Open
    /// Question 1), and by the dispatcher to seed `_expression_`/`_literal_`.
    pub fn bind_force(&self, name: &str, value: Value) {
        self.bindings.write().insert(name.to_string(), value);
    }

    pub fn unbind(&self, name: &str) {
        self.bindings.write().remove(name);
    }

    /// Resolve `name`: this scope, then each ancestor in turn, then the
    /// process-global published bindings (§4.1 `resolve`).
    pub fn resolve(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.bindings.read().get(name) {
            return Some(v.clone());
        }
        let mut cur = self.parent.as_deref();
        while let Some(ctx) = cur {
            if let Some(v) = ctx.bindings.read().get(name) {
                return Some(v.clone());
            }
            cur = ctx.parent.as_deref();
        }
        self.published.get(name)
    }

    pub fn set_response(&self, status: ResponseStatus, data: crate::value::ValueMap) {
        let mut guard = self.response.lock();
        if guard.is_none() {
            *guard = Some(Response::new(status, data));
        }
    }

    pub fn get_response(&self) -> Option<Response> {
        self.response.lock().clone()
    }

    pub fn has_response(&self) -> bool {
        self.response.lock().is_some()
    }

    pub fn set_execution_error(&self, kind: ErrorKind, detail: impl Into<String>) {
        let mut guard = self.execution_error.lock();
        if guard.is_none() {
            *guard = Some(ExecutionError::new(kind, detail));
        }
    }

    pub fn set_thrown_error(&self, thrown_type: impl Into<String>, detail: impl Into<String>) {
        let mut guard = self.execution_error.lock();
        if guard.is_none() {
            *guard = Some(ExecutionError::thrown(thrown_type, detail));
        }
    }

    pub fn execution_error(&self) -> Option<ExecutionError> {
        self.execution_error.lock().clone()
    }

    pub fn has_execution_error(&self) -> bool {
        self.execution_error.lock().is_some()
    }

    /// True once either a response or an error has been set for this
    /// activation — the dispatcher uses this to short-circuit remaining
    /// statements (§3 invariants).
    pub fn is_terminated(&self) -> bool {
        self.has_response() || self.has_execution_error()
    }

    pub fn publish_global(&self, name: impl Into<String>, value: Value) {
        self.published.publish(name, value);
    }

    pub fn publish_event(&self, event: Event) {
        self.event_publisher.publish(event);
    }

    pub fn schema_registry(&self) -> Option<&Arc<dyn SchemaRegistry>> {
        self.schema_registry.as_ref()
    }

    pub fn enter_wait_state(&self) {
        self.wait_state.store(true, Ordering::SeqCst);
    }

    pub fn is_waiting(&self) -> bool {
        self.wait_state.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
