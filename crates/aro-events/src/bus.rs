// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The topic registry of §4.5: `eventType -> subscribers`, subscribed to
//! idempotently per `(subscriber-id, event-type)`, published to
//! non-blockingly through the [`crate::Scheduler`].
//!
//! Kept as the graph root the way §9 "Cyclic references to services from
//! contexts" prescribes: every [`aro_core::ExecutionContext`] the bus hands
//! to a handler holds the bus back only through the
//! [`aro_core::EventPublisher`] trait object, and the bus hands out that
//! object via a weak upgrade of itself rather than owning a strong cycle.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use aro_core::{
    Event, EventPublisher, ExecutionContext, NullPublisher, PublishedBindings, RepositoryRegistry,
    SchemaRegistry, ServiceManager, Value,
};

/// A compiled handler's entry point: given a fully-built context with
/// `event`/`event:key` already bound, run the handler's statements. Side
/// effects (response/error/repository writes/further `Emit`s) land on the
/// context the bus constructed for this delivery.
pub type HandlerFn = Arc<dyn Fn(Arc<ExecutionContext>) + Send + Sync>;

struct Subscription {
    subscriber_id: String,
    business_activity: String,
    handler: HandlerFn,
}

/// Process-wide event bus: topic registry plus the shared runtime state
/// every delivery's context needs (published bindings, schema registry,
/// repositories, services).
pub struct EventBus {
    subscribers: RwLock<HashMap<String, Vec<Subscription>>>,
    scheduler: Arc<crate::Scheduler>,
    published: Arc<PublishedBindings>,
    schema_registry: Option<Arc<dyn SchemaRegistry>>,
    repositories: Option<Arc<RepositoryRegistry>>,
    /// A `RwLock` rather than a plain `Option` because the service manager
    /// itself typically needs an `Arc<dyn EventPublisher>` pointing back at
    /// this bus (e.g. `NativeServiceManager`'s TCP/file-watcher event
    /// publishing) — assembly has to construct the bus first, hand it out,
    /// then install the service manager here once it exists (§9 "Cyclic
    /// references to services from contexts").
    services: RwLock<Option<Arc<dyn ServiceManager>>>,
    self_ref: RwLock<Weak<EventBus>>,
}

impl EventBus {
    pub fn new(
        scheduler: Arc<crate::Scheduler>,
        published: Arc<PublishedBindings>,
        schema_registry: Option<Arc<dyn SchemaRegistry>>,
        repositories: Option<Arc<RepositoryRegistry>>,
        services: Option<Arc<dyn ServiceManager>>,
    ) -> Arc<Self> {
        let bus = Arc::new(Self {
            subscribers: RwLock::new(HashMap::new()),
            scheduler,
            published,
            schema_registry,
            repositories,
            services: RwLock::new(services),
            self_ref: RwLock::new(Weak::new()),
        });
        *bus.self_ref.write() = Arc::downgrade(&bus);
        bus
    }

    pub fn scheduler(&self) -> &Arc<crate::Scheduler> {
        &self.scheduler
    }

    /// Install the service manager after construction, breaking the
    /// construction-order cycle between the bus and a manager that needs an
    /// `Arc<dyn EventPublisher>` pointing back at it.
    pub fn set_services(&self, services: Arc<dyn ServiceManager>) {
        *self.services.write() = Some(services);
    }

    /// Register `handler` against `event_type` on behalf of `subscriber_id`.
    /// Re-subscribing the same `(subscriber_id, event_type)` pair is a
    /// no-op (§4.5 "Subscribe is thread-safe and idempotent").
    pub fn subscribe(
        &self,
        subscriber_id: impl Into<String>,
        event_type: impl Into<String>,
        business_activity: impl Into<String>,
        handler: HandlerFn,
    ) {
        let subscriber_id = subscriber_id.into();
        let event_type = event_type.into();
        let mut subscribers = self.subscribers.write();
        let topic = subscribers.entry(event_type).or_default();
        if topic.iter().any(|s| s.subscriber_id == subscriber_id) {
            return;
        }
        topic.push(Subscription { subscriber_id, business_activity: business_activity.into(), handler });
    }

    /// Convenience wrapper over `subscribe` for §6
    /// `register_repository_observer_with_guard`: the handler only runs
    /// when the `RepositoryChanged` event names `repo_name` and, if
    /// present, `guard` (a `$binary`/`$var` expression tree evaluated
    /// against the delivery context) is truthy.
    pub fn observe_repository(
        &self,
        subscriber_id: impl Into<String>,
        repo_name: impl Into<String>,
        business_activity: impl Into<String>,
        guard: Option<serde_json::Value>,
        handler: HandlerFn,
    ) {
        let repo_name = repo_name.into();
        let guarded: HandlerFn = Arc::new(move |ctx: Arc<ExecutionContext>| {
            if ctx.resolve("event:name").and_then(|v| v.as_str().map(str::to_string)).as_deref() != Some(repo_name.as_str()) {
                return;
            }
            if let Some(guard) = &guard {
                if !matches!(aro_expr::eval(guard, &ctx), Ok(v) if v.is_truthy()) {
                    return;
                }
            }
            handler(ctx);
        });
        self.subscribe(subscriber_id, "RepositoryChanged", business_activity, guarded);
    }

    /// Non-blocking (§4.5): build one fresh context per subscriber and
    /// hand each to the scheduler. Returns before any handler has run to
    /// completion (§5 "A publisher's Emit returns before handlers run to
    /// completion").
    pub fn publish(&self, event: Event) {
        let event_type = event.event_type();
        let targets: Vec<(String, HandlerFn)> = {
            let subscribers = self.subscribers.read();
            subscribers
                .get(&event_type)
                .map(|topic| topic.iter().map(|s| (s.business_activity.clone(), Arc::clone(&s.handler))).collect())
                .unwrap_or_default()
        };
        if targets.is_empty() {
            return;
        }
        let payload = event.to_payload();
        for (business_activity, handler) in targets {
            let ctx = Arc::new(self.build_context(&event_type, &business_activity));
            ctx.bind_force("event", Value::Mapping(payload.clone()));
            for (key, value) in &payload {
                ctx.bind_force(&format!("event:{key}"), value.clone());
            }
            self.scheduler.dispatch(move || handler(ctx));
        }
    }

    fn build_context(&self, event_type: &str, business_activity: &str) -> ExecutionContext {
        let publisher: Arc<dyn EventPublisher> =
            self.self_ref.read().upgrade().map(|bus| bus as Arc<dyn EventPublisher>).unwrap_or_else(|| Arc::new(NullPublisher));
        let ctx = ExecutionContext::new(
            format!("on:{event_type}"),
            business_activity.to_string(),
            Arc::clone(&self.published),
            publisher,
            self.schema_registry.clone(),
        );
        let ctx = match &self.repositories {
            Some(repositories) => ctx.with_repositories(Arc::clone(repositories)),
            None => ctx,
        };
        let ctx = match &*self.services.read() {
            Some(services) => ctx.with_services(Arc::clone(services)),
            None => ctx,
        };
        // This delivery's handler runs on a thread the scheduler holds a
        // gate slot for (§4.5); wire that same gate in so blocking actions
        // (Fetch) and nested handler chains can yield it instead of
        // starving every other dispatched delivery.
        ctx.with_yielder(Arc::clone(self.scheduler.gate()) as Arc<dyn aro_core::Yielder>)
    }
}

impl EventPublisher for EventBus {
    fn publish(&self, event: Event) {
        EventBus::publish(self, event)
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
