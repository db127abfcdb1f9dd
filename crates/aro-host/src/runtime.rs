// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`Runtime`]: the native-Rust counterpart to `aro-abi`'s `RuntimeHandle`
//! (§9 — siblings, not a chain: a compiled ARO binary links one or the
//! other, never both). Assembled the same way: construct the event bus
//! first with no service manager attached, construct the service manager
//! with a clone of the bus as its `EventPublisher`, then back-fill the
//! bus's service reference via `EventBus::set_services` — breaking the
//! otherwise-circular `Arc` dependency between the two (grounded on
//! `aro-abi::runtime::RuntimeHandle::new`, itself grounded on the weak-self
//! pattern documented in `aro-services::manager`).
//!
//! Unlike `RuntimeHandle`, `Runtime` carries no OpenAPI-backed schema
//! registry of its own: `aro-abi`'s `EmbeddedSchemaRegistry` exists because
//! a compiled C caller has no other way to install one at `runtime_init`
//! time, whereas an embedding Rust host can construct and pass its own
//! `Arc<dyn SchemaRegistry>` (or none at all) directly.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use aro_core::{EventPublisher, ExecutionContext, PublishedBindings, RepositoryRegistry, SchemaRegistry, ServiceManager};
use aro_dispatch::VerbTable;
use aro_events::{EventBus, Scheduler};
use aro_services::{NativeServiceManager, RouteTable};

use crate::config::RuntimeConfig;

/// Everything a running ARO feature set needs, reached through
/// `Arc<Runtime>` rather than a C pointer (§9).
pub struct Runtime {
    pub config: RuntimeConfig,
    pub verbs: VerbTable,
    pub published: Arc<PublishedBindings>,
    pub repositories: Arc<RepositoryRegistry>,
    pub bus: Arc<EventBus>,
    pub services: Arc<NativeServiceManager>,
    /// Installed by [`Runtime::install_parameters`], read back by `Extract
    /// ... from parameters: ...` (§6 "Environment & args").
    pub parameters: RwLock<HashMap<String, String>>,
    schema_registry: Option<Arc<dyn SchemaRegistry>>,
    started_at: Instant,
}

impl Runtime {
    /// Assemble a runtime with no schema registry attached.
    pub fn new(config: RuntimeConfig) -> Arc<Self> {
        Self::with_schema_registry(config, None)
    }

    /// Assemble a runtime, attaching `schema_registry` to both the event
    /// bus (for `Validate`'s use from handler contexts) and the service
    /// manager (for §4.6 step 7b's response content-type lookup).
    pub fn with_schema_registry(config: RuntimeConfig, schema_registry: Option<Arc<dyn SchemaRegistry>>) -> Arc<Self> {
        let published = Arc::new(PublishedBindings::new());
        let repositories = Arc::new(RepositoryRegistry::new());
        let capacity = num_cpus::get().max(1) * config.concurrency_multiplier;
        let scheduler = Arc::new(Scheduler::new(capacity));
        let bus = EventBus::new(scheduler, Arc::clone(&published), schema_registry.clone(), Some(Arc::clone(&repositories)), None);
        let services = NativeServiceManager::new(
            RouteTable::new(),
            HashMap::new(),
            config.ws_path.clone(),
            Arc::clone(&published),
            Arc::clone(&bus) as Arc<dyn EventPublisher>,
            schema_registry.clone(),
            Some(Arc::clone(&repositories)),
        );
        bus.set_services(Arc::clone(&services) as Arc<dyn ServiceManager>);

        Arc::new(Self {
            config,
            verbs: aro_dispatch::standard_verb_table(),
            published,
            repositories,
            bus,
            services,
            parameters: RwLock::new(HashMap::new()),
            schema_registry,
            started_at: Instant::now(),
        })
    }

    /// Build a fresh top-level execution context (§3 Lifecycle (a)),
    /// carrying this runtime's published bindings, event bus, repository
    /// registry, and service manager.
    pub fn new_context(self: &Arc<Self>, feature_set_name: impl Into<String>, business_activity: impl Into<String>) -> Arc<ExecutionContext> {
        let ctx = ExecutionContext::new(
            feature_set_name,
            business_activity,
            Arc::clone(&self.published),
            Arc::clone(&self.bus) as Arc<dyn EventPublisher>,
            self.schema_registry.clone(),
        )
        .with_repositories(Arc::clone(&self.repositories))
        .with_services(Arc::clone(&self.services) as Arc<dyn ServiceManager>);
        Arc::new(ctx)
    }

    /// Install `args` as named parameters `arg0`, `arg1`, ... (§6
    /// `parse_arguments`, mirrored here for native embedding callers that
    /// hand in `std::env::args()` directly rather than a C `argv`).
    pub fn install_parameters(&self, args: impl IntoIterator<Item = String>) {
        let mut parameters = self.parameters.write();
        for (index, arg) in args.into_iter().enumerate() {
            parameters.insert(format!("arg{index}"), arg);
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
