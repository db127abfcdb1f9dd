// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup/shutdown sequencing and health introspection (`SPEC_FULL.md`
//! §11): the acquire → run → on-signal stop-accepting → bounded drain →
//! teardown → exit shape, mirrored from the teacher's
//! `crates/daemon/src/lifecycle/startup.rs` and `listener/query_status.rs`.
//!
//! `aro-services::NativeServiceManager::keepalive` already installs the
//! SIGINT/SIGTERM `signal_hook` flags and parks the calling thread (§4.3
//! Keepalive) — there is no separate host-level signal module here.
//! `aro-host`'s own contribution is what happens *after* the feature set's
//! `Keepalive` statement returns: poll `shutdown_requested`, stop whichever
//! services are running, and drain in-flight event deliveries, all bounded
//! by `RuntimeConfig::drain_timeout`.

use std::time::{Duration, Instant};

use aro_core::ServiceManager;

use crate::runtime::Runtime;

/// A point-in-time summary of a running [`Runtime`] (§11 "Health/status
/// introspection"), grounded on the teacher's `handle_status_overview`
/// shape without its job/agent/queue specifics — there's no equivalent
/// domain state here, just uptime and what's currently listening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSnapshot {
    pub uptime: Duration,
    pub shutdown_requested: bool,
    pub http_port: u16,
    pub ws_path: String,
}

impl Runtime {
    /// Build a [`RuntimeSnapshot`] of this runtime's current state.
    pub fn snapshot(&self) -> RuntimeSnapshot {
        RuntimeSnapshot {
            uptime: self.uptime(),
            shutdown_requested: self.services.shutdown_requested(),
            http_port: self.config.http_port,
            ws_path: self.config.ws_path.clone(),
        }
    }
}

/// What [`shutdown`] actually did, for logging/introspection by an
/// embedding host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    pub http_server_stopped: bool,
    pub socket_server_stopped: bool,
    pub file_monitor_stopped: bool,
    /// `true` iff every in-flight event delivery finished before
    /// `drain_timeout` elapsed (§5 "up to 10s drain").
    pub drained_cleanly: bool,
    pub elapsed: Duration,
}

/// Run the teardown sequence (§11, §5 shutdown flow): stop every native
/// service that's running, then drain the event bus's scheduler, bounded by
/// `runtime.config.drain_timeout`. Idempotent in the sense that stopping an
/// already-stopped service is simply reported as not-stopped rather than
/// treated as an error — a caller driving this from a signal handler has no
/// way to know in advance which services this particular feature set
/// started.
pub fn shutdown(runtime: &Runtime) -> ShutdownReport {
    let started = Instant::now();

    runtime.bus.scheduler().stop_accepting();

    let http_server_stopped = runtime.services.stop("http-server").is_ok();
    let socket_server_stopped = runtime.services.stop("socket-server").is_ok();
    let file_monitor_stopped = runtime.services.stop("file-monitor").is_ok();

    let drained_cleanly = runtime.bus.scheduler().drain(runtime.config.drain_timeout);

    ShutdownReport { http_server_stopped, socket_server_stopped, file_monitor_stopped, drained_cleanly, elapsed: started.elapsed() }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
