// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Native service lifecycle abstraction (§4.3 Start/Stop/Listen/Watch/
//! Keepalive, §4.6-4.8, §5 "Service state (HTTP, Socket)").
//!
//! Kept trait-based for the same reason as [`crate::event::EventPublisher`]:
//! `aro-core` must not depend on the crate that runs sockets and file
//! watches, since that crate depends back on `aro-core`'s context and value
//! types.

use crate::context::ExecutionContext;
use crate::value::Value;

/// Instantiate and tear down the native services named in §4.3 (`http-
/// server`, `socket-server`, `file-monitor`, …). One implementation per
/// process, installed on every [`ExecutionContext`] it creates.
pub trait ServiceManager: Send + Sync {
    /// Start a named service. `config` carries whatever the `Start`
    /// statement's object expression resolved to (e.g. `{port: 8080}`).
    /// Returns a value to bind into the caller's result slot (e.g. a
    /// handle), or an already-rendered failure detail.
    fn start(&self, service: &str, config: &Value, ctx: &ExecutionContext) -> Result<Value, String>;

    /// Drain and tear down a named, running service (§4.3 Stop/Close).
    fn stop(&self, service: &str) -> Result<(), String>;

    /// Install SIGINT/SIGTERM handlers, publish `WaitStateEntered`, and
    /// block the calling thread until a shutdown signal arrives (§4.3
    /// Keepalive, §5 Suspension points).
    fn keepalive(&self, ctx: &ExecutionContext);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NullPublisher;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    struct RecordingManager {
        started: AtomicBool,
        stopped: AtomicBool,
    }

    impl ServiceManager for RecordingManager {
        fn start(&self, _service: &str, _config: &Value, _ctx: &ExecutionContext) -> Result<Value, String> {
            self.started.store(true, Ordering::SeqCst);
            Ok(Value::Bool(true))
        }

        fn stop(&self, _service: &str) -> Result<(), String> {
            self.stopped.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn keepalive(&self, ctx: &ExecutionContext) {
            ctx.enter_wait_state();
        }
    }

    #[test]
    fn service_manager_trait_object_is_callable_through_a_context() {
        let manager = Arc::new(RecordingManager { started: AtomicBool::new(false), stopped: AtomicBool::new(false) });
        let ctx = ExecutionContext::standalone("Start", "boot");
        let outcome = manager.start("http-server", &Value::Null, &ctx);
        assert!(outcome.is_ok());
        assert!(manager.started.load(Ordering::SeqCst));
        manager.keepalive(&ctx);
        assert!(ctx.is_waiting());
        let _ = NullPublisher;
    }
}
