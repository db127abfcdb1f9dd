// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use aro_core::event::NullPublisher;
use aro_core::{ExecutionContext, Value};

use super::*;
use crate::descriptor::Preposition;

struct RecordingManager {
    started: AtomicBool,
    stopped: AtomicBool,
    kept_alive: AtomicBool,
}

impl aro_core::service::ServiceManager for RecordingManager {
    fn start(&self, service: &str, _config: &Value, _ctx: &ExecutionContext) -> Result<Value, String> {
        self.started.store(true, Ordering::SeqCst);
        Ok(Value::string(format!("{service}-handle")))
    }

    fn stop(&self, _service: &str) -> Result<(), String> {
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn keepalive(&self, ctx: &ExecutionContext) {
        self.kept_alive.store(true, Ordering::SeqCst);
        ctx.enter_wait_state();
    }
}

fn ctx_with(manager: Arc<RecordingManager>) -> ExecutionContext {
    ExecutionContext::new("F", "activity", Arc::new(aro_core::context::PublishedBindings::new()), Arc::new(NullPublisher), None)
        .with_services(manager)
}

#[test]
fn start_binds_the_returned_handle() {
    let manager = Arc::new(RecordingManager { started: AtomicBool::new(false), stopped: AtomicBool::new(false), kept_alive: AtomicBool::new(false) });
    let ctx = ctx_with(Arc::clone(&manager));
    let result = ResultDescriptor::simple("server");
    let object = ObjectDescriptor::new(Preposition::With, "http-server", vec![]);
    let outcome = start(&result, &object, &ctx);
    assert!(outcome.succeeded);
    assert!(manager.started.load(Ordering::SeqCst));
    assert_eq!(ctx.resolve("server"), Some(Value::string("http-server-handle")));
}

#[test]
fn stop_does_not_bind_a_result() {
    let manager = Arc::new(RecordingManager { started: AtomicBool::new(false), stopped: AtomicBool::new(false), kept_alive: AtomicBool::new(false) });
    let ctx = ctx_with(Arc::clone(&manager));
    let result = ResultDescriptor::simple("unused");
    let object = ObjectDescriptor::new(Preposition::With, "http-server", vec![]);
    let outcome = stop(&result, &object, &ctx);
    assert!(outcome.succeeded);
    assert!(manager.stopped.load(Ordering::SeqCst));
    assert_eq!(outcome.value, None);
}

#[test]
fn keepalive_parks_through_the_service_manager() {
    let manager = Arc::new(RecordingManager { started: AtomicBool::new(false), stopped: AtomicBool::new(false), kept_alive: AtomicBool::new(false) });
    let ctx = ctx_with(Arc::clone(&manager));
    let result = ResultDescriptor::simple("unused");
    let object = ObjectDescriptor::new(Preposition::With, "unused", vec![]);
    keepalive(&result, &object, &ctx);
    assert!(manager.kept_alive.load(Ordering::SeqCst));
    assert!(ctx.is_waiting());
}

#[test]
fn service_verbs_fail_when_no_manager_is_attached() {
    let ctx = ExecutionContext::standalone("F", "activity");
    let result = ResultDescriptor::simple("server");
    let object = ObjectDescriptor::new(Preposition::With, "http-server", vec![]);
    let outcome = start(&result, &object, &ctx);
    assert!(!outcome.succeeded);
}
