// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aro_core::{ErrorKind, ExecutionContext, Value};

use super::*;

#[test]
fn dispatch_runs_the_task_and_drain_waits_for_it() {
    let scheduler = Scheduler::new(4);
    let ran = Arc::new(AtomicUsize::new(0));
    let ran2 = Arc::clone(&ran);
    scheduler.dispatch(move || {
        std::thread::sleep(Duration::from_millis(20));
        ran2.store(1, Ordering::SeqCst);
    });
    assert!(scheduler.drain(Duration::from_secs(1)));
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[test]
fn drain_times_out_when_a_delivery_never_finishes() {
    let scheduler = Scheduler::new(4);
    scheduler.dispatch(|| std::thread::sleep(Duration::from_secs(5)));
    assert!(!scheduler.drain(Duration::from_millis(50)));
}

#[test]
fn stop_accepting_drops_new_deliveries() {
    let scheduler = Scheduler::new(4);
    scheduler.stop_accepting();
    let ran = Arc::new(AtomicUsize::new(0));
    let ran2 = Arc::clone(&ran);
    scheduler.dispatch(move || {
        ran2.store(1, Ordering::SeqCst);
    });
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(ran.load(Ordering::SeqCst), 0);
}

#[test]
fn parallel_for_each_runs_every_item_and_binds_item_and_index() {
    let scheduler = Scheduler::new(8);
    let parent = Arc::new(ExecutionContext::standalone("for-each", "boot"));
    let items = vec![Value::Int(10), Value::Int(20), Value::Int(30)];
    let outcome = scheduler.parallel_for_each(&parent, items, "item", Some("index"), 2, &|ctx| {
        let item = ctx.resolve("item").unwrap_or(Value::Null);
        let index = ctx.resolve("index").unwrap_or(Value::Null);
        Value::Sequence(vec![item, index])
    });
    assert_eq!(outcome.results.len(), 3);
    assert!(outcome.first_error.is_none());
    for (idx, result) in outcome.results.iter().enumerate() {
        let seq = result.as_sequence().expect("each result should be a sequence");
        assert_eq!(seq[1].as_int(), Some(idx as i64));
    }
}

#[test]
fn parallel_for_each_runs_every_iteration_even_after_a_sibling_fails() {
    let scheduler = Scheduler::new(8);
    let parent = Arc::new(ExecutionContext::standalone("for-each", "boot"));
    let items = vec![Value::Int(1), Value::Int(2), Value::Int(3)];
    let outcome = scheduler.parallel_for_each(&parent, items, "item", None, 3, &|ctx| {
        let item = ctx.resolve("item").and_then(|v| v.as_int()).unwrap_or(0);
        if item == 2 {
            ctx.set_execution_error(ErrorKind::ComputationError, "boom");
            return Value::Null;
        }
        Value::Int(item * 10)
    });
    assert_eq!(outcome.results.len(), 3);
    assert!(outcome.first_error.is_some());
    assert_eq!(outcome.results[0], Value::Int(10));
    assert_eq!(outcome.results[1], Value::Null);
    assert_eq!(outcome.results[2], Value::Int(30));
}
