// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OS-thread dispatch for event deliveries and parallel-loop iterations
//! (§4.5, §6 `parallel_for_each_execute`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use aro_core::{ExecutionContext, ExecutionError, Value};

use crate::gate::ConcurrencyGate;

/// Dispatches event deliveries onto OS threads behind the global
/// [`ConcurrencyGate`], and tracks how many are currently in flight so
/// shutdown can drain them (§5 "Shutdown flow").
pub struct Scheduler {
    gate: Arc<ConcurrencyGate>,
    in_flight: Arc<(Mutex<usize>, Condvar)>,
    accepting: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(gate_capacity: usize) -> Self {
        Self {
            gate: Arc::new(ConcurrencyGate::new(gate_capacity)),
            in_flight: Arc::new((Mutex::new(0), Condvar::new())),
            accepting: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn gate(&self) -> &Arc<ConcurrencyGate> {
        &self.gate
    }

    /// Stop accepting new deliveries (§5 shutdown flow step 1). Already
    /// in-flight deliveries are unaffected; see [`Scheduler::drain`].
    pub fn stop_accepting(&self) {
        self.accepting.store(false, Ordering::SeqCst);
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    /// Enqueue `task` for execution on a fresh OS thread once a gate slot
    /// is free. Non-blocking: returns immediately, matching §4.5 "Publish
    /// is non-blocking". Dropped silently (with a warning) once shutdown
    /// has called [`Scheduler::stop_accepting`].
    pub fn dispatch(&self, task: impl FnOnce() + Send + 'static) {
        if !self.is_accepting() {
            tracing::warn!(target: "aro", "dropping delivery: scheduler is no longer accepting new work");
            return;
        }

        let gate = Arc::clone(&self.gate);
        let in_flight = Arc::clone(&self.in_flight);
        {
            let mut count = in_flight.0.lock();
            *count += 1;
        }

        let spawned = thread::Builder::new().name("aro-handler".to_string()).spawn(move || {
            let _permit = gate.acquire();
            task();
            let mut count = in_flight.0.lock();
            *count = count.saturating_sub(1);
            in_flight.1.notify_all();
        });

        if spawned.is_err() {
            let mut count = in_flight.0.lock();
            *count = count.saturating_sub(1);
            tracing::error!(target: "aro", "failed to spawn handler thread");
        }
    }

    /// Block until every dispatched delivery has finished, or `timeout`
    /// elapses first. Returns `true` iff the drain was clean (§5 "up to
    /// 10s drain for in-flight handlers").
    pub fn drain(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.in_flight.0.lock();
        while *count > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return *count == 0;
            }
            let result = self.in_flight.1.wait_for(&mut count, remaining);
            if result.timed_out() {
                return *count == 0;
            }
        }
        true
    }

    /// `parallel_for_each_execute` (§6): run `body` once per item of
    /// `items`, each against its own child context with `item_name` (and
    /// optionally `index_name`) bound, gated both by the global semaphore
    /// and by `local_concurrency` in-flight iterations of this loop (§4.5
    /// "A per-loop secondary limit").
    ///
    /// Resolves Open Question 4 as run-all-report-all: every iteration runs
    /// to completion regardless of a sibling's error; failed iterations
    /// contribute `Value::Null` to the result sequence, and the first error
    /// encountered (by completion order) is returned alongside it.
    pub fn parallel_for_each(
        &self,
        parent: &Arc<ExecutionContext>,
        items: Vec<Value>,
        item_name: &str,
        index_name: Option<&str>,
        local_concurrency: usize,
        body: &(dyn Fn(&ExecutionContext) -> Value + Sync),
    ) -> ParallelForEachOutcome {
        let local_gate = ConcurrencyGate::new(local_concurrency.max(1));
        let result_slots: Vec<Mutex<Value>> = items.iter().map(|_| Mutex::new(Value::Null)).collect();
        let error_slot: Mutex<Option<ExecutionError>> = Mutex::new(None);

        thread::scope(|scope| {
            for (idx, item) in items.into_iter().enumerate() {
                let child = parent.create_child(format!("{}[{idx}]", parent.feature_set_name));
                child.bind_force(item_name, item);
                if let Some(index_name) = index_name {
                    child.bind_force(index_name, Value::Int(idx as i64));
                }
                let gate = &self.gate;
                let local_gate = &local_gate;
                let result_slots = &result_slots;
                let error_slot = &error_slot;
                scope.spawn(move || {
                    let _local_permit = local_gate.acquire();
                    let _global_permit = gate.acquire();
                    let value = body(&child);
                    let contributed = if child.has_execution_error() { Value::Null } else { value };
                    *result_slots[idx].lock() = contributed;
                    if let Some(err) = child.execution_error() {
                        let mut guard = error_slot.lock();
                        if guard.is_none() {
                            *guard = Some(err);
                        }
                    }
                });
            }
        });

        ParallelForEachOutcome {
            results: result_slots.into_iter().map(Mutex::into_inner).collect(),
            first_error: error_slot.into_inner(),
        }
    }
}

/// Outcome of [`Scheduler::parallel_for_each`] (Open Question 4).
#[derive(Debug, Clone)]
pub struct ParallelForEachOutcome {
    pub results: Vec<Value>,
    pub first_error: Option<ExecutionError>,
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
