// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The global counting semaphore of §4.5: bounds the number of *active*
//! compiled executions to `4 * logical-CPU-count`, and the smaller per-loop
//! limiter that bounds *in-flight* parallel-loop iterations.

use parking_lot::{Condvar, Mutex};

/// Default capacity per §4.5: `4 * logical-CPU-count`.
pub fn default_capacity() -> usize {
    4 * num_cpus::get().max(1)
}

/// A counting semaphore whose permits can be released and reacquired mid-
/// hold — the mechanism §4.5 "Yielding while blocked" requires so a thread
/// parked on downstream I/O doesn't starve the gate for everyone else.
pub struct ConcurrencyGate {
    capacity: usize,
    held: Mutex<usize>,
    cv: Condvar,
}

impl ConcurrencyGate {
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), held: Mutex::new(0), cv: Condvar::new() }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current count of held slots. For introspection/tests only.
    pub fn in_use(&self) -> usize {
        *self.held.lock()
    }

    /// Block until a slot is free, then hold it until the returned
    /// [`GatePermit`] drops.
    pub fn acquire(&self) -> GatePermit<'_> {
        let mut held = self.held.lock();
        while *held >= self.capacity {
            self.cv.wait(&mut held);
        }
        *held += 1;
        GatePermit { gate: self }
    }

    fn release(&self) {
        let mut held = self.held.lock();
        *held = held.saturating_sub(1);
        self.cv.notify_one();
    }
}

/// A held slot in a [`ConcurrencyGate`]. Dropping it releases the slot.
pub struct GatePermit<'a> {
    gate: &'a ConcurrencyGate,
}

impl GatePermit<'_> {
    /// Release this slot for the duration of `blocking`, then reacquire one
    /// before returning (§4.5 "Yielding while blocked"). Call this around
    /// any blocking wait on downstream work (a nested `Fetch`, a child
    /// handler chain) so the gate doesn't deadlock under recursive fan-out.
    pub fn yield_while<T>(&self, blocking: impl FnOnce() -> T) -> T {
        self.gate.release();
        let result = blocking();
        let mut held = self.gate.held.lock();
        while *held >= self.gate.capacity {
            self.gate.cv.wait(&mut held);
        }
        *held += 1;
        result
    }
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

impl aro_core::Yielder for ConcurrencyGate {
    /// Same release-then-reacquire sequence as [`GatePermit::yield_while`],
    /// reachable from a context without borrowing the permit itself — the
    /// permit dispatch holds for `task()`'s whole duration lives on the
    /// scheduler's thread, not on the context `fetch`/handler code runs
    /// against.
    fn yield_while(&self, blocking: &mut dyn FnMut()) {
        self.release();
        blocking();
        let mut held = self.held.lock();
        while *held >= self.capacity {
            self.cv.wait(&mut held);
        }
        *held += 1;
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
