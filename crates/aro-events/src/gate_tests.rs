// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::*;

#[test]
fn acquire_and_drop_round_trips_in_use_count() {
    let gate = ConcurrencyGate::new(2);
    assert_eq!(gate.in_use(), 0);
    let permit = gate.acquire();
    assert_eq!(gate.in_use(), 1);
    drop(permit);
    assert_eq!(gate.in_use(), 0);
}

#[test]
fn blocks_past_capacity_until_a_slot_frees() {
    let gate = Arc::new(ConcurrencyGate::new(1));
    let first = gate.acquire();
    let gate2 = Arc::clone(&gate);
    let released = Arc::new(AtomicUsize::new(0));
    let released2 = Arc::clone(&released);
    let handle = std::thread::spawn(move || {
        let _second = gate2.acquire();
        released2.store(1, Ordering::SeqCst);
    });
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(released.load(Ordering::SeqCst), 0, "second acquire must block while capacity is exhausted");
    drop(first);
    handle.join().expect("spawned thread panicked");
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn yield_while_frees_the_slot_for_the_duration_of_the_closure() {
    let gate = Arc::new(ConcurrencyGate::new(1));
    let permit = gate.acquire();
    assert_eq!(gate.in_use(), 1);
    let gate2 = Arc::clone(&gate);
    let observed_during_yield = permit.yield_while(|| gate2.in_use());
    assert_eq!(observed_during_yield, 0, "slot must be released while the closure runs");
    assert_eq!(gate.in_use(), 1, "slot must be reacquired once the closure returns");
}

#[test]
fn default_capacity_is_four_times_logical_cpus() {
    assert_eq!(default_capacity(), 4 * num_cpus::get().max(1));
}

#[test]
fn concurrency_gate_as_a_yielder_frees_and_reacquires_a_slot() {
    use aro_core::Yielder;

    let gate = Arc::new(ConcurrencyGate::new(1));
    let _permit = gate.acquire();
    assert_eq!(gate.in_use(), 1);

    let gate2 = Arc::clone(&gate);
    let mut observed_during_yield = None;
    gate.yield_while(&mut || observed_during_yield = Some(gate2.in_use()));

    assert_eq!(observed_during_yield, Some(0), "slot must be released while the closure runs");
    assert_eq!(gate.in_use(), 1, "slot must be reacquired once the closure returns");
}
