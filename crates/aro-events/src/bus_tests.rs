// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aro_core::{Event, PublishedBindings, RepositoryChangeKind, Value};

use super::*;

fn new_bus() -> Arc<EventBus> {
    EventBus::new(Arc::new(crate::Scheduler::new(8)), Arc::new(PublishedBindings::new()), None, None, None)
}

#[test]
fn publish_delivers_to_every_subscriber_of_the_topic() {
    let bus = new_bus();
    let count = Arc::new(AtomicUsize::new(0));
    for i in 0..3 {
        let count = Arc::clone(&count);
        bus.subscribe(format!("sub-{i}"), "Widget", "boot", Arc::new(move |_ctx| {
            count.fetch_add(1, Ordering::SeqCst);
        }));
    }
    bus.publish(Event::Custom { event_type: "Widget".to_string(), payload: Value::Null });
    assert!(bus.scheduler().drain(Duration::from_secs(1)));
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[test]
fn subscribe_is_idempotent_per_subscriber_and_event_type() {
    let bus = new_bus();
    let count = Arc::new(AtomicUsize::new(0));
    for _ in 0..2 {
        let count = Arc::clone(&count);
        bus.subscribe("sub-1", "Widget", "boot", Arc::new(move |_ctx| {
            count.fetch_add(1, Ordering::SeqCst);
        }));
    }
    bus.publish(Event::Custom { event_type: "Widget".to_string(), payload: Value::Null });
    assert!(bus.scheduler().drain(Duration::from_secs(1)));
    assert_eq!(count.load(Ordering::SeqCst), 1, "re-subscribing the same id must not duplicate the handler");
}

#[test]
fn handler_context_binds_event_and_projected_keys() {
    let bus = new_bus();
    let seen_value = Arc::new(parking_lot::Mutex::new(None));
    let seen_value2 = Arc::clone(&seen_value);
    bus.subscribe("sub", "Greeting", "boot", Arc::new(move |ctx| {
        *seen_value2.lock() = ctx.resolve("event:message");
    }));
    let mut payload = aro_core::ValueMap::new();
    payload.insert("message".into(), Value::string("hi"));
    bus.publish(Event::Custom { event_type: "Greeting".to_string(), payload: Value::Mapping(payload) });
    assert!(bus.scheduler().drain(Duration::from_secs(1)));
    assert_eq!(*seen_value.lock(), Some(Value::string("hi")));
}

#[test]
fn publish_with_no_subscribers_is_a_no_op() {
    let bus = new_bus();
    bus.publish(Event::WaitStateEntered);
    assert!(bus.scheduler().drain(Duration::from_secs(1)));
}

#[test]
fn observe_repository_filters_by_name_and_guard() {
    let bus = new_bus();
    let seen = Arc::new(AtomicUsize::new(0));
    let seen2 = Arc::clone(&seen);
    let guard = serde_json::json!({"$binary": {"op": "==", "left": {"$var": "event:change", "$specs": []}, "right": {"$lit": "added"}}});
    bus.observe_repository("sub", "todo-repository", "boot", Some(guard), Arc::new(move |_ctx| {
        seen2.fetch_add(1, Ordering::SeqCst);
    }));

    bus.publish(Event::RepositoryChanged {
        business_activity: "boot".to_string(),
        name: "other-repository".to_string(),
        change: RepositoryChangeKind::Added,
    });
    bus.publish(Event::RepositoryChanged {
        business_activity: "boot".to_string(),
        name: "todo-repository".to_string(),
        change: RepositoryChangeKind::Deleted,
    });
    bus.publish(Event::RepositoryChanged {
        business_activity: "boot".to_string(),
        name: "todo-repository".to_string(),
        change: RepositoryChangeKind::Added,
    });
    assert!(bus.scheduler().drain(Duration::from_secs(1)));
    assert_eq!(seen.load(Ordering::SeqCst), 1, "only the matching-name, matching-guard delivery should fire");
}
