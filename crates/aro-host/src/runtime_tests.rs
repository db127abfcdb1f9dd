// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_assembles_a_runtime_with_the_standard_verb_table() {
    let runtime = Runtime::new(RuntimeConfig::default());
    assert!(runtime.verbs.role_of("set").is_some());
    assert!(runtime.verbs.role_of("not-a-verb").is_none());
}

#[test]
fn new_context_carries_repositories_and_services_through() {
    let runtime = Runtime::new(RuntimeConfig::default());
    let ctx = runtime.new_context("Greet", "orders");
    assert!(ctx.repositories().is_some());
    assert!(ctx.services().is_some());
    assert_eq!(ctx.business_activity, "orders");
}

#[test]
fn install_parameters_are_readable_back() {
    let runtime = Runtime::new(RuntimeConfig::default());
    runtime.install_parameters(["--port=9090".to_string(), "verbose".to_string()]);
    let parameters = runtime.parameters.read();
    assert_eq!(parameters.get("arg0").map(String::as_str), Some("--port=9090"));
    assert_eq!(parameters.get("arg1").map(String::as_str), Some("verbose"));
}

#[test]
fn uptime_is_nonzero_after_construction() {
    let runtime = Runtime::new(RuntimeConfig::default());
    std::thread::sleep(std::time::Duration::from_millis(5));
    assert!(runtime.uptime().as_millis() > 0);
}
