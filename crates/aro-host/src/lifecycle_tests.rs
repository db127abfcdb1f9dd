// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::RuntimeConfig;

#[test]
fn snapshot_reports_uptime_and_configured_ports() {
    let runtime = Runtime::new(RuntimeConfig::default());
    let snapshot = runtime.snapshot();
    assert!(!snapshot.shutdown_requested);
    assert_eq!(snapshot.http_port, 8080);
    assert_eq!(snapshot.ws_path, "/ws");
}

#[test]
fn shutdown_reports_no_services_stopped_when_none_were_running() {
    let runtime = Runtime::new(RuntimeConfig::default());
    let report = shutdown(&runtime);
    assert!(!report.http_server_stopped);
    assert!(!report.socket_server_stopped);
    assert!(!report.file_monitor_stopped);
    assert!(report.drained_cleanly);
}

#[test]
fn shutdown_stops_a_running_http_server_and_drains_cleanly() {
    let runtime = Runtime::new(RuntimeConfig::default());
    let ctx = runtime.new_context("Start", "orders");
    let config = aro_core::Value::Mapping({
        let mut m = aro_core::ValueMap::new();
        m.insert("port".into(), aro_core::Value::Int(0));
        m
    });
    runtime.services.start("http-server", &config, &ctx).unwrap();

    let report = shutdown(&runtime);
    assert!(report.http_server_stopped);
    assert!(report.drained_cleanly);
}
