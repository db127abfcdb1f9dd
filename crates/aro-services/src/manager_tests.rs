// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use aro_core::{ExecutionContext, NullPublisher, PublishedBindings, ResponseStatus};

use super::*;
use crate::route::RouteEntry;

fn new_manager(routes: RouteTable, handlers: HashMap<String, RequestHandler>) -> Arc<NativeServiceManager> {
    NativeServiceManager::new(
        routes,
        handlers,
        "/ws",
        Arc::new(PublishedBindings::new()),
        Arc::new(NullPublisher),
        None,
        None,
    )
}

#[test]
fn start_http_server_with_port_zero_binds_an_ephemeral_port_and_serves_requests() {
    let mut routes = RouteTable::new();
    routes.register(RouteEntry::new("GET", "/ping", "ping"));
    let mut handlers: HashMap<String, RequestHandler> = HashMap::new();
    handlers.insert(
        "ping".to_string(),
        Arc::new(|ctx: &Arc<ExecutionContext>| {
            ctx.set_response(ResponseStatus::Ok, aro_core::ValueMap::new());
        }),
    );
    let manager = new_manager(routes, handlers);

    let ctx = ExecutionContext::standalone("Start", "boot");
    let mut config = aro_core::ValueMap::new();
    config.insert("port".into(), Value::Int(0));
    let outcome = manager.start("http-server", &Value::Mapping(config), &ctx).expect("start should succeed");
    let port = outcome.as_mapping().and_then(|m| m.get("port")).and_then(Value::as_int).expect("port should be bound");

    let mut stream = TcpStream::connect(("127.0.0.1", port as u16)).expect("client should connect");
    stream.write_all(b"GET /ping HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n").expect("write request");
    stream.set_read_timeout(Some(Duration::from_secs(2))).expect("set timeout");
    let mut response = Vec::new();
    stream.read_to_end(&mut response).expect("read response");
    assert!(String::from_utf8_lossy(&response).starts_with("HTTP/1.1 200"));

    manager.stop("http-server").expect("stop should succeed");
}

#[test]
fn stopping_a_service_that_was_never_started_fails() {
    let manager = new_manager(RouteTable::new(), HashMap::new());
    assert!(manager.stop("http-server").is_err());
    assert!(manager.stop("socket-server").is_err());
    assert!(manager.stop("file-monitor").is_err());
}

#[test]
fn starting_an_unknown_service_fails() {
    let manager = new_manager(RouteTable::new(), HashMap::new());
    let ctx = ExecutionContext::standalone("Start", "boot");
    assert!(manager.start("carrier-pigeon", &Value::Null, &ctx).is_err());
}

#[test]
fn file_monitor_requires_a_path_in_its_config() {
    let manager = new_manager(RouteTable::new(), HashMap::new());
    let ctx = ExecutionContext::standalone("Start", "boot");
    assert!(manager.start("file-monitor", &Value::Null, &ctx).is_err());
}
