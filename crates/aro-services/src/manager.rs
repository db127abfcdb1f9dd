// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `NativeServiceManager`: the concrete [`aro_core::ServiceManager`] backing
//! `Start`/`Stop`/`Keepalive` (§4.3), owning the HTTP server, TCP socket
//! server, and file monitors it starts.
//!
//! Uses the same weak-self pattern as `aro-events::EventBus` (§9 "Cyclic
//! references to services from contexts"): a context created by the HTTP
//! server needs to hold a `services` handle back to this manager, which
//! would otherwise be an `Arc` cycle (manager owns the HTTP server, the HTTP
//! server's dispatch state holds the manager).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{info, warn};

use aro_core::{
    EventPublisher, ExecutionContext, OpaqueHandle, PublishedBindings, RepositoryRegistry, SchemaRegistry,
    ServiceManager, Value,
};

use crate::file_monitor::FileMonitor;
use crate::http::{HttpDispatch, HttpServer, RequestHandler};
use crate::route::RouteTable;
use crate::tcp::TcpServer;

const DEFAULT_HTTP_PORT: u16 = 8080;

/// Everything the route table and handler resolution need, gathered once at
/// startup before any `Start` statement runs (§5 "written at startup only").
pub struct NativeServiceManager {
    /// Registration phase runs from construction until the first
    /// `http-server` `Start` (§5: routes are "written at startup only,
    /// thereafter read-only" — here "startup" is the window before the
    /// table is snapshotted into a running server's [`HttpDispatch`]).
    routes: RwLock<RouteTable>,
    handlers: RwLock<HashMap<String, RequestHandler>>,
    ws_path: String,
    published: Arc<PublishedBindings>,
    event_publisher: Arc<dyn EventPublisher>,
    schema_registry: Option<Arc<dyn SchemaRegistry>>,
    repositories: Option<Arc<RepositoryRegistry>>,
    self_ref: RwLock<Weak<NativeServiceManager>>,

    http: Mutex<Option<HttpServer>>,
    socket: Mutex<Option<TcpServer>>,
    file_monitors: Mutex<HashMap<PathBuf, FileMonitor>>,

    shutdown_signal: Arc<AtomicBool>,
    signal_handlers_installed: AtomicBool,
}

impl NativeServiceManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        routes: RouteTable,
        handlers: HashMap<String, RequestHandler>,
        ws_path: impl Into<String>,
        published: Arc<PublishedBindings>,
        event_publisher: Arc<dyn EventPublisher>,
        schema_registry: Option<Arc<dyn SchemaRegistry>>,
        repositories: Option<Arc<RepositoryRegistry>>,
    ) -> Arc<Self> {
        let manager = Arc::new(Self {
            routes: RwLock::new(routes),
            handlers: RwLock::new(handlers),
            ws_path: ws_path.into(),
            published,
            event_publisher,
            schema_registry,
            repositories,
            self_ref: RwLock::new(Weak::new()),
            http: Mutex::new(None),
            socket: Mutex::new(None),
            file_monitors: Mutex::new(HashMap::new()),
            shutdown_signal: Arc::new(AtomicBool::new(false)),
            signal_handlers_installed: AtomicBool::new(false),
        });
        *manager.self_ref.write() = Arc::downgrade(&manager);
        manager
    }

    /// Register one OpenAPI-derived route (§3 Route Entry, §6
    /// `http_register_route`). Only meaningful before `http-server` starts.
    pub fn register_route(&self, route: crate::route::RouteEntry) {
        self.routes.write().register(route);
    }

    /// Install the compiled entry point for `operation_id` (§6
    /// `runtime_register_handler` equivalent for HTTP operations). Only
    /// meaningful before `http-server` starts.
    pub fn register_handler(&self, operation_id: impl Into<String>, handler: RequestHandler) {
        self.handlers.write().insert(operation_id.into(), handler);
    }

    /// True once a SIGINT/SIGTERM has been observed by `keepalive` (§4.3,
    /// §5 shutdown flow). `aro-host` polls this after the feature set that
    /// called `Keepalive` returns, to drive the drain/teardown sequence.
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_signal.load(Ordering::SeqCst)
    }

    fn self_as_service_manager(&self) -> Option<Arc<dyn ServiceManager>> {
        self.self_ref.read().upgrade().map(|m| m as Arc<dyn ServiceManager>)
    }

    /// Send a payload to one connected TCP client (§6 `native_socket_send`).
    pub fn socket_send(&self, connection: &OpaqueHandle, payload: &[u8]) -> Result<(), String> {
        match self.socket.lock().as_ref() {
            Some(server) => server.send(connection, payload),
            None => Err("socket-server is not running".to_string()),
        }
    }

    /// Send a payload to every connected TCP client but `exclude` (§6
    /// `native_socket_broadcast`). A no-op when the socket server isn't
    /// running, matching `HttpServer::broadcast`'s best-effort shape.
    pub fn socket_broadcast(&self, payload: &[u8], exclude: Option<&OpaqueHandle>) {
        if let Some(server) = self.socket.lock().as_ref() {
            server.broadcast(payload, exclude);
        }
    }

    fn port_from_config(config: &Value, default: u16) -> u16 {
        config
            .as_mapping()
            .and_then(|m| m.get("port"))
            .and_then(Value::as_int)
            .and_then(|p| u16::try_from(p).ok())
            .unwrap_or(default)
    }
}

impl ServiceManager for NativeServiceManager {
    fn start(&self, service: &str, config: &Value, _ctx: &ExecutionContext) -> Result<Value, String> {
        match service {
            "http-server" => {
                let port = Self::port_from_config(config, DEFAULT_HTTP_PORT);
                let dispatch = Arc::new(HttpDispatch {
                    routes: self.routes.read().clone(),
                    handlers: self.handlers.read().clone(),
                    published: Arc::clone(&self.published),
                    event_publisher: Arc::clone(&self.event_publisher),
                    schema_registry: self.schema_registry.clone(),
                    repositories: self.repositories.clone(),
                    services: self.self_as_service_manager(),
                    ws_path: self.ws_path.clone(),
                });
                let server = HttpServer::start(port, dispatch).map_err(|e| e.to_string())?;
                let bound_port = server.local_addr().port();
                *self.http.lock() = Some(server);
                info!(port = bound_port, "http-server started");
                let mut data = aro_core::ValueMap::new();
                data.insert("port".into(), Value::Int(bound_port as i64));
                Ok(Value::Mapping(data))
            }
            "socket-server" => {
                let port = Self::port_from_config(config, 0);
                let name = config
                    .as_mapping()
                    .and_then(|m| m.get("name"))
                    .and_then(Value::as_str)
                    .unwrap_or("socket-server")
                    .to_string();
                let server = TcpServer::start(name, port, Arc::clone(&self.event_publisher)).map_err(|e| e.to_string())?;
                let bound_port = server.local_addr().port();
                *self.socket.lock() = Some(server);
                info!(port = bound_port, "socket-server started");
                let mut data = aro_core::ValueMap::new();
                data.insert("port".into(), Value::Int(bound_port as i64));
                Ok(Value::Mapping(data))
            }
            "file-monitor" => {
                let path = config
                    .as_mapping()
                    .and_then(|m| m.get("path"))
                    .and_then(Value::as_str)
                    .ok_or_else(|| "file-monitor requires a 'path'".to_string())?
                    .to_string();
                let monitor = FileMonitor::start(&path, Arc::clone(&self.event_publisher)).map_err(|e| e.to_string())?;
                let path_buf = monitor.path().to_path_buf();
                self.file_monitors.lock().insert(path_buf, monitor);
                info!(path = %path, "file-monitor started");
                let mut data = aro_core::ValueMap::new();
                data.insert("path".into(), Value::string(path));
                Ok(Value::Mapping(data))
            }
            other => Err(format!("unknown service '{other}'")),
        }
    }

    fn stop(&self, service: &str) -> Result<(), String> {
        match service {
            "http-server" => match self.http.lock().take() {
                Some(mut server) => {
                    server.stop();
                    Ok(())
                }
                None => Err("http-server is not running".to_string()),
            },
            "socket-server" => match self.socket.lock().take() {
                Some(mut server) => {
                    server.stop();
                    Ok(())
                }
                None => Err("socket-server is not running".to_string()),
            },
            "file-monitor" => {
                let mut monitors = self.file_monitors.lock();
                if monitors.is_empty() {
                    return Err("file-monitor is not running".to_string());
                }
                for (_, monitor) in monitors.drain() {
                    monitor.stop();
                }
                Ok(())
            }
            other => Err(format!("unknown service '{other}'")),
        }
    }

    fn keepalive(&self, ctx: &ExecutionContext) {
        if !self.signal_handlers_installed.swap(true, Ordering::SeqCst) {
            if let Err(err) = signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&self.shutdown_signal)) {
                warn!(error = %err, "failed to install SIGINT handler");
            }
            if let Err(err) = signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&self.shutdown_signal)) {
                warn!(error = %err, "failed to install SIGTERM handler");
            }
        }
        ctx.publish_event(aro_core::Event::WaitStateEntered);
        ctx.enter_wait_state();
        while !self.shutdown_signal.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
