// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Native TCP socket server (§4.7): a raw-bytes counterpart to the
//! WebSocket frame loop. Each connection publishes `ClientConnected`,
//! `DataReceived` per inbound read, and `ClientDisconnected` on close; no
//! framing or parsing is imposed, unlike `http.rs`'s WebSocket layer.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use aro_core::{Event, EventPublisher, OpaqueHandle};

const READ_CHUNK: usize = 4096;

struct TcpConnection {
    stream: Mutex<TcpStream>,
}

pub struct TcpServer {
    shutdown: Arc<AtomicBool>,
    connections: Arc<RwLock<HashMap<u64, Arc<TcpConnection>>>>,
    accept_thread: Option<thread::JoinHandle<()>>,
    local_addr: std::net::SocketAddr,
    server_name: String,
}

impl TcpServer {
    pub fn start(server_name: impl Into<String>, port: u16, event_publisher: Arc<dyn EventPublisher>) -> std::io::Result<Self> {
        let server_name = server_name.into();
        let listener = TcpListener::bind(("0.0.0.0", port))?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let connections: Arc<RwLock<HashMap<u64, Arc<TcpConnection>>>> = Arc::new(RwLock::new(HashMap::new()));
        let next_id = Arc::new(AtomicU64::new(1));

        let accept_shutdown = Arc::clone(&shutdown);
        let accept_connections = Arc::clone(&connections);
        let accept_publisher = Arc::clone(&event_publisher);
        let accept_name = server_name.clone();
        let accept_thread = thread::Builder::new()
            .name("aro-tcp-accept".into())
            .spawn(move || {
                while !accept_shutdown.load(Ordering::SeqCst) {
                    match listener.accept() {
                        Ok((stream, addr)) => {
                            let registered_clone = match stream.try_clone() {
                                Ok(clone) => clone,
                                Err(err) => {
                                    warn!(error = %err, "failed to clone accepted tcp stream, dropping connection");
                                    continue;
                                }
                            };
                            let id = next_id.fetch_add(1, Ordering::SeqCst);
                            let conn = Arc::new(TcpConnection { stream: Mutex::new(registered_clone) });
                            accept_connections.write().insert(id, conn);
                            let handle = OpaqueHandle::new("tcp", id);
                            accept_publisher.publish(Event::ClientConnected {
                                server: accept_name.clone(),
                                connection: handle.clone(),
                                remote_address: addr.to_string(),
                            });

                            let connections = Arc::clone(&accept_connections);
                            let publisher = Arc::clone(&accept_publisher);
                            let name = accept_name.clone();
                            let worker_shutdown = Arc::clone(&accept_shutdown);
                            thread::spawn(move || {
                                run_connection(stream, id, addr.to_string(), &name, &publisher, &connections, &worker_shutdown);
                            });
                        }
                        Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                            thread::sleep(Duration::from_millis(50));
                        }
                        Err(e) => {
                            warn!(error = %e, "tcp accept failed");
                            thread::sleep(Duration::from_millis(50));
                        }
                    }
                }
            })?;

        Ok(Self { shutdown, connections, accept_thread: Some(accept_thread), local_addr, server_name })
    }

    pub fn local_addr(&self) -> std::net::SocketAddr {
        self.local_addr
    }

    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.accept_thread.take() {
            let _ = handle.join();
        }
    }

    pub fn send(&self, connection: &OpaqueHandle, payload: &[u8]) -> Result<(), String> {
        let conn = {
            let guard = self.connections.read();
            guard.get(&connection.id).cloned()
        };
        let conn = conn.ok_or_else(|| format!("no open connection {}", connection.id))?;
        conn.stream.lock().write_all(payload).map_err(|e| e.to_string())
    }

    pub fn broadcast(&self, payload: &[u8], exclude: Option<&OpaqueHandle>) {
        let targets: Vec<(u64, Arc<TcpConnection>)> = {
            let guard = self.connections.read();
            guard
                .iter()
                .filter(|(id, _)| exclude.map(|h| h.id != **id).unwrap_or(true))
                .map(|(id, conn)| (*id, Arc::clone(conn)))
                .collect()
        };
        for (id, conn) in targets {
            if let Err(err) = conn.stream.lock().write_all(payload) {
                debug!(connection = id, error = %err, "tcp broadcast write failed");
            }
        }
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }
}

fn run_connection(
    mut stream: TcpStream,
    id: u64,
    remote_address: String,
    server_name: &str,
    publisher: &Arc<dyn EventPublisher>,
    connections: &Arc<RwLock<HashMap<u64, Arc<TcpConnection>>>>,
    shutdown: &Arc<AtomicBool>,
) {
    let handle = OpaqueHandle::new("tcp", id);
    if let Err(err) = stream.set_read_timeout(Some(Duration::from_secs(1))) {
        debug!(error = %err, "failed to set tcp read timeout");
    }
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                publisher.publish(Event::DataReceived {
                    server: server_name.to_string(),
                    connection: handle.clone(),
                    remote_address: remote_address.clone(),
                    payload: chunk[..n].to_vec(),
                });
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock || e.kind() == std::io::ErrorKind::TimedOut => {
                continue;
            }
            Err(_) => break,
        }
    }
    connections.write().remove(&id);
    publisher.publish(Event::ClientDisconnected { server: server_name.to_string(), connection: handle });
}

#[cfg(test)]
#[path = "tcp_tests.rs"]
mod tests;
