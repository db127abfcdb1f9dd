// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! BSD-sockets HTTP server (§4.6): request parse, route match with path
//! parameters, OpenAPI-driven content-type selection, WebSocket upgrade.
//!
//! The request/response cycle is synchronous (§4.6 step 6: resolve the
//! handler, invoke it, marshal the response) — this is distinct from the
//! asynchronous event-bus delivery `aro-events` provides for `Emit`/
//! `Subscribe`. WebSocket connection lifecycle (`ClientConnected`-equivalent
//! `WebSocketConnected`/`Disconnected`/`Message`) is published through
//! [`aro_core::EventPublisher`] instead, since those genuinely are handled
//! by subscribed feature-set handlers rather than a synchronous caller.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use aro_core::{
    Event, EventPublisher, ExecutionContext, OpaqueHandle, PublishedBindings, RepositoryRegistry,
    ResponseStatus, SchemaRegistry, ServiceManager, Value, ValueMap,
};

use crate::route::{strip_query, RouteTable};
use crate::ws::{self, FragmentBuffer};

/// A resolved operationId's entry point: build a fresh context, bind
/// `request`/`pathParameters`/`queryParameters`/`body`, run the compiled
/// handler's statements (§4.6 step 6). The context already carries the
/// bindings by the time this is called.
pub type RequestHandler = Arc<dyn Fn(&Arc<ExecutionContext>) + Send + Sync>;

const STATIC_EXTENSIONS: &[(&str, &str)] = &[
    (".css", "text/css"),
    (".js", "application/javascript"),
    (".html", "text/html"),
    (".json", "application/json"),
    (".xml", "application/xml"),
    (".txt", "text/plain"),
    (".svg", "image/svg+xml"),
];

/// Everything a connection-handling worker thread needs, written once at
/// `start` and read lock-free thereafter (§5 "Route table ... written at
/// startup only").
pub struct HttpDispatch {
    pub routes: RouteTable,
    pub handlers: HashMap<String, RequestHandler>,
    pub published: Arc<PublishedBindings>,
    pub event_publisher: Arc<dyn EventPublisher>,
    pub schema_registry: Option<Arc<dyn SchemaRegistry>>,
    pub repositories: Option<Arc<RepositoryRegistry>>,
    pub services: Option<Arc<dyn ServiceManager>>,
    pub ws_path: String,
}

/// A live WebSocket connection accepted by this server, keyed by connection
/// id for `Send`/`Broadcast` (§4.6, §4.7).
struct WsConnection {
    stream: Mutex<TcpStream>,
}

pub struct HttpServer {
    dispatch: Arc<HttpDispatch>,
    shutdown: Arc<AtomicBool>,
    next_connection_id: Arc<AtomicU64>,
    connections: Arc<RwLock<HashMap<u64, Arc<WsConnection>>>>,
    accept_thread: Option<thread::JoinHandle<()>>,
    local_addr: std::net::SocketAddr,
}

impl HttpServer {
    /// Bind and start accepting connections on `port`. Each accepted
    /// connection runs on its own worker thread (§5 "per-connection I/O is
    /// single-threaded in its worker").
    pub fn start(port: u16, dispatch: Arc<HttpDispatch>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port))?;
        let local_addr = listener.local_addr()?;
        let shutdown = Arc::new(AtomicBool::new(false));
        let connections: Arc<RwLock<HashMap<u64, Arc<WsConnection>>>> = Arc::new(RwLock::new(HashMap::new()));
        let next_connection_id = Arc::new(AtomicU64::new(1));

        let accept_shutdown = Arc::clone(&shutdown);
        let accept_dispatch = Arc::clone(&dispatch);
        let accept_connections = Arc::clone(&connections);
        let accept_ids = Arc::clone(&next_connection_id);
        // Bounded accept-loop poll so shutdown is responsive without a
        // second listener thread (§5 "1 s select timeout").
        listener.set_nonblocking(true)?;
        let accept_thread = thread::Builder::new()
            .name("aro-http-accept".into())
            .spawn(move || {
                while !accept_shutdown.load(Ordering::SeqCst) {
                    match listener.accept() {
                        Ok((stream, _addr)) => {
                            let dispatch = Arc::clone(&accept_dispatch);
                            let connections = Arc::clone(&accept_connections);
                            let ids = Arc::clone(&accept_ids);
                            let worker_shutdown = Arc::clone(&accept_shutdown);
                            thread::spawn(move || {
                                if let Err(err) = handle_connection(stream, &dispatch, &connections, &ids, &worker_shutdown) {
                                    debug!(error = %err, "http connection closed with an error");
                                }
                            });
                        }
                        Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                            thread::sleep(Duration::from_millis(50));
                        }
                        Err(e) => {
                            warn!(error = %e, "http accept failed");
                            thread::sleep(Duration::from_millis(50));
                        }
                    }
                }
            })?;

        Ok(Self {
            dispatch,
            shutdown,
            next_connection_id,
            connections,
            accept_thread: Some(accept_thread),
            local_addr,
        })
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

    /// Write `payload` as a single text or binary frame to one connection
    /// (§4.6 `Send`).
    pub fn send(&self, connection: &OpaqueHandle, payload: &Value) -> Result<(), String> {
        let conn = {
            let guard = self.connections.read();
            guard.get(&connection.id).cloned()
        };
        let conn = conn.ok_or_else(|| format!("no open connection {}", connection.id))?;
        write_ws_message(&conn, payload)
    }

    /// Write `payload` to every open connection except `exclude` (§4.6
    /// `Broadcast [excluding sender]`).
    pub fn broadcast(&self, payload: &Value, exclude: Option<&OpaqueHandle>) {
        let targets: Vec<(u64, Arc<WsConnection>)> = {
            let guard = self.connections.read();
            guard
                .iter()
                .filter(|(id, _)| exclude.map(|h| h.id != **id).unwrap_or(true))
                .map(|(id, conn)| (*id, Arc::clone(conn)))
                .collect()
        };
        for (id, conn) in targets {
            if let Err(err) = write_ws_message(&conn, payload) {
                debug!(connection = id, error = %err, "broadcast write failed");
            }
        }
    }
}

fn write_ws_message(conn: &WsConnection, payload: &Value) -> Result<(), String> {
    let (opcode, bytes) = match payload {
        Value::Bytes(b) => (ws::OPCODE_BINARY, b.clone()),
        Value::String(s) => (ws::OPCODE_TEXT, s.clone().into_bytes()),
        other => (ws::OPCODE_TEXT, serde_json::to_vec(&other.to_json()).unwrap_or_default()),
    };
    let frame = ws::encode_frame(opcode, &bytes);
    conn.stream.lock().write_all(&frame).map_err(|e| e.to_string())
}

struct ParsedRequest {
    method: String,
    path: String,
    query: String,
    headers: ValueMap,
    body: Vec<u8>,
}

fn handle_connection(
    mut stream: TcpStream,
    dispatch: &Arc<HttpDispatch>,
    connections: &Arc<RwLock<HashMap<u64, Arc<WsConnection>>>>,
    next_id: &Arc<AtomicU64>,
    shutdown: &Arc<AtomicBool>,
) -> std::io::Result<()> {
    stream.set_read_timeout(Some(Duration::from_secs(1)))?;
    let request = match read_request(&mut stream)? {
        Some(r) => r,
        None => return Ok(()),
    };

    let is_upgrade = request
        .headers
        .get("upgrade")
        .and_then(|v| v.as_str())
        .map(|v| v.eq_ignore_ascii_case("websocket"))
        .unwrap_or(false);

    if is_upgrade && strip_query(&request.path) == dispatch.ws_path.as_str() {
        return run_websocket(stream, request, dispatch, connections, next_id, shutdown);
    }

    let response_bytes = build_http_response(dispatch, &request);
    stream.write_all(&response_bytes)?;
    stream.flush()?;
    // §5: "10 ms" grace before close so the client's final read isn't cut.
    thread::sleep(Duration::from_millis(10));
    Ok(())
}

fn read_request(stream: &mut TcpStream) -> std::io::Result<Option<ParsedRequest>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        match stream.read(&mut chunk) {
            Ok(0) => return Ok(None),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock || e.kind() == std::io::ErrorKind::TimedOut => {
                continue;
            }
            Err(e) => return Err(e),
        }
        if buf.len() > 1 << 20 {
            return Ok(None);
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("GET").to_string();
    let target = parts.next().unwrap_or("/").to_string();
    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p.to_string(), q.to_string()),
        None => (target, String::new()),
    };

    let mut headers = ValueMap::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), Value::string(value.trim()));
        }
    }

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => body.extend_from_slice(&chunk[..n]),
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock || e.kind() == std::io::ErrorKind::TimedOut => {
                continue;
            }
            Err(e) => return Err(e),
        }
    }
    body.truncate(content_length);

    Ok(Some(ParsedRequest { method, path, query, headers, body }))
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn parse_query(query: &str) -> ValueMap {
    let mut map = ValueMap::new();
    for pair in query.split('&').filter(|s| !s.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        map.insert(percent_decode(key), Value::string(percent_decode(value)));
    }
    map
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                if let Ok(byte) = u8::from_str_radix(&input[i + 1..i + 3], 16) {
                    out.push(byte);
                    i += 3;
                } else {
                    out.push(bytes[i]);
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn build_http_response(dispatch: &Arc<HttpDispatch>, request: &ParsedRequest) -> Vec<u8> {
    let path = strip_query(&request.path);
    let Some((operation_id, path_params)) = dispatch.routes.match_route(&request.method, path) else {
        return render_status(ResponseStatus::NotFound, &ValueMap::new(), "application/json");
    };
    let Some(handler) = dispatch.handlers.get(operation_id) else {
        return render_status(ResponseStatus::NotFound, &ValueMap::new(), "application/json");
    };

    let ctx = Arc::new(build_request_context(dispatch, request, operation_id, &path_params));
    handler(&ctx);

    let content_type = select_content_type(dispatch, request, operation_id, &ctx);
    if let Some(response) = ctx.get_response() {
        render_status(response.status, &response.data, &content_type)
    } else if let Some(err) = ctx.execution_error() {
        let status = http_status_to_enum(err.http_status());
        let mut data = ValueMap::new();
        data.insert("error".into(), Value::string(err.message));
        render_status(status, &data, "application/json")
    } else {
        render_status(ResponseStatus::NoContent, &ValueMap::new(), &content_type)
    }
}

fn build_request_context(dispatch: &Arc<HttpDispatch>, request: &ParsedRequest, operation_id: &str, path_params: &ValueMap) -> ExecutionContext {
    let ctx = ExecutionContext::new(
        operation_id.to_string(),
        "default".to_string(),
        Arc::clone(&dispatch.published),
        Arc::clone(&dispatch.event_publisher),
        dispatch.schema_registry.clone(),
    );
    let ctx = match &dispatch.repositories {
        Some(r) => ctx.with_repositories(Arc::clone(r)),
        None => ctx,
    };
    let ctx = match &dispatch.services {
        Some(s) => ctx.with_services(Arc::clone(s)),
        None => ctx,
    };

    let mut request_map = ValueMap::new();
    request_map.insert("method".into(), Value::string(&request.method));
    request_map.insert("path".into(), Value::string(strip_query(&request.path)));
    request_map.insert("headers".into(), Value::Mapping(request.headers.clone()));
    let _ = ctx.bind("request", Value::Mapping(request_map));
    let _ = ctx.bind("pathParameters", Value::Mapping(path_params.clone()));
    let _ = ctx.bind("queryParameters", Value::Mapping(parse_query(&request.query)));

    // §8 "Content-Length 0 POST: handler sees `body` unbound ... not to a
    // parse error" — only bind `body` when there is one.
    if !request.body.is_empty() {
        let body_value = if request.body.first() == Some(&b'{') || request.body.first() == Some(&b'[') {
            serde_json::from_slice::<serde_json::Value>(&request.body)
                .map(Value::from_json)
                .unwrap_or_else(|_| Value::string(String::from_utf8_lossy(&request.body)))
        } else {
            Value::string(String::from_utf8_lossy(&request.body))
        };
        let _ = ctx.bind("body", body_value);
    }

    ctx
}

fn http_status_to_enum(code: u16) -> ResponseStatus {
    match code {
        200 => ResponseStatus::Ok,
        201 => ResponseStatus::Created,
        202 => ResponseStatus::Accepted,
        204 => ResponseStatus::NoContent,
        400 => ResponseStatus::BadRequest,
        401 => ResponseStatus::Unauthorized,
        403 => ResponseStatus::Forbidden,
        404 => ResponseStatus::NotFound,
        409 => ResponseStatus::Conflict,
        422 => ResponseStatus::UnprocessableEntity,
        503 => ResponseStatus::ServiceUnavailable,
        _ => ResponseStatus::InternalError,
    }
}

/// §4.6 step 7: file extension, then OpenAPI-declared type, then content
/// sniffing, then the `application/json` fallback.
fn select_content_type(dispatch: &Arc<HttpDispatch>, request: &ParsedRequest, operation_id: &str, ctx: &ExecutionContext) -> String {
    let path = strip_query(&request.path);
    for (ext, content_type) in STATIC_EXTENSIONS {
        if path.ends_with(ext) {
            return content_type.to_string();
        }
    }
    if let Some(registry) = &dispatch.schema_registry {
        if let Some(declared) = registry.response_content_type(operation_id) {
            return declared;
        }
    }
    if let Some(response) = ctx.get_response() {
        if let Some(sniffed) = sniff_content_type(&response.data) {
            return sniffed;
        }
    }
    "application/json".to_string()
}

fn sniff_content_type(data: &ValueMap) -> Option<String> {
    let body = data.get("body").or_else(|| data.values().next())?;
    let text = body.as_str()?;
    let trimmed = text.trim_start();
    if trimmed.starts_with("<!DOCTYPE") || trimmed.starts_with("<html") {
        Some("text/html".to_string())
    } else if trimmed.contains("function(") || trimmed.contains("=>") {
        Some("application/javascript".to_string())
    } else if trimmed.starts_with('.') || trimmed.contains('{') && trimmed.contains(':') && trimmed.ends_with('}') {
        Some("text/css".to_string())
    } else {
        None
    }
}

fn render_status(status: ResponseStatus, data: &ValueMap, content_type: &str) -> Vec<u8> {
    let body = serde_json::to_vec(&Value::Mapping(data.clone()).to_json()).unwrap_or_default();
    let reason = status.to_string();
    let mut response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status.http_code(),
        reason,
        content_type,
        body.len(),
    )
    .into_bytes();
    response.extend_from_slice(&body);
    response
}

fn run_websocket(
    mut stream: TcpStream,
    request: ParsedRequest,
    dispatch: &Arc<HttpDispatch>,
    connections: &Arc<RwLock<HashMap<u64, Arc<WsConnection>>>>,
    next_id: &Arc<AtomicU64>,
    shutdown: &Arc<AtomicBool>,
) -> std::io::Result<()> {
    let Some(key) = request.headers.get("sec-websocket-key").and_then(|v| v.as_str()) else {
        let response = b"HTTP/1.1 400 Bad Request\r\nConnection: close\r\n\r\n";
        stream.write_all(response)?;
        return Ok(());
    };
    let accept = ws::accept_key(key);
    let handshake = format!(
        "HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\nConnection: Upgrade\r\nSec-WebSocket-Accept: {accept}\r\n\r\n"
    );
    stream.write_all(handshake.as_bytes())?;

    let connection_id = next_id.fetch_add(1, Ordering::SeqCst);
    let handle = OpaqueHandle::new("websocket", connection_id);
    let conn = Arc::new(WsConnection { stream: Mutex::new(stream.try_clone()?) });
    connections.write().insert(connection_id, Arc::clone(&conn));
    dispatch.event_publisher.publish(Event::WebSocketConnected { server: "http".to_string(), connection: handle.clone() });

    let mut read_buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let mut fragments = FragmentBuffer::new();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => read_buf.extend_from_slice(&chunk[..n]),
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock || e.kind() == std::io::ErrorKind::TimedOut => {
                continue;
            }
            Err(_) => break,
        }

        loop {
            let frame = match ws::parse_frame(&read_buf) {
                Ok((frame, consumed)) => {
                    read_buf.drain(..consumed);
                    frame
                }
                Err(_) => break,
            };

            if frame.opcode == ws::OPCODE_CLOSE {
                // §4.6.1: reply close and terminate.
                let _ = conn.stream.lock().write_all(&ws::encode_frame(ws::OPCODE_CLOSE, &[]));
                connections.write().remove(&connection_id);
                dispatch.event_publisher.publish(Event::WebSocketDisconnected { server: "http".to_string(), connection: handle.clone() });
                return Ok(());
            }
            if frame.opcode == ws::OPCODE_PING {
                // §4.6.1: reply pong, opcode 0xA.
                let _ = conn.stream.lock().write_all(&ws::encode_frame(ws::OPCODE_PONG, &frame.payload));
                continue;
            }
            if frame.opcode == ws::OPCODE_PONG {
                continue;
            }
            if let Some((opcode, payload)) = fragments.feed(frame) {
                let value = if opcode == ws::OPCODE_BINARY {
                    Value::Bytes(payload)
                } else {
                    Value::string(String::from_utf8_lossy(&payload))
                };
                dispatch.event_publisher.publish(Event::WebSocketMessage {
                    server: "http".to_string(),
                    connection: handle.clone(),
                    payload: value,
                });
            }
        }
    }

    connections.write().remove(&connection_id);
    dispatch.event_publisher.publish(Event::WebSocketDisconnected { server: "http".to_string(), connection: handle });
    Ok(())
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
