// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events: the abstract `(eventType, timestamp, payload)` carrier of §3,
//! and every concrete shape §3/§4.5 names. Handler delivery binds `event`
//! to [`Event::to_payload`] and additionally binds each top-level payload
//! key as `event:key` (§4.5) — that projection lives here so both the
//! scheduler and the C ABI layer can share it.

use std::path::PathBuf;

use crate::value::{OpaqueHandle, Value, ValueMap};

/// What changed on a repository mutation (§3 Repository, §4.3 Store/Delete).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryChangeKind {
    Added,
    Deleted,
}

crate::simple_display! {
    RepositoryChangeKind {
        Added => "added",
        Deleted => "deleted",
    }
}

/// Every concrete event shape named in §3 and §4.5/§4.6/§4.7/§4.8, plus the
/// `Custom` escape hatch for user-emitted events (`Emit`).
#[derive(Debug, Clone)]
pub enum Event {
    HttpRequest {
        method: String,
        path: String,
        path_parameters: ValueMap,
        query_parameters: ValueMap,
        headers: ValueMap,
        body: Value,
    },
    WebSocketConnected {
        server: String,
        connection: OpaqueHandle,
    },
    WebSocketDisconnected {
        server: String,
        connection: OpaqueHandle,
    },
    WebSocketMessage {
        server: String,
        connection: OpaqueHandle,
        payload: Value,
    },
    WebSocketBroadcastRequested {
        server: String,
        payload: Value,
        exclude: Option<OpaqueHandle>,
    },
    ClientConnected {
        server: String,
        connection: OpaqueHandle,
        remote_address: String,
    },
    ClientDisconnected {
        server: String,
        connection: OpaqueHandle,
    },
    DataReceived {
        server: String,
        connection: OpaqueHandle,
        remote_address: String,
        payload: Vec<u8>,
    },
    FileCreated {
        path: PathBuf,
    },
    FileModified {
        path: PathBuf,
    },
    FileDeleted {
        path: PathBuf,
    },
    FileRenamed {
        old_path: Option<PathBuf>,
        new_path: PathBuf,
    },
    RepositoryChanged {
        business_activity: String,
        name: String,
        change: RepositoryChangeKind,
    },
    FeatureSetCompleted {
        feature_set_name: String,
    },
    WaitStateEntered,
    /// A user-emitted event via `Emit`: `event_type` is the name chosen by
    /// the ARO source, `payload` is whatever mapping it constructed.
    Custom {
        event_type: String,
        payload: Value,
    },
}

impl Event {
    /// The topic name subscribers register against.
    pub fn event_type(&self) -> String {
        match self {
            Event::HttpRequest { .. } => "HTTPRequest".to_string(),
            Event::WebSocketConnected { .. } => "WebSocketConnected".to_string(),
            Event::WebSocketDisconnected { .. } => "WebSocketDisconnected".to_string(),
            Event::WebSocketMessage { .. } => "WebSocketMessage".to_string(),
            Event::WebSocketBroadcastRequested { .. } => "WebSocketBroadcastRequested".to_string(),
            Event::ClientConnected { .. } => "ClientConnected".to_string(),
            Event::ClientDisconnected { .. } => "ClientDisconnected".to_string(),
            Event::DataReceived { .. } => "DataReceived".to_string(),
            Event::FileCreated { .. } => "FileCreated".to_string(),
            Event::FileModified { .. } => "FileModified".to_string(),
            Event::FileDeleted { .. } => "FileDeleted".to_string(),
            Event::FileRenamed { .. } => "FileRenamed".to_string(),
            Event::RepositoryChanged { .. } => "RepositoryChanged".to_string(),
            Event::FeatureSetCompleted { .. } => "FeatureSetCompleted".to_string(),
            Event::WaitStateEntered => "WaitStateEntered".to_string(),
            Event::Custom { event_type, .. } => event_type.clone(),
        }
    }

    /// Project this event into the mapping bound as `event` in the handler
    /// context (§4.5).
    pub fn to_payload(&self) -> ValueMap {
        let mut m = ValueMap::new();
        match self {
            Event::HttpRequest { method, path, path_parameters, query_parameters, headers, body } => {
                m.insert("method".into(), Value::string(method));
                m.insert("path".into(), Value::string(path));
                m.insert("pathParameters".into(), Value::Mapping(path_parameters.clone()));
                m.insert("queryParameters".into(), Value::Mapping(query_parameters.clone()));
                m.insert("headers".into(), Value::Mapping(headers.clone()));
                m.insert("body".into(), body.clone());
            }
            Event::WebSocketConnected { server, connection }
            | Event::WebSocketDisconnected { server, connection } => {
                m.insert("server".into(), Value::string(server));
                m.insert("connection".into(), Value::Handle(connection.clone()));
            }
            Event::WebSocketMessage { server, connection, payload } => {
                m.insert("server".into(), Value::string(server));
                m.insert("connection".into(), Value::Handle(connection.clone()));
                m.insert("payload".into(), payload.clone());
            }
            Event::WebSocketBroadcastRequested { server, payload, exclude } => {
                m.insert("server".into(), Value::string(server));
                m.insert("payload".into(), payload.clone());
                m.insert(
                    "exclude".into(),
                    exclude.clone().map(Value::Handle).unwrap_or(Value::Null),
                );
            }
            Event::ClientConnected { server, connection, remote_address } => {
                m.insert("server".into(), Value::string(server));
                m.insert("connection".into(), Value::Handle(connection.clone()));
                m.insert("remoteAddress".into(), Value::string(remote_address));
            }
            Event::ClientDisconnected { server, connection } => {
                m.insert("server".into(), Value::string(server));
                m.insert("connection".into(), Value::Handle(connection.clone()));
            }
            Event::DataReceived { server, connection, remote_address, payload } => {
                m.insert("server".into(), Value::string(server));
                m.insert("connection".into(), Value::Handle(connection.clone()));
                m.insert("remoteAddress".into(), Value::string(remote_address));
                m.insert("payload".into(), Value::Bytes(payload.clone()));
            }
            Event::FileCreated { path }
            | Event::FileModified { path }
            | Event::FileDeleted { path } => {
                m.insert("path".into(), Value::string(path.to_string_lossy()));
            }
            Event::FileRenamed { old_path, new_path } => {
                m.insert(
                    "oldPath".into(),
                    old_path.as_ref().map(|p| Value::string(p.to_string_lossy())).unwrap_or(Value::Null),
                );
                m.insert("newPath".into(), Value::string(new_path.to_string_lossy()));
            }
            Event::RepositoryChanged { business_activity, name, change } => {
                m.insert("businessActivity".into(), Value::string(business_activity));
                m.insert("name".into(), Value::string(name));
                m.insert("change".into(), Value::string(change.to_string()));
            }
            Event::FeatureSetCompleted { feature_set_name } => {
                m.insert("featureSetName".into(), Value::string(feature_set_name));
            }
            Event::WaitStateEntered => {}
            Event::Custom { payload, .. } => {
                if let Value::Mapping(inner) = payload {
                    return inner.clone();
                }
                m.insert("value".into(), payload.clone());
            }
        }
        m
    }
}

/// Abstraction `ExecutionContext` publishes through. Kept trait-based (not
/// a concrete `EventBus` type) so `aro-core` never depends on `aro-events` —
/// the dependency graph runs Value Model → Context → … → Event Bus, and a
/// concrete dependency the other way would make a cycle (§9 "Cyclic
/// references to services from contexts").
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: Event);
}

/// A publisher that drops every event. Useful for contexts created outside
/// a running bus (unit tests, one-off expression evaluation).
pub struct NullPublisher;

impl EventPublisher for NullPublisher {
    fn publish(&self, _event: Event) {}
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
