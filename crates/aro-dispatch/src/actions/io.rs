// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store, Publish, Emit, Send, Broadcast, Delete, List, Stat, Exists, Copy,
//! Move, Append, CreateDirectory (§4.3) — the `export` semantic-role verbs
//! plus the file-system family. None of these bind a result into the
//! caller's scope (§4.2 semantic role table).

use std::path::Path;

use aro_core::repository::RepositoryKey;
use aro_core::{ErrorKind, Event, ExecutionContext, RepositoryChangeKind, Value, ValueMap};

use crate::descriptor::{ObjectDescriptor, ResultDescriptor};
use crate::registry::ActionOutcome;

use super::support::{expression, fail, navigate, parsed_tree};

/// `Store <result> in <target>` — appends to a repository and emits
/// `RepositoryChanged{added}`, overwrites/creates a file, or enqueues to a
/// connection (§4.3).
pub fn store(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let Some(value) = expression(ctx).or_else(|| navigate(object, ctx).ok()) else {
        return fail("Store", result, object, ErrorKind::ComputationError, "nothing to store resolved to a value");
    };

    if aro_core::repository::is_repository_name(&object.base) {
        let Some(registry) = ctx.repositories() else {
            return fail("Store", result, object, ErrorKind::InternalError, "no repository registry attached to this context");
        };
        let key = RepositoryKey::new(ctx.business_activity.clone(), object.base.clone());
        let repo = registry.get_or_create(key);
        repo.append(value.clone());
        ctx.publish_event(Event::RepositoryChanged {
            business_activity: ctx.business_activity.clone(),
            name: object.base.clone(),
            change: RepositoryChangeKind::Added,
        });
        return ActionOutcome::ok(value);
    }

    if let Some(path) = ctx.resolve(&object.base).and_then(|v| v.as_str().map(str::to_string)) {
        let bytes = match &value {
            Value::Bytes(b) => b.clone(),
            Value::String(s) => s.clone().into_bytes(),
            other => other.to_json().to_string().into_bytes(),
        };
        if let Some(parent) = Path::new(&path).parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return fail("Store", result, object, ErrorKind::InternalError, e);
            }
        }
        return match std::fs::write(&path, bytes) {
            Ok(()) => ActionOutcome::ok(value),
            Err(e) => fail("Store", result, object, ErrorKind::InternalError, e),
        };
    }

    fail("Store", result, object, ErrorKind::ComputationError, "store target is neither a repository nor a file path")
}

/// `Publish <result> as <alias>` — installs `(alias, value)` into the
/// process-global mapping (§4.1, §4.3).
pub fn publish(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let Some(value) = expression(ctx).or_else(|| navigate(object, ctx).ok()) else {
        return fail("Publish", result, object, ErrorKind::ComputationError, "nothing to publish resolved to a value");
    };
    ctx.publish_global(result.base.clone(), value.clone());
    ActionOutcome::ok(value)
}

/// `Emit <result> as <eventType>` — constructs a user event and publishes it
/// on the bus (§4.3, §4.5).
pub fn emit(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let payload = expression(ctx).or_else(|| navigate(object, ctx).ok()).unwrap_or(Value::Null);
    ctx.publish_event(Event::Custom { event_type: result.base.clone(), payload: payload.clone() });
    ActionOutcome::ok(payload)
}

/// `Send <result> to <connection>` — transmits to the addressed connection;
/// for a server target, publishes `WebSocketBroadcastRequested` instead of
/// addressing a single connection directly (§4.3).
pub fn send(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let Some(payload) = expression(ctx) else {
        return fail("Send", result, object, ErrorKind::ComputationError, "send needs an expression to transmit");
    };
    ctx.publish_event(Event::WebSocketBroadcastRequested { server: object.base.clone(), payload: payload.clone(), exclude: None });
    ActionOutcome::ok(payload)
}

/// `Broadcast <result> via <server>` — sends to every connection of a named
/// server, optionally excluding the sender (the object's `except` specifier,
/// when present, names an `aro_core::OpaqueHandle`-valued binding) (§4.3).
pub fn broadcast(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let Some(payload) = expression(ctx) else {
        return fail("Broadcast", result, object, ErrorKind::ComputationError, "broadcast needs an expression to transmit");
    };
    let exclude = object
        .specifiers
        .first()
        .and_then(|name| ctx.resolve(name))
        .and_then(|v| match v {
            Value::Handle(h) => Some(h),
            _ => None,
        });
    ctx.publish_event(Event::WebSocketBroadcastRequested { server: object.base.clone(), payload: payload.clone(), exclude });
    ActionOutcome::ok(payload)
}

/// `Delete <result> from <repo>[ where <predicate>]` — removes matching
/// repository entities, or removes a file (§4.3).
pub fn delete(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    if aro_core::repository::is_repository_name(&object.base) {
        let Some(registry) = ctx.repositories() else {
            return fail("Delete", result, object, ErrorKind::InternalError, "no repository registry attached to this context");
        };
        let key = RepositoryKey::new(ctx.business_activity.clone(), object.base.clone());
        let Some(repo) = registry.get(&key) else {
            return ActionOutcome::ok(Value::Int(0));
        };
        let removed = match parsed_tree(ctx, "_predicate_") {
            None => repo.delete_by(|_| true),
            Some(tree) => repo.delete_by(|entity| {
                let child = ctx.child_scope("delete-predicate");
                child.bind_force("item", entity.clone());
                matches!(aro_expr::eval(&tree, &child), Ok(v) if v.is_truthy())
            }),
        };
        if removed > 0 {
            ctx.publish_event(Event::RepositoryChanged {
                business_activity: ctx.business_activity.clone(),
                name: object.base.clone(),
                change: RepositoryChangeKind::Deleted,
            });
        }
        return ActionOutcome::ok(Value::Int(removed as i64));
    }

    let Some(path) = ctx.resolve(&object.base).and_then(|v| v.as_str().map(str::to_string)) else {
        return fail("Delete", result, object, ErrorKind::PropertyMissing, "delete target did not resolve to a path string");
    };
    match std::fs::remove_file(&path) {
        Ok(()) => ActionOutcome::ok(Value::Bool(true)),
        Err(e) => fail("Delete", result, object, ErrorKind::InternalError, e),
    }
}

/// `List <result> from <directory>` — directory entries as plain names.
pub fn list(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let Some(path) = ctx.resolve(&object.base).and_then(|v| v.as_str().map(str::to_string)) else {
        return fail("List", result, object, ErrorKind::PropertyMissing, "list target did not resolve to a path string");
    };
    let entries = match std::fs::read_dir(&path) {
        Ok(e) => e,
        Err(e) => return fail("List", result, object, ErrorKind::InternalError, e),
    };
    let mut names = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => names.push(Value::string(entry.file_name().to_string_lossy())),
            Err(e) => return fail("List", result, object, ErrorKind::InternalError, e),
        }
    }
    ActionOutcome::ok(Value::Sequence(names))
}

/// `Stat <result> from <path>` — `{name, path, size, isFile, isDirectory,
/// created, modified, permissions}`; `permissions` is a nine-character
/// `rwx` string (§6 File system surface).
pub fn stat(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let Some(path) = ctx.resolve(&object.base).and_then(|v| v.as_str().map(str::to_string)) else {
        return fail("Stat", result, object, ErrorKind::PropertyMissing, "stat target did not resolve to a path string");
    };
    let metadata = match std::fs::metadata(&path) {
        Ok(m) => m,
        Err(e) => return fail("Stat", result, object, ErrorKind::InternalError, e),
    };

    let mut out = ValueMap::new();
    let name = Path::new(&path).file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| path.clone());
    out.insert("name".into(), Value::string(name));
    out.insert("path".into(), Value::string(&path));
    out.insert("size".into(), Value::Int(metadata.len() as i64));
    out.insert("isFile".into(), Value::Bool(metadata.is_file()));
    out.insert("isDirectory".into(), Value::Bool(metadata.is_dir()));
    out.insert("created".into(), metadata.created().ok().map(system_time_to_value).unwrap_or(Value::Null));
    out.insert("modified".into(), metadata.modified().ok().map(system_time_to_value).unwrap_or(Value::Null));
    out.insert("permissions".into(), Value::string(permissions_string(&metadata)));
    ActionOutcome::ok(Value::Mapping(out))
}

fn system_time_to_value(time: std::time::SystemTime) -> Value {
    Value::DateTime(chrono::DateTime::<chrono::Utc>::from(time))
}

#[cfg(unix)]
fn permissions_string(metadata: &std::fs::Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    let mode = metadata.permissions().mode();
    let bit = |shift: u32, ch: char| if mode & (1 << shift) != 0 { ch } else { '-' };
    [
        bit(8, 'r'), bit(7, 'w'), bit(6, 'x'),
        bit(5, 'r'), bit(4, 'w'), bit(3, 'x'),
        bit(2, 'r'), bit(1, 'w'), bit(0, 'x'),
    ]
    .into_iter()
    .collect()
}

#[cfg(not(unix))]
fn permissions_string(metadata: &std::fs::Metadata) -> String {
    if metadata.permissions().readonly() { "r--r--r--".to_string() } else { "rw-rw-rw-".to_string() }
}

/// `Exists <result> from <path>` — a boolean; never fails (§4.3).
pub fn exists(_result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let exists = ctx.resolve(&object.base).and_then(|v| v.as_str().map(str::to_string)).map(|p| Path::new(&p).exists()).unwrap_or(false);
    ActionOutcome::ok(Value::Bool(exists))
}

/// `Copy <result> to <destination>` — `object` names the source, `_expression_`
/// (or the result's own sibling `to` binding) names the destination (§4.3).
pub fn copy(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let (from, to) = match file_pair(result, object, ctx) {
        Ok(pair) => pair,
        Err(detail) => return fail("Copy", result, object, ErrorKind::PropertyMissing, detail),
    };
    if let Some(parent) = Path::new(&to).parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            return fail("Copy", result, object, ErrorKind::InternalError, e);
        }
    }
    match std::fs::copy(&from, &to) {
        Ok(_) => ActionOutcome::ok(Value::Bool(true)),
        Err(e) => fail("Copy", result, object, ErrorKind::InternalError, e),
    }
}

/// `Move <result> to <destination>` — rename, falling back to copy-then-
/// delete across devices (§4.3).
pub fn move_(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let (from, to) = match file_pair(result, object, ctx) {
        Ok(pair) => pair,
        Err(detail) => return fail("Move", result, object, ErrorKind::PropertyMissing, detail),
    };
    if let Some(parent) = Path::new(&to).parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            return fail("Move", result, object, ErrorKind::InternalError, e);
        }
    }
    if std::fs::rename(&from, &to).is_ok() {
        return ActionOutcome::ok(Value::Bool(true));
    }
    match std::fs::copy(&from, &to).and_then(|_| std::fs::remove_file(&from)) {
        Ok(_) => ActionOutcome::ok(Value::Bool(true)),
        Err(e) => fail("Move", result, object, ErrorKind::InternalError, e),
    }
}

/// `Append <result> to <path>` — appends `_expression_` to the end of a file,
/// creating it if absent (§4.3).
pub fn append(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    use std::io::Write;
    let Some(path) = ctx.resolve(&object.base).and_then(|v| v.as_str().map(str::to_string)) else {
        return fail("Append", result, object, ErrorKind::PropertyMissing, "append target did not resolve to a path string");
    };
    let Some(value) = expression(ctx) else {
        return fail("Append", result, object, ErrorKind::ComputationError, "append needs an expression to write");
    };
    let bytes = match &value {
        Value::Bytes(b) => b.clone(),
        Value::String(s) => s.clone().into_bytes(),
        other => other.to_json().to_string().into_bytes(),
    };
    if let Some(parent) = Path::new(&path).parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            return fail("Append", result, object, ErrorKind::InternalError, e);
        }
    }
    let opened = std::fs::OpenOptions::new().create(true).append(true).open(&path).and_then(|mut f| f.write_all(&bytes));
    match opened {
        Ok(()) => ActionOutcome::ok(value),
        Err(e) => fail("Append", result, object, ErrorKind::InternalError, e),
    }
}

/// `Log <result> with <message>` — writes a diagnostic line via `tracing`
/// (role table §4.2; side-effect only, no contract of its own in §4.3).
/// `ARO_DEBUG=1` is what makes this visible (§6 Environment & args) — the
/// subscriber installed by the host crate gates on it, not this function.
pub fn log(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let value = expression(ctx).or_else(|| navigate(object, ctx).ok()).unwrap_or(Value::Null);
    tracing::info!(target: "aro", verb = "Log", result = %result.base, value = %value.to_json(), "{}", object.base);
    ActionOutcome::ok(value)
}

/// `CreateDirectory <result> at <path>` — recursive create, idempotent
/// (§4.3).
pub fn create_directory(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let Some(path) = ctx.resolve(&object.base).and_then(|v| v.as_str().map(str::to_string)) else {
        return fail("CreateDirectory", result, object, ErrorKind::PropertyMissing, "directory target did not resolve to a path string");
    };
    match std::fs::create_dir_all(&path) {
        Ok(()) => ActionOutcome::ok(Value::Bool(true)),
        Err(e) => fail("CreateDirectory", result, object, ErrorKind::InternalError, e),
    }
}

/// Resolve `(source path, destination path)` for Copy/Move: the object names
/// the source; the destination is `_expression_` when it resolves to a
/// string, otherwise the result's own base resolved as a binding.
fn file_pair(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> Result<(String, String), String> {
    let from = ctx.resolve(&object.base).and_then(|v| v.as_str().map(str::to_string)).ok_or_else(|| format!("'{}' did not resolve to a path string", object.base))?;
    let to = expression(ctx)
        .and_then(|v| v.as_str().map(str::to_string))
        .or_else(|| ctx.resolve(&result.base).and_then(|v| v.as_str().map(str::to_string)))
        .ok_or_else(|| "destination did not resolve to a path string".to_string())?;
    Ok((from, to))
}

#[cfg(test)]
#[path = "io_tests.rs"]
mod tests;
