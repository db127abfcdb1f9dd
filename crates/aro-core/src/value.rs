// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dynamically-tagged value that flows through every binding, every
//! repository entity, and every wire payload.
//!
//! Construction from parsed JSON must preserve the integer/double split and
//! keep genuine booleans distinct from 0/1 integers — `serde_json::Number`
//! already carries that distinction (`is_i64`/`is_f64`/`is_u64`), so
//! [`Value::from_json`] reads it off rather than re-deriving it.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Insertion-ordered string-keyed mapping, the shape every `Extract`,
/// `Transform`, and repository entity is built from.
pub type ValueMap = IndexMap<String, Value>;

/// A handle to a resource that lives outside the value model proper — a
/// WebSocket connection id, a TCP connection id, a file watch handle. The
/// `kind` disambiguates which native service minted the handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpaqueHandle {
    pub kind: String,
    pub id: u64,
}

impl OpaqueHandle {
    pub fn new(kind: impl Into<String>, id: u64) -> Self {
        Self { kind: kind.into(), id }
    }
}

/// The tagged union every binding, response, and event payload is made of.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Mapping(ValueMap),
    Sequence(Vec<Value>),
    DateTime(DateTime<Utc>),
    Handle(OpaqueHandle),
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn mapping(map: ValueMap) -> Self {
        Value::Mapping(map)
    }

    pub fn sequence(seq: Vec<Value>) -> Self {
        Value::Sequence(seq)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&ValueMap> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut ValueMap> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Navigate a dotted/segmented property path through mappings and
    /// sequences (sequence segments must parse as an index).
    pub fn get_path(&self, segments: &[String]) -> Option<&Value> {
        let mut cur = self;
        for seg in segments {
            cur = match cur {
                Value::Mapping(m) => m.get(seg)?,
                Value::Sequence(s) => {
                    let idx: usize = seg.parse().ok()?;
                    s.get(idx)?
                }
                _ => return None,
            };
        }
        Some(cur)
    }

    /// Truthiness used by `$binary` guards and `when` clauses: everything
    /// but `null`, `false`, `0`, `0.0`, and the empty string/sequence/mapping.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Double(d) => *d != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::Mapping(m) => !m.is_empty(),
            Value::Sequence(s) => !s.is_empty(),
            Value::DateTime(_) => true,
            Value::Handle(_) => true,
        }
    }

    /// Deep-merge `patch` on top of `self`: mappings merge key-by-key
    /// recursively, anything else is replaced wholesale. Used by `Transform
    /// … with:`.
    pub fn deep_merge(&self, patch: &Value) -> Value {
        match (self, patch) {
            (Value::Mapping(base), Value::Mapping(over)) => {
                let mut merged = base.clone();
                for (k, v) in over {
                    match merged.get(k) {
                        Some(existing) => {
                            let m = existing.deep_merge(v);
                            merged.insert(k.clone(), m);
                        }
                        None => {
                            merged.insert(k.clone(), v.clone());
                        }
                    }
                }
                Value::Mapping(merged)
            }
            (_, patch) => patch.clone(),
        }
    }

    /// Parse a `serde_json::Value`, preserving the int/double/bool split.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Double(f)
                } else {
                    Value::Null
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(a) => Value::Sequence(a.into_iter().map(Value::from_json).collect()),
            serde_json::Value::Object(o) => {
                let mut map = ValueMap::new();
                for (k, v) in o {
                    map.insert(k, Value::from_json(v));
                }
                Value::Mapping(map)
            }
        }
    }

    /// Render back to `serde_json::Value`. Bytes are base64-encoded since
    /// JSON has no binary type; date-times render as RFC 3339 strings.
    pub fn to_json(&self) -> serde_json::Value {
        use base64::Engine;
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Double(d) => serde_json::Number::from_f64(*d)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(b) => {
                serde_json::Value::String(base64::engine::general_purpose::STANDARD.encode(b))
            }
            Value::Mapping(m) => {
                serde_json::Value::Object(m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
            }
            Value::Sequence(s) => serde_json::Value::Array(s.iter().map(Value::to_json).collect()),
            Value::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
            Value::Handle(h) => serde_json::json!({"$handle": h.kind, "id": h.id}),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
