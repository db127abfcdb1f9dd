// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Route table and pattern matching (§3 Route Entry, §4.6.2).
//!
//! Written once at startup, read lock-free thereafter (§5 "Route table...
//! written at startup only").

use aro_core::ValueMap;

/// `(method, path-pattern, operationId)` (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub method: String,
    pub pattern: String,
    pub operation_id: String,
}

impl RouteEntry {
    pub fn new(method: impl Into<String>, pattern: impl Into<String>, operation_id: impl Into<String>) -> Self {
        Self { method: method.into(), pattern: pattern.into(), operation_id: operation_id.into() }
    }
}

/// First-registered-wins route table (§4.6.2: "Longer/more-specific
/// patterns are not preferred over shorter ones; the first registered
/// matching route wins").
#[derive(Debug, Default, Clone)]
pub struct RouteTable {
    routes: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, route: RouteEntry) {
        self.routes.push(route);
    }

    /// Match `method` and `path` (query string already stripped by the
    /// caller) against the table in registration order. Returns the
    /// matched route's `operationId` and the captured path parameters.
    pub fn match_route(&self, method: &str, path: &str) -> Option<(&str, ValueMap)> {
        for route in &self.routes {
            if !route.method.eq_ignore_ascii_case(method) {
                continue;
            }
            if let Some(params) = match_pattern(&route.pattern, path) {
                return Some((route.operation_id.as_str(), params));
            }
        }
        None
    }
}

/// A pattern matches a path when their segment counts are equal and every
/// pair either matches literally or the pattern segment is `{name}`, which
/// binds (§4.6.2). An empty captured segment (trailing slash) does not
/// match — `/u/{id}` against `/u/` fails because the `id` segment is empty.
fn match_pattern(pattern: &str, path: &str) -> Option<ValueMap> {
    let pattern_segments: Vec<&str> = pattern.trim_start_matches('/').split('/').collect();
    let path_segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = ValueMap::new();
    for (pat, actual) in pattern_segments.iter().zip(path_segments.iter()) {
        if let Some(name) = pat.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            if actual.is_empty() {
                return None;
            }
            params.insert(name.to_string(), aro_core::Value::string(*actual));
        } else if pat != actual {
            return None;
        }
    }
    Some(params)
}

/// Strip the query string from a request-target path (§4.6.2).
pub fn strip_query(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;
