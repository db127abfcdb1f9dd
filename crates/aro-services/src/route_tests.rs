// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn literal_path_matches_exactly() {
    let mut table = RouteTable::new();
    table.register(RouteEntry::new("GET", "/health", "getHealth"));
    let (op, params) = table.match_route("GET", "/health").expect("should match");
    assert_eq!(op, "getHealth");
    assert!(params.is_empty());
}

#[test]
fn path_parameter_segment_binds_the_captured_text() {
    let mut table = RouteTable::new();
    table.register(RouteEntry::new("GET", "/users/{id}", "getUser"));
    let (op, params) = table.match_route("GET", "/users/42").expect("should match");
    assert_eq!(op, "getUser");
    assert_eq!(params.get("id").and_then(|v| v.as_str()), Some("42"));
}

#[test]
fn missing_path_parameter_segment_does_not_match() {
    let mut table = RouteTable::new();
    table.register(RouteEntry::new("GET", "/u/{id}", "getUser"));
    assert!(table.match_route("GET", "/u/").is_none());
}

#[test]
fn method_mismatch_does_not_match() {
    let mut table = RouteTable::new();
    table.register(RouteEntry::new("GET", "/users/{id}", "getUser"));
    assert!(table.match_route("POST", "/users/42").is_none());
}

#[test]
fn first_registered_matching_route_wins() {
    let mut table = RouteTable::new();
    table.register(RouteEntry::new("GET", "/users/{id}", "getUserGeneric"));
    table.register(RouteEntry::new("GET", "/users/me", "getUserMe"));
    let (op, _) = table.match_route("GET", "/users/me").expect("should match");
    assert_eq!(op, "getUserGeneric", "the earlier, more-generic registration must win");
}

#[test]
fn strip_query_removes_trailing_query_string() {
    assert_eq!(strip_query("/users/42?verbose=true"), "/users/42");
    assert_eq!(strip_query("/users/42"), "/users/42");
}
