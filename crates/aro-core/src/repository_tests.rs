// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn empty_repository_retrieves_empty_sequence_and_zero_count() {
    let repo = Repository::new();
    assert!(repo.retrieve_all().is_empty());
    assert_eq!(repo.count(), 0);
}

#[test]
fn append_then_retrieve_preserves_insertion_order() {
    let repo = Repository::new();
    repo.append(Value::string("a"));
    repo.append(Value::string("b"));
    assert_eq!(repo.retrieve_all(), vec![Value::string("a"), Value::string("b")]);
    assert_eq!(repo.count(), 2);
}

#[test]
fn retrieve_by_predicate_filters() {
    let repo = Repository::new();
    repo.append(Value::Int(1));
    repo.append(Value::Int(2));
    repo.append(Value::Int(3));
    let evens = repo.retrieve_by(|v| v.as_int().map(|i| i % 2 == 0).unwrap_or(false));
    assert_eq!(evens, vec![Value::Int(2)]);
}

#[test]
fn delete_by_predicate_removes_matches_and_reports_count() {
    let repo = Repository::new();
    repo.append(Value::Int(1));
    repo.append(Value::Int(2));
    let removed = repo.delete_by(|v| v == &Value::Int(1));
    assert_eq!(removed, 1);
    assert_eq!(repo.retrieve_all(), vec![Value::Int(2)]);
}

#[test]
fn is_repository_name_requires_suffix() {
    assert!(is_repository_name("order-repository"));
    assert!(!is_repository_name("order"));
}

#[test]
fn registry_returns_same_instance_for_same_key() {
    let registry = RepositoryRegistry::new();
    let key = RepositoryKey::new("orders", "order-repository");
    let a = registry.get_or_create(key.clone());
    a.append(Value::Int(1));
    let b = registry.get_or_create(key);
    assert_eq!(b.count(), 1);
}

#[test]
fn registry_keeps_activities_separate() {
    let registry = RepositoryRegistry::new();
    let a = registry.get_or_create(RepositoryKey::new("orders", "item-repository"));
    let b = registry.get_or_create(RepositoryKey::new("billing", "item-repository"));
    a.append(Value::Int(1));
    assert_eq!(a.count(), 1);
    assert_eq!(b.count(), 0);
}
