// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository store (§3, §4.3 Store/Retrieve/Delete).
//!
//! A repository is an append-and-query store of entities (mappings), keyed
//! by `(businessActivity, name)` where `name` ends in `-repository`. Each
//! repository instance is serialised by its own lock (§5) so reads never
//! tear; mutation is left to the caller to pair with an emitted
//! `RepositoryChanged` event (the repository itself has no event-bus
//! dependency — see [`crate::event::EventPublisher`]'s doc comment for why).

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::value::Value;

/// A single repository: an ordered sequence of entities.
#[derive(Default)]
pub struct Repository {
    entities: RwLock<Vec<Value>>,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, entity: Value) {
        self.entities.write().push(entity);
    }

    pub fn retrieve_all(&self) -> Vec<Value> {
        self.entities.read().clone()
    }

    pub fn retrieve_by(&self, predicate: impl Fn(&Value) -> bool) -> Vec<Value> {
        self.entities.read().iter().filter(|e| predicate(e)).cloned().collect()
    }

    /// Remove every entity matching `predicate`; returns how many were removed.
    pub fn delete_by(&self, predicate: impl Fn(&Value) -> bool) -> usize {
        let mut guard = self.entities.write();
        let before = guard.len();
        guard.retain(|e| !predicate(e));
        before - guard.len()
    }

    pub fn count(&self) -> usize {
        self.entities.read().len()
    }
}

/// Identifies a repository by its owning business activity and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryKey {
    pub business_activity: String,
    pub name: String,
}

impl RepositoryKey {
    pub fn new(business_activity: impl Into<String>, name: impl Into<String>) -> Self {
        Self { business_activity: business_activity.into(), name: name.into() }
    }
}

/// Returns true when `name` has the `-repository` suffix that marks a
/// binding as a repository target rather than a plain variable (§3, §4.3).
pub fn is_repository_name(name: &str) -> bool {
    name.ends_with("-repository")
}

/// Process-wide registry of repositories, keyed by `(businessActivity,
/// name)`. Registration under the key lock is startup-cheap; everyday
/// reads/writes go straight to the per-repository lock (§5).
#[derive(Default)]
pub struct RepositoryRegistry {
    repositories: RwLock<HashMap<RepositoryKey, Arc<Repository>>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch or lazily create the named repository.
    pub fn get_or_create(&self, key: RepositoryKey) -> Arc<Repository> {
        if let Some(repo) = self.repositories.read().get(&key) {
            return Arc::clone(repo);
        }
        let mut guard = self.repositories.write();
        Arc::clone(guard.entry(key).or_insert_with(|| Arc::new(Repository::new())))
    }

    pub fn get(&self, key: &RepositoryKey) -> Option<Arc<Repository>> {
        self.repositories.read().get(key).map(Arc::clone)
    }
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
