// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Verb dispatch (§4.2): the table mapping a lowercased verb name to an
//! implementation, the semantic-role table that decides binding/terminal
//! behavior, and the six-step dispatch algorithm itself.

use std::collections::HashMap;

use aro_core::{BindError, ErrorKind, ExecutionContext, Value};

use crate::descriptor::{ObjectDescriptor, ResultDescriptor};

/// What a verb implementation reports back to the dispatcher (§4.2).
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub succeeded: bool,
    pub value: Option<Value>,
    /// Present on failure; `(kind, rendered detail)`. The dispatcher
    /// prefixes the detail with `Cannot ` when it installs it (§4.2 step 5,
    /// §7) unless the implementation already did so (thrown errors render
    /// their own message).
    pub error: Option<(ErrorKind, String)>,
}

impl ActionOutcome {
    pub fn ok(value: Value) -> Self {
        Self { succeeded: true, value: Some(value), error: None }
    }

    pub fn ok_unbound() -> Self {
        Self { succeeded: true, value: None, error: None }
    }

    pub fn fail(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self { succeeded: false, value: None, error: Some((kind, detail.into())) }
    }
}

/// Determines binding and termination behavior for a verb (§4.2 semantic
/// role table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticRole {
    Request,
    Own,
    Response,
    Export,
    Service,
}

impl SemanticRole {
    /// Whether the dispatcher should bind the outcome's value into
    /// `result.base` when the implementation didn't already bind it.
    pub fn binds_result(self) -> bool {
        matches!(self, SemanticRole::Request | SemanticRole::Own)
    }
}

pub type VerbFn =
    fn(&ResultDescriptor, &ObjectDescriptor, &ExecutionContext) -> ActionOutcome;

struct VerbEntry {
    role: SemanticRole,
    implementation: VerbFn,
}

/// The process-wide verb table: verb name (already lowercased) → role +
/// implementation. Built once at startup (§5: "written at startup only,
/// thereafter read-only").
#[derive(Default)]
pub struct VerbTable {
    verbs: HashMap<String, VerbEntry>,
}

impl VerbTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, verb: &str, role: SemanticRole, implementation: VerbFn) {
        self.verbs.insert(verb.to_ascii_lowercase(), VerbEntry { role, implementation });
    }

    pub fn role_of(&self, verb: &str) -> Option<SemanticRole> {
        self.verbs.get(&verb.to_ascii_lowercase()).map(|e| e.role)
    }

    /// Run the six-step dispatch algorithm (§4.2) for one compiled
    /// statement. `guard` is the statement's optional `when` expression,
    /// already evaluated by the caller into a truthiness flag — step 2 just
    /// consults it.
    pub fn dispatch(
        &self,
        verb: &str,
        result: &ResultDescriptor,
        object: &ObjectDescriptor,
        context: &ExecutionContext,
        guard_passed: bool,
    ) -> ActionOutcome {
        let lowered = verb.to_ascii_lowercase();
        let Some(entry) = self.verbs.get(&lowered) else {
            context.set_execution_error(
                ErrorKind::InternalError,
                format!("Cannot dispatch unknown verb '{verb}'"),
            );
            return ActionOutcome { succeeded: false, value: None, error: None };
        };

        if !guard_passed {
            context.unbind("_expression_");
            context.unbind("_literal_");
            return ActionOutcome::ok_unbound();
        }

        let outcome = (entry.implementation)(result, object, context);

        if outcome.succeeded {
            if entry.role.binds_result() {
                if let Some(value) = outcome.value.clone() {
                    if let Err(BindError::ImmutableRebind) = context.bind(&result.base, value.clone()) {
                        // The implementation may have already bound
                        // `result.base` to this exact value itself (step 4's
                        // "unless the implementation already bound it") —
                        // that's not an error. A different value already
                        // occupying the name is a genuine collision, and
                        // non-Set/Configure verbs fail closed on rebind
                        // (Open Question 1).
                        if context.resolve(&result.base).as_ref() != Some(&value) {
                            context.set_execution_error(
                                ErrorKind::InternalError,
                                format!("Cannot bind result '{}': already bound to a different value", result.base),
                            );
                        }
                    }
                }
            }
        } else if let Some((kind, detail)) = &outcome.error {
            context.set_execution_error(*kind, format!("Cannot {detail}"));
        }

        context.unbind("_expression_");
        context.unbind("_literal_");

        outcome
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
