// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error taxonomy of §7: every failed action installs one of these
//! kinds into the context's error slot. The runtime offers no try/catch —
//! a feature set that wants to tolerate failure must branch on a validator
//! or existence check *before* the failing action.

use serde::{Deserialize, Serialize};

/// Which contract was violated. `ValidationFailed` is deliberately absent —
/// `Validate` never stores an error, it binds a sibling `validation` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    PropertyMissing,
    RepositoryEmpty,
    ComputationError,
    NetworkError,
    ThrownError,
    SchemaMismatch,
    InternalError,
}

impl ErrorKind {
    /// The HTTP layer's default status mapping (§7). `ThrownError` maps via
    /// [`ExecutionError::thrown_type`] first; this is only the fallback.
    pub fn default_http_status(self) -> u16 {
        match self {
            ErrorKind::PropertyMissing => 400,
            ErrorKind::RepositoryEmpty => 404,
            ErrorKind::ComputationError => 500,
            ErrorKind::NetworkError => 503,
            ErrorKind::ThrownError => 500,
            ErrorKind::SchemaMismatch => 500,
            ErrorKind::InternalError => 500,
        }
    }
}

/// An error installed into a context's error slot. `message` is already the
/// fully-rendered "the code is the error message" string (§4.2 step 5,
/// §7): the original source statement with every referenced variable
/// substituted by its resolved value, prefixed with `Cannot `.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ExecutionError {
    pub kind: ErrorKind,
    pub message: String,
    /// For `ThrownError`: the first word of the thrown type, used as an
    /// HTTP-status hint per Open Question 2 (`NotFound*` → 404, etc.).
    pub thrown_type: Option<String>,
}

impl ExecutionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), thrown_type: None }
    }

    pub fn thrown(thrown_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind: ErrorKind::ThrownError, message: message.into(), thrown_type: Some(thrown_type.into()) }
    }

    /// Render `Cannot <statement with resolved values>`.
    pub fn render(kind: ErrorKind, statement_text: &str) -> Self {
        Self::new(kind, format!("Cannot {statement_text}"))
    }

    /// HTTP status per §7: thrown types are mapped by first-word hint
    /// (Open Question 2), everything else by [`ErrorKind::default_http_status`].
    pub fn http_status(&self) -> u16 {
        if self.kind == ErrorKind::ThrownError {
            if let Some(hint) = &self.thrown_type {
                return thrown_type_status_hint(hint);
            }
        }
        self.kind.default_http_status()
    }
}

/// First-word-of-thrown-type heuristic (Open Question 2): `NotFoundError`
/// and `NotFoundException` both hint 404, `ValidationError` hints 422, etc.
fn thrown_type_status_hint(thrown_type: &str) -> u16 {
    let lower = thrown_type.to_ascii_lowercase();
    if lower.starts_with("notfound") {
        404
    } else if lower.starts_with("validation") {
        422
    } else if lower.starts_with("unauthorized") || lower.starts_with("authentication") {
        401
    } else if lower.starts_with("forbidden") || lower.starts_with("permission") {
        403
    } else if lower.starts_with("conflict") {
        409
    } else if lower.starts_with("badrequest") || lower.starts_with("invalid") {
        400
    } else if lower.starts_with("unavailable") || lower.starts_with("timeout") {
        503
    } else {
        500
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
