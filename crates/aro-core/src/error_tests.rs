// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn render_prefixes_with_cannot() {
    let err = ExecutionError::render(ErrorKind::PropertyMissing, "extract email from request");
    assert_eq!(err.message, "Cannot extract email from request");
}

#[parameterized(
    property_missing = { ErrorKind::PropertyMissing, 400 },
    repository_empty = { ErrorKind::RepositoryEmpty, 404 },
    network = { ErrorKind::NetworkError, 503 },
    internal = { ErrorKind::InternalError, 500 },
)]
fn default_status_mapping(kind: ErrorKind, expected: u16) {
    assert_eq!(kind.default_http_status(), expected);
}

#[parameterized(
    not_found = { "NotFoundError", 404 },
    validation = { "ValidationError", 422 },
    unauthorized = { "UnauthorizedError", 401 },
    forbidden = { "ForbiddenError", 403 },
    conflict = { "ConflictError", 409 },
    unknown_defaults_500 = { "WeirdCustomError", 500 },
)]
fn thrown_error_status_hint(thrown_type: &str, expected: u16) {
    let err = ExecutionError::thrown(thrown_type, "something went wrong");
    assert_eq!(err.http_status(), expected);
}
