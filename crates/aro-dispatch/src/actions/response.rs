// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Return, Throw (§4.3) — the two `response` semantic-role verbs. Neither
//! binds a result; both terminate the activation (§4.2 semantic role table).

use aro_core::{ExecutionContext, ResponseStatus, Value, ValueMap};

use crate::descriptor::{ObjectDescriptor, ResultDescriptor};
use crate::registry::ActionOutcome;

use super::support::expression;

/// `Return <result: status> with <data>` — installs a Response and stops the
/// activation (§3 Activation state, §4.3). The result descriptor's base
/// names the status (case-insensitively); unrecognized names fall back to
/// `Ok`.
pub fn return_(result: &ResultDescriptor, _object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let status = status_from_name(&result.base);
    let data = match expression(ctx) {
        Some(Value::Mapping(m)) => m,
        Some(other) => {
            let mut m = ValueMap::new();
            m.insert("value".into(), other);
            m
        }
        None => ValueMap::new(),
    };
    ctx.set_response(status, data.clone());
    ActionOutcome::ok(Value::Mapping(data))
}

fn status_from_name(name: &str) -> ResponseStatus {
    match name.to_ascii_lowercase().as_str() {
        "ok" | "success" => ResponseStatus::Ok,
        "created" => ResponseStatus::Created,
        "accepted" => ResponseStatus::Accepted,
        "nocontent" | "no-content" => ResponseStatus::NoContent,
        "badrequest" | "bad-request" => ResponseStatus::BadRequest,
        "unauthorized" => ResponseStatus::Unauthorized,
        "forbidden" => ResponseStatus::Forbidden,
        "notfound" | "not-found" => ResponseStatus::NotFound,
        "conflict" => ResponseStatus::Conflict,
        "unprocessableentity" | "unprocessable-entity" => ResponseStatus::UnprocessableEntity,
        "serviceunavailable" | "service-unavailable" => ResponseStatus::ServiceUnavailable,
        "error" | "internalerror" | "internal-error" => ResponseStatus::InternalError,
        _ => ResponseStatus::Ok,
    }
}

/// `Throw <result: type> with <reason>` — installs a `ThrownError` with
/// `(type, reason)`; `result.base` is the thrown type name (§4.3, §7). The
/// condition named in the spec's `(type, reason, condition)` triple is the
/// statement's own `when` guard, already consulted by the dispatcher before
/// this implementation runs (§4.2 step 2) — there is nothing further to
/// record here.
pub fn throw(result: &ResultDescriptor, _object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let reason = match expression(ctx) {
        Some(Value::String(s)) => s,
        Some(other) => other.to_json().to_string(),
        None => format!("{} thrown", result.base),
    };
    ctx.set_thrown_error(result.base.clone(), reason);
    ActionOutcome::ok_unbound()
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
