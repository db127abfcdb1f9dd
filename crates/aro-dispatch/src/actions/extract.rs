// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Extract, Retrieve, Fetch/Request, Read, Parse (§4.3).

use std::time::Duration;

use aro_core::repository::RepositoryKey;
use aro_core::{ErrorKind, ExecutionContext, Value, ValueMap};

use crate::descriptor::{ObjectDescriptor, Preposition, ResultDescriptor};
use crate::registry::ActionOutcome;

use super::support::{expression, fail, navigate, parsed_tree};

/// `Extract <result> from <object>` — navigates property paths through both
/// plain mappings and the implicitly-bound request dictionary (§4.3).
pub fn extract(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    match navigate(object, ctx) {
        Ok(value) => ActionOutcome::ok(value),
        Err(detail) => fail("Extract", result, object, ErrorKind::PropertyMissing, detail),
    }
}

/// `Retrieve <result> from <repo>[ where <predicate>]` — repositories get
/// all-or-filtered retrieval; anything else is an Extract alias (§4.3).
pub fn retrieve(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    if !aro_core::repository::is_repository_name(&object.base) {
        return extract(result, object, ctx);
    }

    let Some(registry) = ctx.repositories() else {
        return fail("Retrieve", result, object, ErrorKind::InternalError, "no repository registry attached to this context");
    };
    let key = RepositoryKey::new(ctx.business_activity.clone(), object.base.clone());
    let Some(repo) = registry.get(&key) else {
        return ActionOutcome::ok(Value::Sequence(Vec::new()));
    };

    let predicate = parsed_tree(ctx, "_predicate_");
    let items = match predicate {
        None => repo.retrieve_all(),
        Some(tree) => repo.retrieve_by(|entity| {
            let child = ctx.child_scope("retrieve-predicate");
            child.bind_force("item", entity.clone());
            matches!(aro_expr::eval(&tree, &child), Ok(v) if v.is_truthy())
        }),
    };
    ActionOutcome::ok(Value::Sequence(items))
}

/// `Fetch/Request <result> from|to|via <METHOD> <object>` — an HTTP request
/// whose body comes from `_expression_` (§4.3). `from` = GET, `to` = POST,
/// `via METHOD` names the method explicitly. 30s timeout per §4.3/§5.
pub fn fetch(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let Some(url) = ctx.resolve(&object.base).and_then(|v| v.as_str().map(str::to_string)) else {
        return fail("Fetch", result, object, ErrorKind::PropertyMissing, "request target did not resolve to a string URL");
    };

    let method = match object.preposition {
        Preposition::From => "GET".to_string(),
        Preposition::To => "POST".to_string(),
        Preposition::Via => object.specifiers.first().cloned().unwrap_or_else(|| "GET".to_string()),
        _ => "GET".to_string(),
    };

    let client = match reqwest::blocking::Client::builder().timeout(Duration::from_secs(30)).build() {
        Ok(c) => c,
        Err(e) => return fail("Fetch", result, object, ErrorKind::NetworkError, e),
    };

    let method = match method.to_ascii_uppercase().parse::<reqwest::Method>() {
        Ok(m) => m,
        Err(_) => reqwest::Method::GET,
    };
    let mut builder = client.request(method, &url);
    if let Some(body) = expression(ctx) {
        if !body.is_null() {
            builder = builder.json(&body.to_json());
        }
    }

    // Release this thread's gate slot for the request/response round trip
    // (§4.5 "Yielding while blocked") — otherwise a thread parked here for
    // up to 30s starves every other dispatched delivery of this slot.
    let sent = ctx.yield_while_blocked(move || -> Result<(u16, bool, ValueMap, String), reqwest::Error> {
        let response = builder.send()?;
        let status_code = response.status().as_u16();
        let is_success = response.status().is_success();
        let mut headers = ValueMap::new();
        for (name, value) in response.headers().iter() {
            headers.insert(name.to_string(), Value::string(value.to_str().unwrap_or_default()));
        }
        let body_text = response.text()?;
        Ok((status_code, is_success, headers, body_text))
    });
    let (status_code, is_success, headers, body_text) = match sent {
        Ok(v) => v,
        Err(e) => return fail("Fetch", result, object, ErrorKind::NetworkError, e),
    };
    let body = serde_json::from_str::<serde_json::Value>(&body_text).map(Value::from_json).unwrap_or_else(|_| Value::string(body_text));

    let mut out = ValueMap::new();
    out.insert("body".into(), body);
    out.insert("statusCode".into(), Value::Int(status_code as i64));
    out.insert("headers".into(), Value::Mapping(headers));
    out.insert("isSuccess".into(), Value::Bool(is_success));
    ActionOutcome::ok(Value::Mapping(out))
}

/// `Read <result> from <path>` — raw bytes, or parsed JSON when the result
/// descriptor's specifier hints `json` (§4.3).
pub fn read(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let Some(path) = ctx.resolve(&object.base).and_then(|v| v.as_str().map(str::to_string)) else {
        return fail("Read", result, object, ErrorKind::PropertyMissing, "read target did not resolve to a path string");
    };
    let bytes = match std::fs::read(&path) {
        Ok(b) => b,
        Err(e) => return fail("Read", result, object, ErrorKind::InternalError, e),
    };
    let wants_json = result.specifiers.iter().any(|s| s.eq_ignore_ascii_case("json"));
    if wants_json {
        match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(v) => ActionOutcome::ok(Value::from_json(v)),
            Err(e) => fail("Read", result, object, ErrorKind::InternalError, e),
        }
    } else {
        ActionOutcome::ok(Value::Bytes(bytes))
    }
}

/// `Parse <result> from <object>` — parses the source string per the result
/// descriptor's type hint (json/xml/date) (§4.3).
pub fn parse(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let Some(text) = navigate(object, ctx).ok().or_else(|| expression(ctx)).and_then(|v| v.as_str().map(str::to_string)) else {
        return fail("Parse", result, object, ErrorKind::ComputationError, "nothing to parse resolved to a string");
    };

    let hint = result.primary_specifier().unwrap_or("json").to_ascii_lowercase();
    match hint.as_str() {
        "date" => match chrono::DateTime::parse_from_rfc3339(&text) {
            Ok(dt) => ActionOutcome::ok(Value::DateTime(dt.with_timezone(&chrono::Utc))),
            Err(e) => fail("Parse", result, object, ErrorKind::ComputationError, e),
        },
        "xml" => {
            // XML is not otherwise represented in the value model; surface it
            // as a single-key mapping so downstream Extract/Compute can still
            // reach the raw markup without a dedicated node type.
            let mut m = ValueMap::new();
            m.insert("xml".into(), Value::string(text));
            ActionOutcome::ok(Value::Mapping(m))
        }
        _ => match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(v) => ActionOutcome::ok(Value::from_json(v)),
            Err(e) => fail("Parse", result, object, ErrorKind::ComputationError, e),
        },
    }
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
