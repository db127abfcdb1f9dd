// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers used across the action-implementation modules.

use aro_core::{ErrorKind, ExecutionContext, Value};

use crate::descriptor::{ObjectDescriptor, ResultDescriptor};
use crate::registry::ActionOutcome;

/// Render `Cannot <verb> <result.base> <preposition> <object.base>` the way
/// the dispatcher's error contract expects (§4.2 step 5, §7): the caller
/// fills in the `detail` with whatever's specific to the failure, this just
/// keeps the "the code is the error message" framing consistent across verbs.
pub(crate) fn statement_text(verb: &str, result: &ResultDescriptor, object: &ObjectDescriptor) -> String {
    let result_part = if result.specifiers.is_empty() {
        result.base.clone()
    } else {
        format!("<{}: {}>", result.base, result.specifiers.join(": "))
    };
    format!("{verb} {result_part} {} {}", preposition_word(object.preposition), object.base)
}

pub(crate) fn preposition_word(p: crate::descriptor::Preposition) -> &'static str {
    use crate::descriptor::Preposition::*;
    match p {
        From => "from",
        For => "for",
        With => "with",
        To => "to",
        Into => "into",
        Via => "via",
        Against => "against",
        On => "on",
    }
}

/// Resolve `object.base` then navigate `object.specifiers` (§4.3 Extract).
/// Fails with `PropertyMissing` when any segment is absent — including when
/// the base itself doesn't resolve.
pub(crate) fn navigate(object: &ObjectDescriptor, ctx: &ExecutionContext) -> Result<Value, String> {
    let base = ctx.resolve(&object.base).ok_or_else(|| format!("property '{}' is missing", object.base))?;
    if object.specifiers.is_empty() {
        return Ok(base);
    }
    base.get_path(&object.specifiers)
        .cloned()
        .ok_or_else(|| format!("property '{}.{}' is missing", object.base, object.specifiers.join(".")))
}

/// The pre-evaluated expression bound by the dispatch caller before this
/// verb ran (§4.2 step 2), if any.
pub(crate) fn expression(ctx: &ExecutionContext) -> Option<Value> {
    ctx.resolve("_expression_")
}

pub(crate) fn literal(ctx: &ExecutionContext) -> Option<Value> {
    ctx.resolve("_literal_")
}

/// Parse an unevaluated expression tree carried as JSON text in
/// `_predicate_`/`_body_` (see `actions` module docs).
pub(crate) fn parsed_tree(ctx: &ExecutionContext, binding: &str) -> Option<serde_json::Value> {
    let raw = ctx.resolve(binding)?;
    let text = raw.as_str()?;
    serde_json::from_str(text).ok()
}

pub(crate) fn fail(verb: &str, result: &ResultDescriptor, object: &ObjectDescriptor, kind: ErrorKind, detail: impl std::fmt::Display) -> ActionOutcome {
    ActionOutcome::fail(kind, format!("{}: {}", statement_text(verb, result, object), detail))
}
