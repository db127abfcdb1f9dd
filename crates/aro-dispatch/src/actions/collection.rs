// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Map, Filter, Reduce (§4.3) — operate on a sequence via an expression
//! tree carried unevaluated in `_body_` (see `actions` module docs), run
//! once per item against a fresh [`aro_core::ExecutionContext::child_scope`].

use aro_core::{ErrorKind, ExecutionContext, Value};

use crate::descriptor::{ObjectDescriptor, ResultDescriptor};
use crate::registry::ActionOutcome;

use super::support::{fail, navigate, parsed_tree};

fn source_items(object: &ObjectDescriptor, ctx: &ExecutionContext) -> Result<Vec<Value>, String> {
    match navigate(object, ctx)? {
        Value::Sequence(items) => Ok(items),
        other => Err(format!("expected a sequence, found {other:?}")),
    }
}

/// `Map <result> from <collection>` — the item-indexed result of evaluating
/// `_body_` once per item, binding `item` (§4.3).
pub fn map(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let items = match source_items(object, ctx) {
        Ok(items) => items,
        Err(detail) => return fail("Map", result, object, ErrorKind::ComputationError, detail),
    };
    let Some(body) = parsed_tree(ctx, "_body_") else {
        return fail("Map", result, object, ErrorKind::ComputationError, "map needs a body expression");
    };

    let mut mapped = Vec::with_capacity(items.len());
    for item in items {
        let child = ctx.child_scope("map-body");
        child.bind_force("item", item);
        match aro_expr::eval(&body, &child) {
            Ok(v) => mapped.push(v),
            Err(e) => return fail("Map", result, object, ErrorKind::ComputationError, e),
        }
    }
    ActionOutcome::ok(Value::Sequence(mapped))
}

/// `Filter <result> from <collection>` — keeps items for which `_body_`
/// evaluates truthy (§4.3).
pub fn filter(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let items = match source_items(object, ctx) {
        Ok(items) => items,
        Err(detail) => return fail("Filter", result, object, ErrorKind::ComputationError, detail),
    };
    let Some(body) = parsed_tree(ctx, "_body_") else {
        return fail("Filter", result, object, ErrorKind::ComputationError, "filter needs a body expression");
    };

    let mut kept = Vec::new();
    for item in items {
        let child = ctx.child_scope("filter-body");
        child.bind_force("item", item.clone());
        match aro_expr::eval(&body, &child) {
            Ok(v) if v.is_truthy() => kept.push(item),
            Ok(_) => {}
            Err(e) => return fail("Filter", result, object, ErrorKind::ComputationError, e),
        }
    }
    ActionOutcome::ok(Value::Sequence(kept))
}

/// `Reduce <result> from <collection>` — folds `_body_` over the sequence,
/// binding `item` and `accumulator`; the object's sole specifier, when
/// present, is the seed (defaults to `null`) (§4.3).
pub fn reduce(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let items = match source_items(object, ctx) {
        Ok(items) => items,
        Err(detail) => return fail("Reduce", result, object, ErrorKind::ComputationError, detail),
    };
    let Some(body) = parsed_tree(ctx, "_body_") else {
        return fail("Reduce", result, object, ErrorKind::ComputationError, "reduce needs a body expression");
    };

    let mut accumulator = object.specifiers.first().and_then(|name| ctx.resolve(name)).unwrap_or(Value::Null);
    for item in items {
        let child = ctx.child_scope("reduce-body");
        child.bind_force("item", item);
        child.bind_force("accumulator", accumulator.clone());
        match aro_expr::eval(&body, &child) {
            Ok(v) => accumulator = v,
            Err(e) => return fail("Reduce", result, object, ErrorKind::ComputationError, e),
        }
    }
    ActionOutcome::ok(accumulator)
}

#[cfg(test)]
#[path = "collection_tests.rs"]
mod tests;
