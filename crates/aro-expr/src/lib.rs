// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Pure evaluator for the JSON-tree expression language of §4.4: variable
//! references, binary operators, string interpolation, and object/array
//! literals, evaluated against an [`aro_core::ExecutionContext`].

mod interpolate;
mod ops;

use aro_core::repository::RepositoryKey;
use aro_core::{ExecutionContext, Value, ValueMap};
use thiserror::Error;

pub use ops::{apply as apply_binary_op, BinaryOp};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprError {
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
    #[error("malformed expression node: {0}")]
    MalformedNode(String),
    #[error("unsupported operator '{0}'")]
    UnsupportedOperator(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("invalid regular expression: {0}")]
    InvalidRegex(String),
    #[error("cannot interpolate '{0}'")]
    Interpolation(String),
}

/// Evaluate a JSON expression tree against `ctx` (§4.4). Pure except that
/// `$var` reads through the context's scope chain and published bindings.
pub fn eval(node: &serde_json::Value, ctx: &ExecutionContext) -> Result<Value, ExprError> {
    match node {
        serde_json::Value::Object(map) => {
            if let Some(lit) = map.get("$lit") {
                return Ok(Value::from_json(lit.clone()));
            }
            if let Some(name) = map.get("$var") {
                let name = name.as_str().ok_or_else(|| ExprError::MalformedNode("$var must be a string".into()))?;
                let specs = map
                    .get("$specs")
                    .and_then(|s| s.as_array())
                    .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect::<Vec<_>>())
                    .unwrap_or_default();
                return eval_var(name, &specs, ctx);
            }
            if let Some(binary) = map.get("$binary") {
                return eval_binary(binary, ctx);
            }
            if let Some(template) = map.get("$interpolated") {
                let template = template
                    .as_str()
                    .ok_or_else(|| ExprError::MalformedNode("$interpolated must be a string".into()))?;
                return Ok(Value::string(interpolate::interpolate(template, ctx)?));
            }
            // Plain object literal: recursively evaluate every value.
            let mut out = ValueMap::new();
            for (k, v) in map {
                out.insert(k.clone(), eval(v, ctx)?);
            }
            Ok(Value::Mapping(out))
        }
        serde_json::Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(eval(item, ctx)?);
            }
            Ok(Value::Sequence(out))
        }
        // A bare scalar node is its own literal.
        other => Ok(Value::from_json(other.clone())),
    }
}

fn eval_var(name: &str, specs: &[String], ctx: &ExecutionContext) -> Result<Value, ExprError> {
    if specs == ["count"] && aro_core::repository::is_repository_name(name) {
        if let Some(registry) = ctx.repositories() {
            let key = RepositoryKey::new(ctx.business_activity.clone(), name.to_string());
            // An empty (never-written-to) repository still counts as 0, not
            // an unknown variable (§8 "Empty repository: <r: count> returns 0").
            let count = registry.get(&key).map(|repo| repo.count()).unwrap_or(0);
            return Ok(Value::Int(count as i64));
        }
    }

    let base = ctx.resolve(name).ok_or_else(|| ExprError::UnknownVariable(name.to_string()))?;
    if specs.is_empty() {
        return Ok(base);
    }
    base.get_path(specs).cloned().ok_or_else(|| ExprError::UnknownVariable(format!("{name}.{}", specs.join("."))))
}

fn eval_binary(node: &serde_json::Value, ctx: &ExecutionContext) -> Result<Value, ExprError> {
    let op = node
        .get("op")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ExprError::MalformedNode("$binary requires 'op'".into()))?;
    let left_node = node.get("left").ok_or_else(|| ExprError::MalformedNode("$binary requires 'left'".into()))?;
    let right_node = node.get("right").ok_or_else(|| ExprError::MalformedNode("$binary requires 'right'".into()))?;
    let left = eval(left_node, ctx)?;
    let right = eval(right_node, ctx)?;
    let op = BinaryOp::parse(op).ok_or_else(|| ExprError::UnsupportedOperator(op.to_string()))?;
    ops::apply(op, &left, &right)
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
