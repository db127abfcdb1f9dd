// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The feature-set execution harness (`SPEC_FULL.md` §0 "interpreter
//! mode"): a native-Rust [`Statement`] shape and a runner that performs the
//! same six-step dispatch sequence `aro-abi`'s compiled-C callers are
//! expected to perform themselves (evaluate the `when` guard, pre-evaluate
//! `_expression_`/`_literal_`, dispatch the verb, let the table bind the
//! result), grounded directly on `aro-abi::action::aro_execute_action` and
//! `aro-abi::expr`'s `evaluate_expression`/`evaluate_when_guard` — the same
//! algorithm, without the C string marshalling, for hosts and tests that
//! describe a feature set as data rather than linking a compiled binary.

use aro_core::{ExecutionContext, Value};
use aro_dispatch::{ActionOutcome, ObjectDescriptor, Preposition, ResultDescriptor, VerbTable};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatementError {
    #[error("unknown preposition '{0}'")]
    UnknownPreposition(String),
    #[error("failed to evaluate the 'when' guard: {0}")]
    GuardEvaluation(#[from] aro_expr::ExprError),
    #[error("failed to evaluate the expression: {0}")]
    Expression(aro_expr::ExprError),
}

/// One compiled statement's operands (§4.2), expressed as data instead of a
/// C struct pair. Deserializable so a feature set can be authored as a JSON
/// fixture in tests.
#[derive(Debug, Clone, Deserialize)]
pub struct Statement {
    pub verb: String,
    pub result: StatementResult,
    pub object: StatementObject,
    /// The `when` guard's expression tree (§4.2 step 2), evaluated for
    /// truthiness. Absent means "no guard", i.e. always passes.
    #[serde(default)]
    pub when: Option<serde_json::Value>,
    /// An expression tree evaluated through `aro_expr::eval` and bound to
    /// `_expression_` before dispatch (§4.2 step 3).
    #[serde(default)]
    pub expression: Option<serde_json::Value>,
    /// A value bound to `_literal_` as-is, with no expression evaluation —
    /// the pre-evaluated fast path `Create`/`Set` prefer for a plain literal
    /// (§4.3 `Create`).
    #[serde(default)]
    pub literal: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatementResult {
    pub base: String,
    #[serde(default)]
    pub specifiers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatementObject {
    pub preposition: String,
    pub base: String,
    #[serde(default)]
    pub specifiers: Vec<String>,
}

/// Run one statement against `ctx` (§4.2's six steps, minus the ABI's
/// wire-format conversion): evaluate the guard, pre-evaluate
/// `_expression_`/`_literal_` when the guard passes, dispatch through
/// `verbs`, and let `VerbTable::dispatch` perform steps 4-6 (bind-if-role,
/// set the error slot, clear the statement-scoped bindings).
pub fn run_statement(verbs: &VerbTable, statement: &Statement, ctx: &ExecutionContext) -> Result<ActionOutcome, StatementError> {
    let preposition = Preposition::from_word(&statement.object.preposition)
        .ok_or_else(|| StatementError::UnknownPreposition(statement.object.preposition.clone()))?;
    let result = ResultDescriptor::new(statement.result.base.clone(), statement.result.specifiers.clone());
    let object = ObjectDescriptor::new(preposition, statement.object.base.clone(), statement.object.specifiers.clone());

    let guard_passed = match &statement.when {
        Some(node) => aro_expr::eval(node, ctx)?.is_truthy(),
        None => true,
    };

    if guard_passed {
        if let Some(node) = &statement.expression {
            let value = aro_expr::eval(node, ctx).map_err(StatementError::Expression)?;
            ctx.bind_force("_expression_", value);
        }
        if let Some(literal) = &statement.literal {
            ctx.bind_force("_literal_", Value::from_json(literal.clone()));
        }
    }

    Ok(verbs.dispatch(&statement.verb, &result, &object, ctx, guard_passed))
}

/// Run a feature set: each statement in order, short-circuiting as soon as
/// `ctx` carries a response or an execution error (§3 "a response or error
/// terminates the activation"). Returns the outcome of the last statement
/// that actually ran.
pub fn run_feature_set(verbs: &VerbTable, statements: &[Statement], ctx: &ExecutionContext) -> Result<Option<ActionOutcome>, StatementError> {
    let mut last = None;
    for statement in statements {
        if ctx.is_terminated() {
            break;
        }
        last = Some(run_statement(verbs, statement, ctx)?);
    }
    Ok(last)
}

#[cfg(test)]
#[path = "interpreter_tests.rs"]
mod tests;
