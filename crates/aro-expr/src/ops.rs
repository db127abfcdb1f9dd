// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `$binary` operator table (§4.4).

use std::cmp::Ordering;

use aro_core::Value;
use regex::Regex;

use crate::ExprError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
    Eq,
    Ne,
    Is,
    IsNot,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    Contains,
    Matches,
}

impl BinaryOp {
    pub fn parse(op: &str) -> Option<Self> {
        Some(match op {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "++" => BinaryOp::Concat,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "is" => BinaryOp::Is,
            "isNot" => BinaryOp::IsNot,
            "<" => BinaryOp::Lt,
            ">" => BinaryOp::Gt,
            "<=" => BinaryOp::Le,
            ">=" => BinaryOp::Ge,
            "and" => BinaryOp::And,
            "or" => BinaryOp::Or,
            "contains" => BinaryOp::Contains,
            "matches" => BinaryOp::Matches,
            _ => return None,
        })
    }
}

pub fn apply(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, ExprError> {
    match op {
        BinaryOp::Add => arithmetic(left, right, |a, b| a + b, |a, b| a + b),
        BinaryOp::Sub => arithmetic(left, right, |a, b| a - b, |a, b| a - b),
        BinaryOp::Mul => arithmetic(left, right, |a, b| a * b, |a, b| a * b),
        BinaryOp::Div => divide(left, right),
        BinaryOp::Mod => modulo(left, right),
        BinaryOp::Concat => Ok(Value::string(format!("{}{}", display(left), display(right)))),
        BinaryOp::Eq => Ok(Value::Bool(left == right)),
        BinaryOp::Ne => Ok(Value::Bool(left != right)),
        BinaryOp::Is => Ok(Value::Bool(loose_eq(left, right))),
        BinaryOp::IsNot => Ok(Value::Bool(!loose_eq(left, right))),
        BinaryOp::Lt => compare(left, right).map(|o| Value::Bool(o == Ordering::Less)),
        BinaryOp::Gt => compare(left, right).map(|o| Value::Bool(o == Ordering::Greater)),
        BinaryOp::Le => compare(left, right).map(|o| Value::Bool(o != Ordering::Greater)),
        BinaryOp::Ge => compare(left, right).map(|o| Value::Bool(o != Ordering::Less)),
        BinaryOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
        BinaryOp::Contains => Ok(Value::Bool(contains(left, right))),
        BinaryOp::Matches => matches_regex(left, right),
    }
}

/// Integer arithmetic stays integer only when both operands are integers
/// (§4.4: "preserve integer-vs-double types when both operands... are
/// integers"); any other numeric combination promotes to double.
fn arithmetic(
    left: &Value,
    right: &Value,
    int_op: impl Fn(i64, i64) -> i64,
    float_op: impl Fn(f64, f64) -> f64,
) -> Result<Value, ExprError> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(int_op(*a, *b))),
        _ => {
            let a = left.as_f64().ok_or_else(|| ExprError::MalformedNode("left operand is not numeric".into()))?;
            let b = right.as_f64().ok_or_else(|| ExprError::MalformedNode("right operand is not numeric".into()))?;
            Ok(Value::Double(float_op(a, b)))
        }
    }
}

fn divide(left: &Value, right: &Value) -> Result<Value, ExprError> {
    match (left, right) {
        (Value::Int(_), Value::Int(0)) => Err(ExprError::DivisionByZero),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a / b)),
        _ => {
            let a = left.as_f64().ok_or_else(|| ExprError::MalformedNode("left operand is not numeric".into()))?;
            let b = right.as_f64().ok_or_else(|| ExprError::MalformedNode("right operand is not numeric".into()))?;
            if b == 0.0 {
                return Err(ExprError::DivisionByZero);
            }
            Ok(Value::Double(a / b))
        }
    }
}

fn modulo(left: &Value, right: &Value) -> Result<Value, ExprError> {
    match (left, right) {
        (Value::Int(_), Value::Int(0)) => Err(ExprError::DivisionByZero),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a % b)),
        _ => {
            let a = left.as_f64().ok_or_else(|| ExprError::MalformedNode("left operand is not numeric".into()))?;
            let b = right.as_f64().ok_or_else(|| ExprError::MalformedNode("right operand is not numeric".into()))?;
            if b == 0.0 {
                return Err(ExprError::DivisionByZero);
            }
            Ok(Value::Double(a % b))
        }
    }
}

fn display(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Int(i) => i.to_string(),
        Value::Double(d) => d.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_json().to_string(),
    }
}

/// `is`/`isNot`: boolean-or-string equality, loose across numeric types
/// (§4.4).
fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (a, b) if a.as_f64().is_some() && b.as_f64().is_some() => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

/// `<` etc.: date comparison first, then numeric, then lexicographic
/// (§4.4).
fn compare(left: &Value, right: &Value) -> Result<Ordering, ExprError> {
    if let (Value::DateTime(a), Value::DateTime(b)) = (left, right) {
        return Ok(a.cmp(b));
    }
    if let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) {
        return a.partial_cmp(&b).ok_or_else(|| ExprError::MalformedNode("NaN is not ordered".into()));
    }
    if let (Some(a), Some(b)) = (left.as_str(), right.as_str()) {
        return Ok(a.cmp(b));
    }
    Err(ExprError::MalformedNode("operands are not comparable".into()))
}

/// `contains`: substring for strings, membership for sequences, key
/// presence for mappings.
fn contains(left: &Value, right: &Value) -> bool {
    match left {
        Value::String(s) => right.as_str().map(|needle| s.contains(needle)).unwrap_or(false),
        Value::Sequence(items) => items.contains(right),
        Value::Mapping(map) => right.as_str().map(|key| map.contains_key(key)).unwrap_or(false),
        _ => false,
    }
}

fn matches_regex(left: &Value, right: &Value) -> Result<Value, ExprError> {
    let haystack = left.as_str().ok_or_else(|| ExprError::MalformedNode("matches' left operand must be a string".into()))?;
    let pattern = right
        .as_str()
        .ok_or_else(|| ExprError::MalformedNode("matches' right operand must be a string".into()))?;
    let re = Regex::new(pattern).map_err(|e| ExprError::InvalidRegex(e.to_string()))?;
    Ok(Value::Bool(re.is_match(haystack)))
}

#[cfg(test)]
#[path = "ops_tests.rs"]
mod tests;
