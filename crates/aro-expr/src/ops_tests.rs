// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use aro_core::Value;
use yare::parameterized;

use super::*;

#[test]
fn integer_addition_stays_integer() {
    let result = apply(BinaryOp::Add, &Value::Int(2), &Value::Int(3)).unwrap();
    assert_eq!(result, Value::Int(5));
}

#[test]
fn mixed_addition_promotes_to_double() {
    let result = apply(BinaryOp::Add, &Value::Int(2), &Value::Double(0.5)).unwrap();
    assert_eq!(result, Value::Double(2.5));
}

#[test]
fn integer_division_by_zero_is_an_error() {
    let err = apply(BinaryOp::Div, &Value::Int(4), &Value::Int(0)).unwrap_err();
    assert_eq!(err, ExprError::DivisionByZero);
}

#[test]
fn concat_stringifies_both_sides() {
    let result = apply(BinaryOp::Concat, &Value::string("count: "), &Value::Int(3)).unwrap();
    assert_eq!(result, Value::string("count: 3"));
}

#[parameterized(
    ints = { Value::Int(1), Value::Int(1), true },
    string_vs_int = { Value::string("1"), Value::Int(1), false },
    bool_true = { Value::Bool(true), Value::Bool(true), true },
    double_vs_int = { Value::Double(2.0), Value::Int(2), true },
)]
fn is_operator_loose_equality(case: (Value, Value, bool)) {
    let (left, right, expected) = case;
    let result = apply(BinaryOp::Is, &left, &right).unwrap();
    assert_eq!(result, Value::Bool(expected));
}

#[test]
fn lexicographic_fallback_when_not_numeric_or_dates() {
    let result = apply(BinaryOp::Lt, &Value::string("apple"), &Value::string("banana")).unwrap();
    assert_eq!(result, Value::Bool(true));
}

#[test]
fn numeric_comparison_takes_priority_over_lexicographic() {
    let result = apply(BinaryOp::Lt, &Value::Int(9), &Value::Int(10)).unwrap();
    assert_eq!(result, Value::Bool(true));
}

#[test]
fn contains_checks_sequence_membership() {
    let seq = Value::Sequence(vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(apply(BinaryOp::Contains, &seq, &Value::Int(2)).unwrap(), Value::Bool(true));
    assert_eq!(apply(BinaryOp::Contains, &seq, &Value::Int(3)).unwrap(), Value::Bool(false));
}

#[test]
fn matches_evaluates_a_regex_against_a_string() {
    let result = apply(BinaryOp::Matches, &Value::string("order-42"), &Value::string(r"^order-\d+$")).unwrap();
    assert_eq!(result, Value::Bool(true));
}

#[test]
fn and_or_use_truthiness() {
    assert_eq!(apply(BinaryOp::And, &Value::Int(1), &Value::string("x")).unwrap(), Value::Bool(true));
    assert_eq!(apply(BinaryOp::Or, &Value::Int(0), &Value::Null).unwrap(), Value::Bool(false));
}
