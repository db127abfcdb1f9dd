// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::ffi::{CStr, CString};

use super::*;
use crate::context::{aro_context_create, aro_context_destroy};
use crate::runtime::{aro_runtime_init, aro_runtime_shutdown};

fn cstr(s: &str) -> CString {
    CString::new(s).unwrap()
}

struct Fixture {
    handle: *const crate::runtime::RuntimeHandle,
    ctx: *const ExecutionContext,
}

impl Fixture {
    fn new() -> Self {
        let handle: *const crate::runtime::RuntimeHandle = aro_runtime_init();
        let name = cstr("Eval");
        let ctx = unsafe { aro_context_create(handle, name.as_ptr()) };
        Self { handle, ctx }
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        unsafe {
            aro_context_destroy(self.ctx);
            aro_runtime_shutdown(self.handle as *mut crate::runtime::RuntimeHandle);
        }
    }
}

#[test]
fn evaluate_expression_binds_expression_and_returns_json() {
    let fx = Fixture::new();
    let node = cstr(r#"{"$lit": 42}"#);
    let rendered = unsafe { aro_evaluate_expression(fx.ctx, node.as_ptr()) };
    assert!(!rendered.is_null());
    let text = unsafe { CStr::from_ptr(rendered) }.to_str().unwrap().to_string();
    assert_eq!(text, "42");
    unsafe { crate::strings::free_string(rendered) };
    let ctx_ref = unsafe { &*fx.ctx };
    assert_eq!(ctx_ref.resolve("_expression_"), Some(Value::Int(42)));
}

#[test]
fn evaluate_and_bind_stores_directly_under_the_given_name() {
    let fx = Fixture::new();
    let name = cstr("total");
    let node = cstr(r#"{"$lit": 7}"#);
    assert!(unsafe { aro_evaluate_and_bind(fx.ctx, name.as_ptr(), node.as_ptr()) });
    let ctx_ref = unsafe { &*fx.ctx };
    assert_eq!(ctx_ref.resolve("total"), Some(Value::Int(7)));
}

#[test]
fn evaluate_when_guard_reports_truthiness() {
    let fx = Fixture::new();
    let truthy = cstr(r#"{"$lit": true}"#);
    let falsy = cstr(r#"{"$lit": false}"#);
    assert_eq!(unsafe { aro_evaluate_when_guard(fx.ctx, truthy.as_ptr()) }, 1);
    assert_eq!(unsafe { aro_evaluate_when_guard(fx.ctx, falsy.as_ptr()) }, 0);
}

#[test]
fn interpolate_string_substitutes_bound_variables() {
    let fx = Fixture::new();
    let name = cstr("name");
    let value = cstr("Ada");
    unsafe { assert!(crate::binding::aro_bind_string(fx.ctx, name.as_ptr(), value.as_ptr())) };
    let template = cstr("hello ${name}");
    let rendered = unsafe { aro_interpolate_string(fx.ctx, template.as_ptr()) };
    assert!(!rendered.is_null());
    let text = unsafe { CStr::from_ptr(rendered) }.to_str().unwrap().to_string();
    assert_eq!(text, "hello Ada");
    unsafe { crate::strings::free_string(rendered) };
}

#[test]
fn match_pattern_matches_a_mapping_subset() {
    let fx = Fixture::new();
    let subject = cstr(r#"{"kind": "order", "total": 12}"#);
    let pattern = cstr(r#"{"kind": "order"}"#);
    assert_eq!(unsafe { aro_match_pattern(fx.ctx, subject.as_ptr(), pattern.as_ptr()) }, 1);
}

#[test]
fn match_pattern_rejects_a_mismatched_field() {
    let fx = Fixture::new();
    let subject = cstr(r#"{"kind": "order"}"#);
    let pattern = cstr(r#"{"kind": "refund"}"#);
    assert_eq!(unsafe { aro_match_pattern(fx.ctx, subject.as_ptr(), pattern.as_ptr()) }, 0);
}

#[test]
fn match_pattern_wildcard_matches_anything() {
    let fx = Fixture::new();
    let subject = cstr(r#"{"kind": "order"}"#);
    let pattern = cstr(r#""*""#);
    assert_eq!(unsafe { aro_match_pattern(fx.ctx, subject.as_ptr(), pattern.as_ptr()) }, 1);
}
