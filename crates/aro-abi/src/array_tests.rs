// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::ffi::{CStr, CString};

use super::*;
use crate::context::{aro_context_create, aro_context_destroy};
use crate::runtime::{aro_runtime_init, aro_runtime_shutdown};

struct Fixture {
    handle: *const crate::runtime::RuntimeHandle,
    ctx: *const aro_core::ExecutionContext,
}

impl Fixture {
    fn new() -> Self {
        let handle: *const crate::runtime::RuntimeHandle = aro_runtime_init();
        let name = CString::new("Loop").unwrap();
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

fn cstr(s: &str) -> CString {
    CString::new(s).unwrap()
}

#[test]
fn array_count_reports_the_element_count() {
    let json = cstr("[1,2,3]");
    assert_eq!(unsafe { aro_array_count(json.as_ptr()) }, 3);
}

#[test]
fn array_count_rejects_non_array_json() {
    let json = cstr(r#"{"a":1}"#);
    assert_eq!(unsafe { aro_array_count(json.as_ptr()) }, -1);
}

#[test]
fn array_get_returns_the_json_encoded_element() {
    let json = cstr(r#"["a","b","c"]"#);
    let element = unsafe { aro_array_get(json.as_ptr(), 1) };
    assert!(!element.is_null());
    let text = unsafe { CStr::from_ptr(element) }.to_str().unwrap().to_string();
    assert_eq!(text, "\"b\"");
    unsafe { crate::strings::free_string(element) };
}

#[test]
fn array_get_returns_null_out_of_bounds() {
    let json = cstr("[1,2]");
    assert!(unsafe { aro_array_get(json.as_ptr(), 5) }.is_null());
}

unsafe extern "C" fn double_the_item(ctx: *const aro_core::ExecutionContext) -> *mut std::ffi::c_char {
    let ctx = &*ctx;
    let item = ctx.resolve("item").and_then(|v| v.as_int()).unwrap_or(0);
    crate::strings::into_owned_ptr((item * 2).to_string())
}

#[test]
fn parallel_for_each_execute_runs_the_body_per_item_and_collects_results() {
    let fx = Fixture::new();
    let collection = cstr("[1,2,3]");
    let item_name = cstr("item");
    let rendered = unsafe {
        aro_parallel_for_each_execute(fx.handle, fx.ctx, collection.as_ptr(), double_the_item, 2, item_name.as_ptr(), std::ptr::null())
    };
    assert!(!rendered.is_null());
    let text = unsafe { CStr::from_ptr(rendered) }.to_str().unwrap().to_string();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["error"], serde_json::Value::Null);
    let mut results: Vec<i64> = parsed["results"].as_array().unwrap().iter().map(|v| v.as_i64().unwrap()).collect();
    results.sort_unstable();
    assert_eq!(results, vec![2, 4, 6]);
    unsafe { crate::strings::free_string(rendered) };
}

#[test]
fn parallel_for_each_execute_returns_null_for_non_array_collection() {
    let fx = Fixture::new();
    let collection = cstr(r#"{"not":"an array"}"#);
    let item_name = cstr("item");
    let rendered = unsafe {
        aro_parallel_for_each_execute(fx.handle, fx.ctx, collection.as_ptr(), double_the_item, 1, item_name.as_ptr(), std::ptr::null())
    };
    assert!(rendered.is_null());
}
