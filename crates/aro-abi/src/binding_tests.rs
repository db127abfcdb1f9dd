// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::ffi::{CStr, CString};

use super::*;
use crate::context::aro_context_create;
use crate::runtime::{aro_runtime_init, aro_runtime_shutdown};

struct Fixture {
    handle: *const RuntimeHandle,
    ctx: *const ExecutionContext,
}

impl Fixture {
    fn new() -> Self {
        let handle: *const RuntimeHandle = aro_runtime_init();
        let name = CString::new("Bind").unwrap();
        let ctx = unsafe { aro_context_create(handle, name.as_ptr()) };
        Self { handle, ctx }
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        unsafe {
            aro_context_destroy(self.ctx);
            aro_runtime_shutdown(self.handle as *mut RuntimeHandle);
        }
    }
}

fn cstr(s: &str) -> CString {
    CString::new(s).unwrap()
}

#[test]
fn bind_scalars_then_resolve_them_back() {
    let fx = Fixture::new();
    let name = cstr("age");
    unsafe {
        assert!(aro_bind_int(fx.ctx, name.as_ptr(), 41));
        let mut out = 0i64;
        assert!(aro_variable_resolve_int(fx.ctx, name.as_ptr(), &mut out as *mut i64));
        assert_eq!(out, 41);
    }
}

#[test]
fn bind_string_resolves_through_variable_resolve_string() {
    let fx = Fixture::new();
    let name = cstr("city");
    let value = cstr("Lisbon");
    unsafe {
        assert!(aro_bind_string(fx.ctx, name.as_ptr(), value.as_ptr()));
        let resolved = aro_variable_resolve_string(fx.ctx, name.as_ptr());
        assert!(!resolved.is_null());
        assert_eq!(CStr::from_ptr(resolved).to_str().unwrap(), "Lisbon");
        crate::strings::free_string(resolved);
    }
}

#[test]
fn rebinding_an_already_bound_name_fails() {
    let fx = Fixture::new();
    let name = cstr("total");
    unsafe {
        assert!(aro_bind_int(fx.ctx, name.as_ptr(), 1));
        assert!(!aro_bind_int(fx.ctx, name.as_ptr(), 2));
    }
}

#[test]
fn bind_dict_rejects_non_object_json() {
    let fx = Fixture::new();
    let name = cstr("payload");
    let array_json = cstr("[1,2,3]");
    unsafe {
        assert!(!aro_bind_dict(fx.ctx, name.as_ptr(), array_json.as_ptr()));
    }
}

#[test]
fn bind_array_accepts_array_json() {
    let fx = Fixture::new();
    let name = cstr("items");
    let json = cstr("[1,2,3]");
    unsafe {
        assert!(aro_bind_array(fx.ctx, name.as_ptr(), json.as_ptr()));
    }
}

#[test]
fn unbind_clears_a_binding() {
    let fx = Fixture::new();
    let name = cstr("ephemeral");
    unsafe {
        assert!(aro_bind_bool(fx.ctx, name.as_ptr(), true));
        aro_unbind(fx.ctx, name.as_ptr());
        assert!(aro_bind_bool(fx.ctx, name.as_ptr(), false));
    }
}

#[test]
fn resolving_an_unbound_name_returns_null() {
    let fx = Fixture::new();
    let name = cstr("nope");
    unsafe {
        assert!(aro_variable_resolve(fx.ctx, name.as_ptr()).is_null());
    }
}
