// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared C-string helpers: every exported function takes borrowed `char*`
//! arguments and hands ownership of returned strings to the caller via
//! `CString::into_raw`, matching the convention `runtime_shutdown`-style
//! destroy functions assume.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Borrow a `char*` argument as a `&str`. Returns `None` for a null pointer
/// or invalid UTF-8 rather than panicking across the FFI boundary.
///
/// # Safety
/// `ptr` must be either null or point at a valid, NUL-terminated C string
/// that outlives this call.
pub unsafe fn borrow_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok()
}

/// Hand an owned string back across the boundary. The caller takes
/// ownership of the returned pointer and must eventually free it with
/// [`free_string`].
pub fn into_owned_ptr(s: impl Into<Vec<u8>>) -> *mut c_char {
    match CString::new(s) {
        Ok(c) => c.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Free a string previously returned by one of this crate's functions.
///
/// # Safety
/// `ptr` must have come from [`into_owned_ptr`] (directly or via a function
/// built on it) and must not already have been freed.
pub unsafe fn free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}
