// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![allow(unsafe_code)]

//! aro-abi: the C ABI surface of §6 — the entry points a compiled ARO
//! binary's generated `main` calls into. Every exported function uses the C
//! calling convention; handles are opaque pointers produced by
//! [`Box::into_raw`] and consumed by [`Box::from_raw`].
//!
//! The crate forbids `unsafe_code` everywhere else in the workspace; this is
//! the one place it's unavoidable, since the whole point is a boundary other
//! languages' generated code calls across.
//!
//! "One entry point per verb" (§6) is implemented as a single table-driven
//! `execute_action` function wrapping [`aro_dispatch::standard_verb_table`]
//! rather than one `extern "C" fn" per verb — see DESIGN.md. Compiled ARO
//! code already carries the verb name as data (the same way `VerbTable`
//! itself is keyed), so a generated call site passes the verb name alongside
//! the two descriptors instead of calling a differently-named symbol per verb.

mod action;
mod array;
mod binding;
mod context;
mod events;
mod expr;
mod runtime;
mod services;
mod strings;

pub use action::{aro_execute_action, CObjectDescriptor, CResultDescriptor};
pub use array::{aro_array_count, aro_array_get, aro_parallel_for_each_execute};
pub use binding::{
    aro_bind_array, aro_bind_bool, aro_bind_dict, aro_bind_double, aro_bind_int, aro_bind_string, aro_bind_value,
    aro_unbind, aro_variable_resolve, aro_variable_resolve_int, aro_variable_resolve_string,
};
pub use context::{
    aro_context_create, aro_context_create_child, aro_context_create_named, aro_context_destroy,
    aro_context_has_error, aro_context_print_error, aro_context_print_response,
};
pub use events::{aro_http_register_route, aro_register_repository_observer_with_guard, aro_runtime_register_handler};
pub use expr::{aro_evaluate_and_bind, aro_evaluate_expression, aro_evaluate_when_guard, aro_interpolate_string, aro_match_pattern};
pub use runtime::{
    aro_parse_arguments, aro_runtime_await_pending_events, aro_runtime_init, aro_runtime_shutdown,
    aro_set_embedded_openapi, aro_set_embedded_templates, EmbeddedSchemaRegistry, RuntimeHandle,
};
pub use services::{
    aro_native_file_watcher_create, aro_native_file_watcher_destroy, aro_native_file_watcher_start,
    aro_native_file_watcher_stop, aro_native_http_server_start, aro_native_http_server_start_with_openapi,
    aro_native_http_server_stop, aro_native_socket_broadcast, aro_native_socket_send, aro_native_socket_server_start,
    aro_native_socket_server_stop,
};
