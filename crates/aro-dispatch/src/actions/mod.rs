// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in action implementations (§4.3): one module per family of verbs,
//! plus [`builtins::standard_verb_table`] which wires every verb into a
//! fresh [`crate::VerbTable`] with its §4.2 semantic role.
//!
//! Two statement-scoped bindings exist alongside the spec's `_expression_`/
//! `_literal_` that are not named in §3: `_predicate_` and `_body_`. Both
//! carry an *unevaluated* JSON expression tree, serialized to a string,
//! rather than a pre-evaluated [`aro_core::Value`]. `_expression_` is
//! populated once per statement by the dispatch caller (§4.2 step 2) before
//! the verb runs, which works for anything evaluated exactly once — but
//! `Retrieve … where …`, `Map`, `Filter`, and `Reduce` each need to
//! re-evaluate their expression once per collection item against a
//! different implicit binding (`item`, and `accumulator` for `Reduce`).
//! Carrying the raw tree lets the action implementation do that
//! per-item evaluation itself. This is a gap-filling decision (§4.3 names
//! the behavior but not the wire shape); recorded in DESIGN.md.

pub mod builtins;
pub mod collection;
pub mod compute;
pub mod extract;
pub mod io;
pub mod response;
pub mod service;

pub(crate) mod support;

pub use builtins::standard_verb_table;
