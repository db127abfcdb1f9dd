// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires every built-in verb into a fresh [`crate::VerbTable`] with the
//! semantic role §4.2's table assigns it. A handful of verbs the table
//! names have no dedicated contract in §4.3's bullet list (`configure`,
//! `update`, `accept`, `merge`, `write`, `request`, the repeated `listen`);
//! those are registered as aliases of the implementation whose contract
//! subsumes theirs — see the comment at each alias below and DESIGN.md.

use crate::registry::SemanticRole;
use crate::VerbTable;

use super::{collection, compute, extract, io, response, service};

/// Build the process-wide verb table (§5: "written at startup only").
pub fn standard_verb_table() -> VerbTable {
    let mut table = VerbTable::new();

    table.register("extract", SemanticRole::Request, extract::extract);
    table.register("fetch", SemanticRole::Request, extract::fetch);
    // `Request` is the spec's second name for Fetch (§4.3 "Fetch / Request").
    table.register("request", SemanticRole::Request, extract::fetch);
    table.register("retrieve", SemanticRole::Request, extract::retrieve);
    table.register("read", SemanticRole::Request, extract::read);
    table.register("parse", SemanticRole::Request, extract::parse);

    table.register("compute", SemanticRole::Own, compute::compute);
    table.register("create", SemanticRole::Own, compute::create);
    table.register("transform", SemanticRole::Own, compute::transform);
    table.register("validate", SemanticRole::Own, compute::validate);
    table.register("compare", SemanticRole::Own, compute::compare);
    table.register("set", SemanticRole::Own, compute::set);
    // `Configure` is Set's second name (§4.3 "Set / Configure").
    table.register("configure", SemanticRole::Own, compute::set);
    table.register("split", SemanticRole::Own, compute::split);
    table.register("map", SemanticRole::Own, collection::map);
    table.register("filter", SemanticRole::Own, collection::filter);
    table.register("reduce", SemanticRole::Own, collection::reduce);
    // `Update`/`Merge` are not separately defined; both describe the same
    // deep-merge-into-a-result shape as Transform's `from … with …` (§4.3).
    table.register("update", SemanticRole::Own, compute::transform);
    table.register("merge", SemanticRole::Own, compute::transform);
    // `Accept` has no contract of its own; it matches Create's "bind the
    // resolved expression to the result name" (§4.3 Create).
    table.register("accept", SemanticRole::Own, compute::create);

    table.register("return", SemanticRole::Response, response::return_);
    table.register("throw", SemanticRole::Response, response::throw);

    table.register("store", SemanticRole::Export, io::store);
    // `Write`'s contract ("creates parent directories as needed", §6) is
    // Store's file-target branch.
    table.register("write", SemanticRole::Export, io::store);
    table.register("publish", SemanticRole::Export, io::publish);
    table.register("log", SemanticRole::Export, io::log);
    table.register("send", SemanticRole::Export, io::send);
    table.register("emit", SemanticRole::Export, io::emit);
    table.register("delete", SemanticRole::Export, io::delete);
    table.register("broadcast", SemanticRole::Export, io::broadcast);
    // List/Stat/Exists are informational — like Extract, the caller expects
    // the answer bound to the result name — so they take the `own` role
    // despite living in §4.3's file-system-operations bullet rather than its
    // own/request rows.
    table.register("list", SemanticRole::Own, io::list);
    table.register("stat", SemanticRole::Own, io::stat);
    table.register("exists", SemanticRole::Own, io::exists);
    table.register("copy", SemanticRole::Export, io::copy);
    table.register("move", SemanticRole::Export, io::move_);
    table.register("append", SemanticRole::Export, io::append);
    table.register("createdirectory", SemanticRole::Export, io::create_directory);

    table.register("start", SemanticRole::Service, service::start);
    table.register("stop", SemanticRole::Service, service::stop);
    table.register("listen", SemanticRole::Service, service::listen);
    table.register("watch", SemanticRole::Service, service::watch);
    table.register("connect", SemanticRole::Service, service::connect);
    table.register("close", SemanticRole::Service, service::close);
    table.register("keepalive", SemanticRole::Service, service::keepalive);
    table.register("call", SemanticRole::Service, service::call);

    table
}

#[cfg(test)]
#[path = "builtins_tests.rs"]
mod tests;
