// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Start, Stop, Listen, Watch, Connect, Close, Keepalive, Call (§4.3, §4.6-
//! §4.8). All eight verbs share the `service` semantic role, whose "binds
//! result? as applicable" means the dispatcher itself never auto-binds
//! (unlike `request`/`own`) — each implementation below binds explicitly
//! when its verb calls for it.
//!
//! `Call` has no dedicated contract in §4.3's bullet list; it is treated as
//! a synonym for `Start`/`Connect` — invoking the named service with a
//! config/request payload and binding whatever handle or reply comes back —
//! since nothing in the spec distinguishes it from an outbound service
//! invocation. Recorded as an Open Question resolution in DESIGN.md.

use aro_core::{ErrorKind, ExecutionContext, Value};

use crate::descriptor::{ObjectDescriptor, ResultDescriptor};
use crate::registry::ActionOutcome;

use super::support::{expression, fail};

fn invoke(verb: &str, result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let Some(services) = ctx.services() else {
        return fail(verb, result, object, ErrorKind::InternalError, "no service manager attached to this context");
    };
    let config = expression(ctx).unwrap_or(Value::Null);
    match services.start(&object.base, &config, ctx) {
        Ok(value) => {
            ctx.bind_force(&result.base, value.clone());
            ActionOutcome::ok(value)
        }
        Err(detail) => fail(verb, result, object, ErrorKind::InternalError, detail),
    }
}

/// `Start <result> with <config>` — instantiates and registers a named
/// service (`http-server`, `socket-server`, `file-monitor`, …) (§4.3, §4.6-
/// §4.8).
pub fn start(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    invoke("Start", result, object, ctx)
}

/// `Listen <result> on <config>` — alias of Start for socket/HTTP-style
/// services that listen rather than connect out (§4.3).
pub fn listen(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    invoke("Listen", result, object, ctx)
}

/// `Watch <result> on <path>` — starts a file monitor (§4.3, §4.8).
pub fn watch(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    invoke("Watch", result, object, ctx)
}

/// `Connect <result> to <target>` — starts an outbound connection-backed
/// service (§4.3).
pub fn connect(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    invoke("Connect", result, object, ctx)
}

/// `Call <result> via <service>` — invokes a named service with `_expression_`
/// as its request payload; see module docs for why this is modeled as Start.
pub fn call(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    invoke("Call", result, object, ctx)
}

/// `Stop <result>` — drains and tears down a named, running service (§4.3).
pub fn stop(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let Some(services) = ctx.services() else {
        return fail("Stop", result, object, ErrorKind::InternalError, "no service manager attached to this context");
    };
    match services.stop(&object.base) {
        Ok(()) => ActionOutcome::ok_unbound(),
        Err(detail) => fail("Stop", result, object, ErrorKind::InternalError, detail),
    }
}

/// `Close <result>` — alias of Stop (§4.3).
pub fn close(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    stop(result, object, ctx)
}

/// `Keepalive` — installs signal handlers, publishes `WaitStateEntered`, and
/// parks the calling thread until shutdown (§4.3, §5 Suspension points). The
/// only verb whose semantic role is actually terminal-by-parking rather than
/// by response/error.
pub fn keepalive(result: &ResultDescriptor, object: &ObjectDescriptor, ctx: &ExecutionContext) -> ActionOutcome {
    let Some(services) = ctx.services() else {
        return fail("Keepalive", result, object, ErrorKind::InternalError, "no service manager attached to this context");
    };
    services.keepalive(ctx);
    ActionOutcome::ok_unbound()
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
