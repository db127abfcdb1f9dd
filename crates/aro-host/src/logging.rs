// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Global `tracing` subscriber installation (`SPEC_FULL.md` §10), mirroring
//! the teacher's env-gated verbose-logging switch without carrying its
//! `tracing-appender` file-rotation dependency (aro-host logs to stderr
//! only; there is no daemon log file to rotate).

use tracing_subscriber::EnvFilter;

/// Install the process-wide subscriber once. Respects `RUST_LOG` when set;
/// falls back to `debug` when `ARO_DEBUG=1` and `RUST_LOG` is absent,
/// otherwise `info` (§10 "`ARO_DEBUG=1` is a convenience alias").
///
/// Safe to call more than once — the second and subsequent calls are
/// no-ops, matching `tracing_subscriber::fmt().try_init()`'s own semantics.
pub fn init() {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if std::env::var("ARO_DEBUG").as_deref() == Ok("1") {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
