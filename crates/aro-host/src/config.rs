// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-level runtime configuration (`SPEC_FULL.md` §10): HTTP port, WS
//! path, shutdown drain timeout, concurrency gate multiplier, and
//! file-monitor poll interval, each overridable by an `ARO_*` environment
//! variable and by an optional `aro.toml` file. Grounded on the teacher's
//! `crates/daemon/src/env.rs` (`OJ_*` accessor functions reading
//! `std::env::var` with a parse-and-default fallback), widened here to a
//! struct since `Runtime::new` needs to pass the whole bundle around rather
//! than reading globals at every call site.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_WS_PATH: &str = "/ws";
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONCURRENCY_MULTIPLIER: usize = 4;
const DEFAULT_FILE_MONITOR_POLL_MS: u64 = 250;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Read { path: String, source: std::io::Error },
    #[error("failed to parse '{path}' as TOML: {source}")]
    Parse { path: String, source: toml::de::Error },
}

/// The `aro.toml` shape; every field optional so a partial file only
/// overrides what it names (§10 "overridable ... by an optional `aro.toml`").
#[derive(Debug, Default, Deserialize)]
struct FileOverrides {
    http_port: Option<u16>,
    ws_path: Option<String>,
    drain_timeout_ms: Option<u64>,
    concurrency_multiplier: Option<usize>,
    file_monitor_poll_ms: Option<u64>,
}

/// Runtime-wide configuration knobs (§10). `Default` gives the hardcoded
/// fallbacks; [`RuntimeConfig::from_env`] and [`RuntimeConfig::load`] layer
/// environment variables and an `aro.toml` file on top, env taking priority
/// over the file the way the teacher's `OJ_*` functions take priority over
/// nothing else being consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub http_port: u16,
    pub ws_path: String,
    pub drain_timeout: Duration,
    /// Multiplied by `num_cpus::get()` to size the event-handler
    /// concurrency gate (`aro_events::gate::default_capacity` already
    /// applies its own default; this is the host-level override knob).
    pub concurrency_multiplier: usize,
    pub file_monitor_poll_interval: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            ws_path: DEFAULT_WS_PATH.to_string(),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            concurrency_multiplier: DEFAULT_CONCURRENCY_MULTIPLIER,
            file_monitor_poll_interval: Duration::from_millis(DEFAULT_FILE_MONITOR_POLL_MS),
        }
    }
}

impl RuntimeConfig {
    /// Apply `ARO_*` environment overrides on top of `self` (§10 "Every
    /// fallible boundary..."; here there's nothing fallible, an unparseable
    /// value is simply ignored, matching the teacher's `.ok().and_then(...)`
    /// chains).
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(port) = env_parsed("ARO_HTTP_PORT") {
            self.http_port = port;
        }
        if let Ok(path) = std::env::var("ARO_WS_PATH") {
            if !path.is_empty() {
                self.ws_path = path;
            }
        }
        if let Some(ms) = env_parsed::<u64>("ARO_DRAIN_TIMEOUT_MS") {
            self.drain_timeout = Duration::from_millis(ms);
        }
        if let Some(multiplier) = env_parsed("ARO_CONCURRENCY_MULTIPLIER") {
            self.concurrency_multiplier = multiplier;
        }
        if let Some(ms) = env_parsed::<u64>("ARO_FILE_MONITOR_POLL_MS") {
            self.file_monitor_poll_interval = Duration::from_millis(ms);
        }
        self
    }

    fn with_file_overrides(mut self, overrides: FileOverrides) -> Self {
        if let Some(port) = overrides.http_port {
            self.http_port = port;
        }
        if let Some(path) = overrides.ws_path {
            self.ws_path = path;
        }
        if let Some(ms) = overrides.drain_timeout_ms {
            self.drain_timeout = Duration::from_millis(ms);
        }
        if let Some(multiplier) = overrides.concurrency_multiplier {
            self.concurrency_multiplier = multiplier;
        }
        if let Some(ms) = overrides.file_monitor_poll_ms {
            self.file_monitor_poll_interval = Duration::from_millis(ms);
        }
        self
    }

    /// Start from defaults, layer an `aro.toml` (if `path` exists) under
    /// environment overrides, environment winning (§10). Returns the
    /// defaults unmodified by the file when `path` doesn't exist — a
    /// missing `aro.toml` is not an error, only an unreadable or malformed
    /// one is.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let base = if path.exists() {
            let text = std::fs::read_to_string(path)
                .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
            let overrides: FileOverrides =
                toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })?;
            Self::default().with_file_overrides(overrides)
        } else {
            Self::default()
        };
        Ok(base.with_env_overrides())
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
