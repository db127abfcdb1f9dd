// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `aro-host` binary: loads a JSON-described feature set (an array of
//! [`aro_host::Statement`]s) from the path named in `argv[1]`, runs it
//! through the same six-step dispatch `aro-abi`'s compiled callers drive,
//! then tears the runtime down (§11 shutdown sequence). There is no ARO
//! source parser in this workspace (§1 "parsing ARO source text ... is
//! explicitly out of scope") — this binary's input is already the compiled
//! statement shape, the same way a linked C binary's `main` would have
//! been generated from compiled ARO source rather than interpreting it.

use std::process::ExitCode;

use aro_host::interpreter::{self, Statement};
use aro_host::{lifecycle, Runtime, RuntimeConfig};

fn main() -> ExitCode {
    aro_host::logging::init();

    let args: Vec<String> = std::env::args().collect();
    let Some(feature_set_path) = args.get(1) else {
        eprintln!("usage: aro-host <feature-set.json>");
        return ExitCode::FAILURE;
    };

    let config = match RuntimeConfig::load("aro.toml") {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "failed to load aro.toml");
            return ExitCode::FAILURE;
        }
    };

    let runtime = Runtime::new(config);
    runtime.install_parameters(args.into_iter().skip(1));

    let statements = match load_feature_set(feature_set_path) {
        Ok(statements) => statements,
        Err(err) => {
            tracing::error!(error = %err, path = %feature_set_path, "failed to load feature set");
            return ExitCode::FAILURE;
        }
    };

    let ctx = runtime.new_context("Main", "default");
    let run_result = interpreter::run_feature_set(&runtime.verbs, &statements, &ctx);

    let report = lifecycle::shutdown(&runtime);
    tracing::info!(?report, "runtime shut down");

    match run_result {
        Ok(_) if !ctx.has_execution_error() => ExitCode::SUCCESS,
        Ok(_) => {
            if let Some(error) = ctx.execution_error() {
                tracing::error!(%error, "feature set terminated with an error");
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            tracing::error!(error = %err, "feature set failed to execute");
            ExitCode::FAILURE
        }
    }
}

fn load_feature_set(path: &str) -> Result<Vec<Statement>, String> {
    let text = std::fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&text).map_err(|err| err.to_string())
}
