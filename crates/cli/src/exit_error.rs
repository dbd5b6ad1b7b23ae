// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps the error taxonomy (§7) to an exit code and a "What next" hint, so
//! every command surfaces failures the same way regardless of which crate
//! raised them.

use std::fmt;

/// Carries the exit code an `anyhow::Error` should terminate the process
/// with; downcast for in `main`'s handler.
#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exit {}", self.code)
    }
}

impl std::error::Error for ExitError {}

/// A single stderr line with the error message, plus (when applicable) a
/// "What next" hint naming the remedial command (§7).
pub fn report(err: &anyhow::Error) {
    eprintln!("Error: {err}");
    if let Some(hint) = what_next(err) {
        eprintln!("What next: {hint}");
    }
}

fn what_next(err: &anyhow::Error) -> Option<&'static str> {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<kwf_storage::ConfigError>() {
            return Some(match e {
                kwf_storage::ConfigError::Missing { .. } => "run `kanban-workflow setup` first",
                kwf_storage::ConfigError::AlreadyExists { .. } => "pass --force to overwrite the existing configuration",
                kwf_storage::ConfigError::UnsupportedVersion { .. } => {
                    "re-run `kanban-workflow setup --force` to rewrite the config in the current version"
                }
                kwf_storage::ConfigError::Storage(_) | kwf_storage::ConfigError::Adapter(_) => {
                    "check the stageMap covers all four canonical stages and re-run `kanban-workflow setup`"
                }
            });
        }
        if let Some(e) = cause.downcast_ref::<kwf_engine::LockError>() {
            return Some(match e {
                kwf_engine::LockError::Held { .. } => "another tick is already running; wait for it or inspect the lock file under .tmp/",
                kwf_engine::LockError::Io { .. } | kwf_engine::LockError::Storage(_) => "check filesystem permissions on .tmp/",
            });
        }
        if cause.downcast_ref::<kwf_engine::WorkflowViolation>().is_some() {
            return Some("run `kanban-workflow show --id <id>` to see the ticket's current stage");
        }
        if cause.downcast_ref::<kwf_engine::ContractError>().is_some() {
            return Some("the worker's response did not end with a valid kanban-workflow terminal command");
        }
        if cause.downcast_ref::<kwf_adapters::AdapterCliError>().is_some() {
            return Some("confirm the platform CLI is installed, on PATH, and authenticated");
        }
        if cause.downcast_ref::<kwf_adapters::AdapterError>().is_some() {
            return Some("check the adapter's API credentials and network connectivity");
        }
    }
    None
}
