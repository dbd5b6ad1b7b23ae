// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers shared by CLI-shelling adapters (GitHub's
//! `gh`, and any future local-CLI backend).

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use crate::error::AdapterCliError;

/// Default timeout for a single platform-CLI invocation.
pub const CLI_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`, converting timeout
/// expiration into a descriptive error. The child process is killed
/// automatically if the timeout elapses (via the tokio `Child` drop impl).
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    command_desc: &str,
) -> Result<Output, AdapterCliError> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
            Err(AdapterCliError::NotFound {
                binary: command_desc.to_string(),
                source: io_err,
            })
        }
        Ok(Err(io_err)) => Err(AdapterCliError::NonZeroExit {
            command: command_desc.to_string(),
            status: -1,
            stderr: io_err.to_string(),
        }),
        Err(_elapsed) => Err(AdapterCliError::Timeout {
            command: command_desc.to_string(),
            timeout_secs: timeout.as_secs(),
        }),
    }
}

/// Turn a completed [`Output`] into a `Result`, surfacing stderr on failure.
pub fn require_success(output: Output, command_desc: &str) -> Result<Output, AdapterCliError> {
    if output.status.success() {
        Ok(output)
    } else {
        Err(AdapterCliError::NonZeroExit {
            command: command_desc.to_string(),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
