// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors an [`crate::port::AdapterPort`] implementation can raise.

use thiserror::Error;

/// Failures from shelling out to a platform CLI.
#[derive(Debug, Error)]
pub enum AdapterCliError {
    #[error("{binary} is not on PATH: {source}")]
    NotFound {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with status {status}: {stderr}")]
    NonZeroExit {
        command: String,
        status: i32,
        stderr: String,
    },

    #[error("{command} timed out after {timeout_secs}s")]
    Timeout { command: String, timeout_secs: u64 },
}

/// The response shape didn't match what the adapter expected.
#[derive(Debug, Error)]
#[error("unexpected response from {adapter} while {operation}: {detail}")]
pub struct AdapterProtocolError {
    pub adapter: String,
    pub operation: String,
    pub detail: String,
}

/// The closed error taxonomy every [`crate::port::AdapterPort`] method returns.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Cli(#[from] AdapterCliError),

    #[error(transparent)]
    Protocol(#[from] AdapterProtocolError),

    #[error("http request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{adapter} config is incomplete: {detail}")]
    Config { adapter: String, detail: String },
}

impl AdapterError {
    pub fn protocol(adapter: impl Into<String>, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Protocol(AdapterProtocolError {
            adapter: adapter.into(),
            operation: operation.into(),
            detail: detail.into(),
        })
    }
}
