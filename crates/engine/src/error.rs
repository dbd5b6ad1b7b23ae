// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error taxonomy owned by the engine: lock contention, worker
//! contract violations, and illegal stage-machine transitions.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("lock at {path} is already held by pid {holder_pid} since {acquired_at}")]
    Held {
        path: String,
        holder_pid: u32,
        acquired_at: DateTime<Utc>,
    },

    #[error("lock io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("lock storage error: {0}")]
    Storage(#[from] kwf_storage::StorageError),
}

/// A single violation of the §4.7 worker response grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    NoTerminalCommand,
    MultipleTerminalCandidates,
    TerminalCommandNotLastLine,
    TooFewTokens,
    UnknownVerb { verb: String },
    MissingRequiredFlag { verb: String, flag: &'static str },
    EmptyFlagValue { flag: &'static str },
    MissingEvidenceSection,
    EmptyEvidenceSection,
    EvidenceLacksConcreteExecution,
    EvidenceNegatesExecution,
}

impl std::fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractViolation::NoTerminalCommand => write!(f, "no kanban-workflow terminal command found"),
            ContractViolation::MultipleTerminalCandidates => {
                write!(f, "more than one kanban-workflow candidate line found")
            }
            ContractViolation::TerminalCommandNotLastLine => {
                write!(f, "terminal command is not the last non-empty line")
            }
            ContractViolation::TooFewTokens => write!(f, "terminal command has fewer than 4 tokens"),
            ContractViolation::UnknownVerb { verb } => write!(f, "unknown verb {verb:?}"),
            ContractViolation::MissingRequiredFlag { verb, flag } => {
                write!(f, "{verb} requires {flag}")
            }
            ContractViolation::EmptyFlagValue { flag } => write!(f, "{flag} value is empty"),
            ContractViolation::MissingEvidenceSection => write!(f, "missing EVIDENCE section"),
            ContractViolation::EmptyEvidenceSection => write!(f, "EVIDENCE section is empty"),
            ContractViolation::EvidenceLacksConcreteExecution => {
                write!(f, "EVIDENCE lacks a concrete execution signal")
            }
            ContractViolation::EvidenceNegatesExecution => {
                write!(f, "EVIDENCE explicitly negates execution")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("worker response violates the terminal command contract: {0:?}")]
    Violated(Vec<ContractViolation>),
}

#[derive(Debug, Error)]
pub enum WorkflowViolation {
    #[error("cannot run `next` while ticket {id} is already in-progress")]
    NextWhileInProgress { id: String },

    #[error("stage {stage} is not reachable from any mapped platform state")]
    StageNotReachable { stage: String },
}

/// Errors a single `tick()` call can surface. Every adapter failure is
/// propagated with its full cause chain; only `reconcile_assignments` is
/// swallowed (logged as a warning) per §4.4.
#[derive(Debug, Error)]
pub enum TickError {
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Adapter(#[from] kwf_adapters::AdapterError),
}
