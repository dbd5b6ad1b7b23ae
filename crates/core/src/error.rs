// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by core domain types. Adapter, lock, and contract errors
//! live in their own crates; this is the small set raised purely by the
//! shared data model.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown stage {raw:?} (normalized to {normalized:?})")]
    UnknownStage { raw: String, normalized: String },

    #[error("work item title must not be empty")]
    EmptyTitle,
}
