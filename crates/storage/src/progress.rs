// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `.tmp/kwf-progress-poster-state.json`: when each in-progress ticket last
//! received an automatic "still working" comment, so the periodic progress
//! poster can throttle across process invocations.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::atomic::{read_atomic, write_atomic};
use crate::error::StorageError;

const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressPosterState {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    tickets: HashMap<String, DateTime<Utc>>,
}

fn current_version() -> u32 {
    CURRENT_VERSION
}

impl ProgressPosterState {
    pub fn new() -> Self {
        Self {
            version: CURRENT_VERSION,
            tickets: HashMap::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, StorageError> {
        Ok(read_atomic(path)?.unwrap_or_default())
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        write_atomic(path, self)
    }

    pub fn last_posted_at(&self, ticket_id: &str) -> Option<DateTime<Utc>> {
        self.tickets.get(ticket_id).copied()
    }

    pub fn record(&mut self, ticket_id: impl Into<String>, at: DateTime<Utc>) {
        self.tickets.insert(ticket_id.into(), at);
    }

    /// Drops any tracked ticket not in `still_in_progress`, so a ticket that
    /// left `in-progress` doesn't keep occupying the state file forever.
    pub fn retain_only(&mut self, still_in_progress: &[String]) {
        self.tickets.retain(|id, _| still_in_progress.contains(id));
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
