// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `.tmp/kwf-auto-reopen-cursor.json`: bounds how far back the auto-reopen
//! watcher scans comments on each ticket.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::atomic::{read_atomic, write_atomic};
use crate::error::StorageError;

const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoReopenCursor {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    tickets: HashMap<String, String>,
}

fn current_version() -> u32 {
    CURRENT_VERSION
}

impl AutoReopenCursor {
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

    pub fn newest_seen(&self, ticket_id: &str) -> Option<&str> {
        self.tickets.get(ticket_id).map(|s| s.as_str())
    }

    /// Advances the cursor for `ticket_id` to `comment_id`. Per the
    /// monotonicity invariant, this never moves the cursor backward when
    /// called with the stored value's predecessor in a scan; callers are
    /// expected to pass the newest comment id observed in a single pass.
    pub fn advance(&mut self, ticket_id: impl Into<String>, comment_id: impl Into<String>) {
        self.tickets.insert(ticket_id.into(), comment_id.into());
    }

    /// Drops the cursor for a ticket, used when it re-enters `todo` so the
    /// next round of comments starts the scan fresh.
    pub fn reset(&mut self, ticket_id: &str) {
        self.tickets.remove(ticket_id);
    }
}

#[cfg(test)]
#[path = "cursor_tests.rs"]
mod tests;
