// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The small document persisted inside the mutex lock file
//! (`.tmp/kanban_autopilot.lock`). Acquisition/release logic lives in
//! `kwf-engine::lock`; this is just the on-disk shape.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::atomic::{read_atomic, write_atomic};
use crate::error::StorageError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockRecord {
    pub holder_pid: u32,
    pub acquired_at: DateTime<Utc>,
}

impl LockRecord {
    pub fn new(holder_pid: u32, acquired_at: DateTime<Utc>) -> Self {
        Self { holder_pid, acquired_at }
    }

    pub fn load(path: &Path) -> Result<Option<Self>, StorageError> {
        read_atomic(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        write_atomic(path, self)
    }
}

#[cfg(test)]
#[path = "lock_record_tests.rs"]
mod tests;
