// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `.tmp/kwf-session-map.json`: the durable ticket ↔ worker-session binding
//! the session dispatcher reads and writes every tick.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::atomic::{read_atomic, write_atomic};
use crate::error::StorageError;

const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    InProgress,
    Blocked,
    Completed,
    NoWork,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    pub session_id: String,
    pub session_label: Option<String>,
    pub last_state: SessionState,
    pub last_seen_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl SessionEntry {
    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePointer {
    pub ticket_id: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMap {
    #[serde(default = "current_version")]
    pub version: u32,
    pub active: Option<ActivePointer>,
    #[serde(default)]
    pub tickets: HashMap<String, SessionEntry>,
}

fn current_version() -> u32 {
    CURRENT_VERSION
}

impl SessionMap {
    pub fn new() -> Self {
        Self {
            version: CURRENT_VERSION,
            active: None,
            tickets: HashMap::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, StorageError> {
        Ok(read_atomic(path)?.unwrap_or_default())
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        write_atomic(path, self)
    }

    pub fn entry(&self, ticket_id: &str) -> Option<&SessionEntry> {
        self.tickets.get(ticket_id)
    }
}

#[cfg(test)]
#[path = "session_map_tests.rs"]
mod tests;
