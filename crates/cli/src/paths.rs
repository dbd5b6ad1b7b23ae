// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conventional file locations (§6): all relative to the current directory
//! unless overridden, none of it mandated by the core crates.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Paths {
    pub config: PathBuf,
    pub lock: PathBuf,
    pub session_map: PathBuf,
    pub auto_reopen_cursor: PathBuf,
    pub progress_poster_state: PathBuf,
}

impl Paths {
    pub fn discover(root: Option<PathBuf>) -> Self {
        let root = root.unwrap_or_else(|| PathBuf::from("."));
        Self {
            config: root.join("config/clawban.json"),
            lock: root.join(".tmp/kanban_autopilot.lock"),
            session_map: root.join(".tmp/kwf-session-map.json"),
            auto_reopen_cursor: root.join(".tmp/kwf-auto-reopen-cursor.json"),
            progress_poster_state: root.join(".tmp/kwf-progress-poster-state.json"),
        }
    }
}
