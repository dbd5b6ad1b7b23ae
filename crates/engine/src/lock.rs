// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A best-effort, file-backed single-holder lock with stale-owner recovery
//! (`.tmp/kanban_autopilot.lock`). Exclusivity comes from `O_EXCL` file
//! creation, not `flock`, so the lock is only meaningful across processes
//! that agree to use this same acquisition path.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use kwf_storage::LockRecord;

use crate::error::LockError;

/// Default time-to-live before an unreleased lock is considered abandoned.
pub const DEFAULT_TTL_SECS: i64 = 2 * 60 * 60;

/// Holds a lock acquired by [`try_acquire_lock`]. Releasing is idempotent
/// and also happens on drop, so the lock is freed on every exit path —
/// including early returns from a failed tick — without requiring callers
/// to remember to call [`LockGuard::release`].
pub struct LockGuard {
    path: PathBuf,
    released: bool,
}

impl LockGuard {
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::info!(target: "kwf_engine::lock", path = %self.path.display(), "lock released"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(target: "kwf_engine::lock", path = %self.path.display(), error = %e, "failed to remove lock file on release")
            }
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.release_inner();
    }
}

/// Attempts to acquire the lock at `path`. On conflict, reads the existing
/// record: if its timestamp is missing, unparseable (already collapsed to
/// `None` by [`kwf_storage::read_atomic`]'s lenient parse), or older than
/// `now - ttl`, the file is deleted and acquisition is retried exactly
/// once; otherwise acquisition fails with [`LockError::Held`].
pub fn try_acquire_lock(
    path: &Path,
    now: DateTime<Utc>,
    ttl_secs: i64,
    holder_pid: u32,
) -> Result<LockGuard, LockError> {
    match create_exclusive(path) {
        Ok(()) => return finish_acquire(path, now, holder_pid),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
        Err(e) => return Err(io_err(path, e)),
    }

    let existing = LockRecord::load(path)?;
    if let Some(record) = &existing {
        if (now - record.acquired_at).num_seconds() <= ttl_secs {
            tracing::warn!(
                target: "kwf_engine::lock",
                path = %path.display(),
                holder_pid = record.holder_pid,
                "lock already held"
            );
            return Err(LockError::Held {
                path: path.display().to_string(),
                holder_pid: record.holder_pid,
                acquired_at: record.acquired_at,
            });
        }
    }

    tracing::warn!(target: "kwf_engine::lock", path = %path.display(), "removing stale lock file");
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            return Err(io_err(path, e));
        }
    }

    match create_exclusive(path) {
        Ok(()) => finish_acquire(path, now, holder_pid),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            let record = LockRecord::load(path)?.unwrap_or_else(|| LockRecord::new(0, now));
            Err(LockError::Held {
                path: path.display().to_string(),
                holder_pid: record.holder_pid,
                acquired_at: record.acquired_at,
            })
        }
        Err(e) => Err(io_err(path, e)),
    }
}

fn create_exclusive(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().write(true).create_new(true).open(path)?;
    Ok(())
}

fn finish_acquire(path: &Path, now: DateTime<Utc>, holder_pid: u32) -> Result<LockGuard, LockError> {
    LockRecord::new(holder_pid, now).save(path)?;
    tracing::info!(target: "kwf_engine::lock", path = %path.display(), holder_pid, "lock acquired");
    Ok(LockGuard {
        path: path.to_path_buf(),
        released: false,
    })
}

fn io_err(path: &Path, source: io::Error) -> LockError {
    LockError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
