// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic JSON file persistence: write to `.tmp`, `fsync`, rename. Used by
//! every small state file the autopilot persists (session map, auto-reopen
//! cursor, lock record, adapter configuration).

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::StorageError;

/// Serialize `value` to `path` atomically: write to a sibling `.tmp` file,
/// `fsync`, then rename over the destination. A crash at any point before
/// the rename leaves the previous `path` (if any) untouched.
pub fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        let file = writer.into_inner().map_err(|e| e.into_error())?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Load and parse `path`. Returns `Ok(None)` when the file is absent. A
/// file that exists but fails to parse is treated as absent rather than
/// erroring: every caller of this function persists state the engine can
/// safely rebuild from scratch.
pub fn read_atomic<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read(path)?;
    match serde_json::from_slice(&contents) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "discarding unparseable state file");
            Ok(None)
        }
    }
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
