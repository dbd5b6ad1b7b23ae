// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The canonical four-stage Kanban model and normalization from free-form
//! platform strings (list names, workflow states, labels).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// The four stages every adapter's native states are mapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Todo,
    Blocked,
    InProgress,
    InReview,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Todo, Stage::Blocked, Stage::InProgress, Stage::InReview];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Todo => "todo",
            Stage::Blocked => "blocked",
            Stage::InProgress => "in-progress",
            Stage::InReview => "in-review",
        }
    }

    /// Normalize an arbitrary platform string into a canonical stage.
    ///
    /// Trims, lowercases, strips a leading `stage:`/`stage/` prefix, folds
    /// `_`/space into `-`, collapses repeated `-`, and matches the historical
    /// alias `backlog` to [`Stage::Todo`].
    pub fn from_any(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim().to_lowercase();
        let without_prefix = trimmed
            .strip_prefix("stage:")
            .or_else(|| trimmed.strip_prefix("stage/"))
            .unwrap_or(&trimmed);

        let mut folded = String::with_capacity(without_prefix.len());
        let mut last_was_dash = false;
        for ch in without_prefix.trim().chars() {
            let c = if ch == '_' || ch == ' ' { '-' } else { ch };
            if c == '-' {
                if last_was_dash {
                    continue;
                }
                last_was_dash = true;
            } else {
                last_was_dash = false;
            }
            folded.push(c);
        }
        let folded = folded.trim_matches('-');

        match folded {
            "todo" | "backlog" => Ok(Stage::Todo),
            "blocked" => Ok(Stage::Blocked),
            "in-progress" | "inprogress" => Ok(Stage::InProgress),
            "in-review" | "inreview" => Ok(Stage::InReview),
            other => Err(CoreError::UnknownStage {
                raw: raw.to_string(),
                normalized: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
#[path = "stage_tests.rs"]
mod tests;
