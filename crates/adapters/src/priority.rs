// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps a platform's free-form priority label to a numeric rank used to
//! order the backlog when no explicit ordering field is available.

/// Higher is more urgent. `0` is "no priority".
pub fn priority_rank(label: &str) -> u8 {
    match label.trim().to_lowercase().as_str() {
        "urgent" | "critical" | "blocker" | "highest" => 5,
        "high" => 4,
        "medium" | "med" | "normal" => 3,
        "low" => 2,
        "lowest" => 1,
        "" | "none" | "no-priority" | "no priority" => 0,
        numeric => numeric.parse::<u8>().unwrap_or(0),
    }
}

#[cfg(test)]
#[path = "priority_tests.rs"]
mod tests;
