// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The periodic progress poster (§4.9): throttled "still working" comments
//! on every ticket currently `in-progress`.

use chrono::{DateTime, Duration, Utc};
use kwf_adapters::{AdapterError, AdapterPort};
use kwf_core::Stage;
use kwf_storage::ProgressPosterState;

const DEFAULT_INTERVAL_MINUTES: i64 = 5;

#[derive(Debug, Clone)]
pub struct ProgressPosterConfig {
    pub interval: Duration,
    pub current_message: Option<String>,
    pub next_message: Option<String>,
}

impl Default for ProgressPosterConfig {
    fn default() -> Self {
        Self {
            interval: Duration::minutes(DEFAULT_INTERVAL_MINUTES),
            current_message: None,
            next_message: None,
        }
    }
}

/// Posts a throttled auto-comment to every `in-progress` ticket, pruning
/// tracked tickets that left that stage, and returns the ids actually
/// posted to. `state` is updated in place; callers persist it afterward.
pub async fn run_progress_auto_updates(
    adapter: &dyn AdapterPort,
    now: DateTime<Utc>,
    state: &mut ProgressPosterState,
    config: &ProgressPosterConfig,
) -> Result<Vec<String>, AdapterError> {
    let in_progress = adapter.list_ids_by_stage(Stage::InProgress).await?;
    state.retain_only(&in_progress);

    let mut posted = Vec::new();
    for id in &in_progress {
        let due = match state.last_posted_at(id) {
            None => true,
            Some(last) => now - last >= config.interval,
        };
        if !due {
            continue;
        }

        let body = build_progress_comment(config);
        adapter.add_comment(id, &body).await?;
        state.record(id.clone(), now);
        posted.push(id.clone());
        tracing::info!(target: "kwf_engine::progress", ticket_id = id, "posted progress auto-update");
    }

    Ok(posted)
}

fn build_progress_comment(config: &ProgressPosterConfig) -> String {
    let current = config
        .current_message
        .as_deref()
        .unwrap_or("continuing work on this ticket");
    let next = config
        .next_message
        .as_deref()
        .unwrap_or("post an update once there's a concrete result");
    format!("Progress update (auto):\n\n- Currently: {current}\n- Next: {next}")
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
