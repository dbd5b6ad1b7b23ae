// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The auto-reopen watcher (§4.6): moves `blocked`/`in-review` tickets back
//! to `todo` when a human (not the worker, and not a relayed worker reply)
//! has commented since the last scan.

use kwf_adapters::{AdapterError, AdapterPort, ListCommentsOptions};
use kwf_core::{Actor, Stage};
use kwf_storage::AutoReopenCursor;

const WATCHED_STAGES: [Stage; 2] = [Stage::Blocked, Stage::InReview];

#[derive(Debug, Clone)]
pub struct AutoReopenConfig {
    pub comment_limit: usize,
    pub dry_run: bool,
}

impl Default for AutoReopenConfig {
    fn default() -> Self {
        Self {
            comment_limit: 20,
            dry_run: false,
        }
    }
}

/// Runs one pass of the watcher over every ticket in `{blocked, in-review}`.
/// Returns the ids moved back to `todo`. Mutates `cursor` in place (unless
/// `config.dry_run`); callers are responsible for persisting it afterward.
pub async fn run_auto_reopen_watcher(
    adapter: &dyn AdapterPort,
    me: &Actor,
    cursor: &mut AutoReopenCursor,
    config: &AutoReopenConfig,
) -> Result<Vec<String>, AdapterError> {
    let identity_keys = me.identity_keys();
    let mut reopened = Vec::new();

    for stage in WATCHED_STAGES {
        let ids = adapter.list_ids_by_stage(stage).await?;
        for id in ids {
            if let Some(trigger) = scan_ticket(adapter, &id, &identity_keys, cursor, config).await? {
                reopened.push(trigger);
            }
        }
    }

    Ok(reopened)
}

/// Scans one ticket's comments newest-first, stopping at the previously
/// stored cursor. Returns `Some(id)` (and reopens the ticket) when a human
/// reply was found since that cursor.
async fn scan_ticket(
    adapter: &dyn AdapterPort,
    id: &str,
    identity_keys: &[String],
    cursor: &mut AutoReopenCursor,
    config: &AutoReopenConfig,
) -> Result<Option<String>, AdapterError> {
    let comments = adapter
        .list_comments(
            id,
            ListCommentsOptions {
                limit: config.comment_limit,
                newest_first: true,
                include_internal: false,
            },
        )
        .await?;

    let stored_cursor = cursor.newest_seen(id).map(str::to_string);
    let mut newest_comment_id: Option<String> = None;
    let mut human_trigger = false;

    for comment in &comments {
        if newest_comment_id.is_none() {
            newest_comment_id = Some(comment.id.clone());
        }
        if stored_cursor.as_deref() == Some(comment.id.as_str()) {
            break;
        }

        let effective_author_keys = match kwf_adapters::relayed_author(&comment.body) {
            Some(name) => vec![name],
            None => comment.author.identity_keys(),
        };
        let is_human = !effective_author_keys.iter().any(|k| identity_keys.contains(k));
        if is_human && !human_trigger {
            human_trigger = true;
            tracing::info!(target: "kwf_engine::reopen", ticket_id = id, comment_id = %comment.id, "human reply detected");
        }
    }

    if human_trigger && !config.dry_run {
        adapter.set_stage(id, Stage::Todo).await?;
    }

    if let Some(newest_id) = newest_comment_id {
        if !config.dry_run {
            cursor.advance(id, newest_id);
        }
    }

    Ok(human_trigger.then(|| id.to_string()))
}

#[cfg(test)]
#[path = "reopen_tests.rs"]
mod tests;
