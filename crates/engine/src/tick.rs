// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The tick decision engine (§4.4): one call, one outcome. This module
//! never mutates a ticket's stage on the "start next" path — that's left
//! to the CLI orchestrator so a dry-run can preview without side effects.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use kwf_adapters::{AdapterPort, ListCommentsOptions, WorkItemDetails};
use kwf_core::{Comment, Stage};

use crate::error::TickError;
use crate::lock::{self, DEFAULT_TTL_SECS};

/// Checked newest-to-least-strong; the first marker that appears in any
/// fetched comment (in this order) is the one reported as evidence.
const COMPLETION_MARKERS: [&str; 4] = ["completed:", "done and verified", "shipped and verified", "ready for review and verified"];
const BLOCKER_MARKERS: [&str; 5] = ["waiting on", "blocked on", "blocked here", "need approval", "need credential"];

const DEFAULT_COMMENT_LIMIT: usize = 20;
const DEFAULT_STALE_THRESHOLD_MINUTES: i64 = 15;

#[derive(Debug, Clone)]
pub struct TickConfig {
    pub lock_path: PathBuf,
    pub lock_ttl_secs: i64,
    pub holder_pid: u32,
    pub comment_limit: usize,
    pub stale_threshold_minutes: i64,
}

impl TickConfig {
    pub fn new(lock_path: PathBuf, holder_pid: u32) -> Self {
        Self {
            lock_path,
            lock_ttl_secs: DEFAULT_TTL_SECS,
            holder_pid,
            comment_limit: DEFAULT_COMMENT_LIMIT,
            stale_threshold_minutes: DEFAULT_STALE_THRESHOLD_MINUTES,
        }
    }
}

/// Evidence carried verbatim by an outcome so the proof gate (and logging)
/// can inspect what triggered a decision without re-deriving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evidence {
    pub matched_signal: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    InProgress { id: String, in_progress_ids: Vec<String> },
    Completed { id: String, reason_code: &'static str, evidence: Evidence },
    Blocked { id: String, minutes_stale: i64, reason: String, reason_code: &'static str, evidence: Evidence },
    Started { id: String, reason_code: &'static str, evidence: Evidence },
    NoWork { reason_code: &'static str },
}

impl TickOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            TickOutcome::InProgress { .. } => "in_progress",
            TickOutcome::Completed { .. } => "completed",
            TickOutcome::Blocked { .. } => "blocked",
            TickOutcome::Started { .. } => "started",
            TickOutcome::NoWork { .. } => "no_work",
        }
    }

    pub fn ticket_id(&self) -> Option<&str> {
        match self {
            TickOutcome::InProgress { id, .. }
            | TickOutcome::Completed { id, .. }
            | TickOutcome::Blocked { id, .. }
            | TickOutcome::Started { id, .. } => Some(id),
            TickOutcome::NoWork { .. } => None,
        }
    }

    pub fn reason_code(&self) -> Option<&'static str> {
        match self {
            TickOutcome::Completed { reason_code, .. }
            | TickOutcome::Blocked { reason_code, .. }
            | TickOutcome::Started { reason_code, .. }
            | TickOutcome::NoWork { reason_code } => Some(reason_code),
            TickOutcome::InProgress { .. } => None,
        }
    }
}

/// The CLI orchestrator's completion proof gate (§4.4): only act on a
/// `Completed` outcome (e.g. call `set_stage(.., InReview)`) when this
/// returns true. The engine itself only ever emits `completion_signal_strong`,
/// but callers that synthesize outcomes from other sources must still check.
pub fn completion_is_proven(outcome: &TickOutcome) -> bool {
    matches!(outcome, TickOutcome::Completed { reason_code, .. } if *reason_code == "completion_signal_strong")
}

/// Runs exactly one tick: acquires the lock, makes one decision, releases
/// the lock on every exit path (including error returns, via `LockGuard`'s
/// `Drop`).
pub async fn tick(adapter: &dyn AdapterPort, now: DateTime<Utc>, config: &TickConfig) -> Result<TickOutcome, TickError> {
    let guard = lock::try_acquire_lock(&config.lock_path, now, config.lock_ttl_secs, config.holder_pid)?;
    let outcome = tick_inner(adapter, now, config).await;
    guard.release();

    match &outcome {
        Ok(o) => tracing::info!(
            target: "kwf_engine::tick",
            kind = o.kind(),
            ticket_id = o.ticket_id(),
            reason_code = o.reason_code(),
            "tick complete"
        ),
        Err(e) => tracing::error!(target: "kwf_engine::tick", error = %e, "tick failed"),
    }

    outcome
}

async fn tick_inner(adapter: &dyn AdapterPort, now: DateTime<Utc>, config: &TickConfig) -> Result<TickOutcome, TickError> {
    if let Err(e) = adapter.reconcile_assignments().await {
        tracing::warn!(target: "kwf_engine::tick", error = %e, "reconcile_assignments failed (non-fatal)");
    }

    let me = adapter.whoami().await?;
    let in_progress = adapter.list_ids_by_stage(Stage::InProgress).await?;

    let mut details: HashMap<String, WorkItemDetails> = HashMap::with_capacity(in_progress.len());
    for id in &in_progress {
        details.insert(id.clone(), adapter.get_work_item(id).await?);
    }

    let mut mine: Vec<String> = in_progress
        .iter()
        .filter(|id| details.get(*id).map(|d| d.item.is_assigned_to(&me)).unwrap_or(false))
        .cloned()
        .collect();
    mine.sort_by(|a, b| oldest_updated_first(&details, a, b));

    if mine.len() > 1 {
        let primary = mine[0].clone();
        for extra in &mine[1..] {
            adapter.set_stage(extra, Stage::Todo).await?;
            adapter
                .add_comment(
                    extra,
                    "Moved back to Backlog automatically: more than one ticket was assigned to me in-progress.",
                )
                .await?;
        }
        return Ok(TickOutcome::InProgress {
            id: primary.clone(),
            in_progress_ids: vec![primary],
        });
    }

    if let Some(id) = mine.into_iter().next() {
        return Ok(decide_in_progress_ticket(adapter, &id, &details[&id], now, config).await?);
    }

    decide_from_backlog(adapter, &me, config).await
}

fn oldest_updated_first(details: &HashMap<String, WorkItemDetails>, a: &str, b: &str) -> std::cmp::Ordering {
    let au = details.get(a).and_then(|d| d.item.updated_at);
    let bu = details.get(b).and_then(|d| d.item.updated_at);
    match (au, bu) {
        (Some(au), Some(bu)) => au.cmp(&bu).then_with(|| a.cmp(b)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

async fn decide_in_progress_ticket(
    adapter: &dyn AdapterPort,
    id: &str,
    details: &WorkItemDetails,
    now: DateTime<Utc>,
    config: &TickConfig,
) -> Result<TickOutcome, kwf_adapters::AdapterError> {
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

    let updated_at = details.item.updated_at;
    let evidence_base = Evidence {
        matched_signal: None,
        updated_at,
    };

    if let Some(marker) = find_first_marker(&comments, &COMPLETION_MARKERS) {
        return Ok(TickOutcome::Completed {
            id: id.to_string(),
            reason_code: "completion_signal_strong",
            evidence: Evidence {
                matched_signal: Some(marker),
                ..evidence_base
            },
        });
    }

    let minutes_stale = updated_at.map(|u| (now - u).num_minutes()).unwrap_or(0);
    if minutes_stale >= config.stale_threshold_minutes {
        if let Some(marker) = find_first_marker(&comments, &BLOCKER_MARKERS) {
            return Ok(TickOutcome::Blocked {
                id: id.to_string(),
                minutes_stale,
                reason: format!("stale for {minutes_stale} minute(s) with blocker signal {marker:?}"),
                reason_code: "stale_with_blocker_signal",
                evidence: Evidence {
                    matched_signal: Some(marker),
                    ..evidence_base
                },
            });
        }
    }

    Ok(TickOutcome::InProgress {
        id: id.to_string(),
        in_progress_ids: vec![id.to_string()],
    })
}

async fn decide_from_backlog(
    adapter: &dyn AdapterPort,
    me: &kwf_core::Actor,
    _config: &TickConfig,
) -> Result<TickOutcome, TickError> {
    let backlog = adapter.list_backlog_ids_in_order().await?;
    let Some(next_id) = backlog.first() else {
        return Ok(TickOutcome::NoWork {
            reason_code: "no_backlog_assigned",
        });
    };

    let details = adapter.get_work_item(next_id).await?;
    if !details.item.is_assigned_to(me) {
        return Ok(TickOutcome::NoWork {
            reason_code: "next_not_assigned_to_me",
        });
    }

    Ok(TickOutcome::Started {
        id: next_id.clone(),
        reason_code: "start_next_assigned_backlog",
        evidence: Evidence {
            matched_signal: None,
            updated_at: details.item.updated_at,
        },
    })
}

fn find_first_marker(comments: &[Comment], markers: &[&str]) -> Option<String> {
    for marker in markers {
        for comment in comments {
            if comment.body.to_lowercase().contains(marker) {
                return Some((*marker).to_string());
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "tick_tests.rs"]
mod tests;
