// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `autopilot-tick` (§6): runs the decision engine once, applies the
//! follow-up mutation the outcome implies (unless `--dry-run`), and prints
//! an outcome envelope for a human or a script (`-o json`) to act on.

use anyhow::{Context, Result};
use clap::Args;
use kwf_adapters::AdapterPort;
use kwf_core::Stage;
use serde::Serialize;

use crate::output::{render, OutputFormat};
use crate::paths::Paths;
use crate::ticket_context::build_ticket_context;
use kwf_engine::tick::{completion_is_proven, tick, TickConfig, TickOutcome};

#[derive(Args)]
pub struct AutopilotTickArgs {
    /// Decide without mutating the board
    #[arg(long)]
    pub dry_run: bool,
}

/// The action actually taken against the board for this tick, mirroring
/// the outcome but naming the mutation (or absence of one) explicitly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum AppliedAction {
    None,
    MovedToInProgress,
    MovedToInReview,
    MovedToBlocked,
}

#[derive(Debug, Clone, Serialize)]
struct TickEnvelope {
    tick: TickOutcomeView,
    next_ticket: Option<kwf_engine::TicketContext>,
    halt_options: Vec<String>,
    action: AppliedAction,
    dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
struct TickOutcomeView {
    kind: &'static str,
    ticket_id: Option<String>,
    reason_code: Option<&'static str>,
}

impl From<&TickOutcome> for TickOutcomeView {
    fn from(outcome: &TickOutcome) -> Self {
        Self {
            kind: outcome.kind(),
            ticket_id: outcome.ticket_id().map(str::to_string),
            reason_code: outcome.reason_code(),
        }
    }
}

pub async fn handle(adapter: &dyn AdapterPort, args: AutopilotTickArgs, paths: &Paths, format: OutputFormat) -> Result<()> {
    let now = chrono::Utc::now();
    let config = TickConfig::new(paths.lock.clone(), std::process::id());

    let outcome = tick(adapter, now, &config).await.context("running autopilot tick")?;

    let action = if args.dry_run {
        AppliedAction::None
    } else {
        apply_follow_up(adapter, &outcome).await?
    };

    let next_ticket = match &outcome {
        TickOutcome::Blocked { .. } | TickOutcome::Completed { .. } if !args.dry_run => {
            let backlog = adapter.list_backlog_ids_in_order().await.context("listing backlog for next ticket")?;
            match backlog.first() {
                Some(id) => Some(build_ticket_context(adapter, id).await?),
                None => None,
            }
        }
        _ => None,
    };

    let envelope = TickEnvelope {
        tick: TickOutcomeView::from(&outcome),
        halt_options: halt_options(&outcome),
        next_ticket,
        action,
        dry_run: args.dry_run,
    };

    render(format, &envelope, |e| {
        format!(
            "tick={} ticket={} action={:?} dry_run={}",
            e.tick.kind,
            e.tick.ticket_id.as_deref().unwrap_or("-"),
            e.action,
            e.dry_run
        )
    })
}

/// Applies the mutation a tick outcome implies: `started` moves the ticket
/// to `in-progress`; `completed` moves it to `in-review` only once the
/// completion proof gate (§4.4) is satisfied; `blocked` moves it to
/// `blocked` with the staleness reason recorded as a comment. `in_progress`
/// (the engine already healed any extra assignments itself before
/// returning this outcome) and `no_work` never mutate further.
pub(crate) async fn apply_follow_up(adapter: &dyn AdapterPort, outcome: &TickOutcome) -> Result<AppliedAction> {
    match outcome {
        TickOutcome::Started { id, .. } => {
            adapter.set_stage(id, Stage::InProgress).await.with_context(|| format!("starting ticket {id}"))?;
            Ok(AppliedAction::MovedToInProgress)
        }
        TickOutcome::Completed { id, .. } if completion_is_proven(outcome) => {
            adapter.set_stage(id, Stage::InReview).await.with_context(|| format!("completing ticket {id}"))?;
            Ok(AppliedAction::MovedToInReview)
        }
        TickOutcome::Completed { id, .. } => {
            tracing::warn!(target: "kwf_cli::autopilot", ticket_id = id, "completed outcome did not pass the completion proof gate; leaving ticket in place");
            Ok(AppliedAction::None)
        }
        TickOutcome::Blocked { id, reason, .. } => {
            adapter.set_stage(id, Stage::Blocked).await.with_context(|| format!("blocking ticket {id}"))?;
            adapter.add_comment(id, reason).await.with_context(|| format!("posting blocker reason on {id}"))?;
            Ok(AppliedAction::MovedToBlocked)
        }
        TickOutcome::InProgress { .. } | TickOutcome::NoWork { .. } => Ok(AppliedAction::None),
    }
}

/// The CLI commands a human could reasonably run next given this outcome,
/// surfaced so a caller driving the envelope doesn't need its own copy of
/// the stage machine.
fn halt_options(outcome: &TickOutcome) -> Vec<String> {
    match outcome {
        TickOutcome::NoWork { reason_code: "no_backlog_assigned" } => vec!["create".to_string(), "setup".to_string()],
        TickOutcome::NoWork { .. } => vec!["next".to_string()],
        TickOutcome::Blocked { id, .. } => vec![format!("ask --id {id} --text <reason>"), format!("update --id {id} --text <status>")],
        TickOutcome::Completed { id, .. } => vec![format!("show --id {id}"), "next".to_string()],
        TickOutcome::Started { .. } | TickOutcome::InProgress { .. } => Vec::new(),
    }
}
