// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cron-dispatch` (§6): the unattended entry point a scheduler invokes.
//! Runs one tick, turns its outcome into a dispatcher plan against the
//! persisted session map, hands the `work` action's instruction to the
//! external worker agent over stdin, parses its terminal command from
//! stdout, and applies that command back to the session map.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Args;
use kwf_adapters::AdapterPort;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::commands::autopilot::apply_follow_up;
use crate::output::{render, OutputFormat};
use crate::paths::Paths;
use kwf_engine::dispatcher::{build_dispatcher_plan, AutopilotOutput, DispatchAction};
use kwf_engine::reopen::{run_auto_reopen_watcher, AutoReopenConfig};
use kwf_engine::tick::{tick, TickConfig};
use kwf_engine::{apply_worker_command_to_session_map, validate_worker_response_contract};

const AGENT_TIMEOUT: Duration = Duration::from_secs(20 * 60);

#[derive(Args)]
pub struct CronDispatchArgs {
    /// Executable invoked with the dispatch instruction on stdin, whose
    /// stdout is parsed for a terminal command (§4.7)
    #[arg(long)]
    pub agent: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
enum DispatchOutcome {
    NoAction,
    Finalized { ticket_id: String },
    Dispatched { ticket_id: String, session_id: String, reopened: bool },
    WorkerContractViolated { ticket_id: String, violations: usize },
}

pub async fn handle(adapter: &dyn AdapterPort, args: CronDispatchArgs, paths: &Paths, format: OutputFormat) -> Result<()> {
    let now = Utc::now();
    let tick_config = TickConfig::new(paths.lock.clone(), std::process::id());
    let outcome = tick(adapter, now, &tick_config).await.context("running autopilot tick")?;
    apply_follow_up(adapter, &outcome).await?;

    let me = adapter.whoami().await.context("whoami before auto-reopen scan")?;
    let mut cursor = kwf_storage::AutoReopenCursor::load(&paths.auto_reopen_cursor).context("loading auto-reopen cursor")?;
    run_auto_reopen_watcher(adapter, &me, &mut cursor, &AutoReopenConfig::default())
        .await
        .context("running auto-reopen watcher")?;
    cursor.save(&paths.auto_reopen_cursor).context("persisting auto-reopen cursor")?;

    let context = match outcome.ticket_id() {
        Some(id) => Some(crate::ticket_context::build_ticket_context(adapter, id).await?),
        None => None,
    };
    let next_ticket = match &outcome {
        kwf_engine::tick::TickOutcome::Blocked { .. } | kwf_engine::tick::TickOutcome::Completed { .. } => {
            let backlog = adapter.list_backlog_ids_in_order().await.context("listing backlog for next ticket")?;
            match backlog.first() {
                Some(id) => Some(crate::ticket_context::build_ticket_context(adapter, id).await?),
                None => None,
            }
        }
        _ => None,
    };
    let autopilot_output = AutopilotOutput {
        context,
        next_ticket,
        outcome,
    };

    let previous_map = kwf_storage::SessionMap::load(&paths.session_map).context("loading session map")?;
    let (mut next_map, actions, _active) = build_dispatcher_plan(&previous_map, now, &autopilot_output);

    let mut last_outcome = DispatchOutcome::NoAction;
    for action in &actions {
        last_outcome = match action {
            DispatchAction::Finalize { ticket_id, .. } => DispatchOutcome::Finalized { ticket_id: ticket_id.clone() },
            DispatchAction::Work {
                ticket_id,
                session_id,
                instruction,
            } => {
                let response = invoke_worker_agent(&args.agent, instruction).await?;
                let validation = validate_worker_response_contract(&response);
                match validation.command {
                    Some(command) => {
                        next_map = apply_worker_command_to_session_map(&next_map, ticket_id, &command, Utc::now());
                        DispatchOutcome::Dispatched {
                            ticket_id: ticket_id.clone(),
                            session_id: session_id.clone(),
                            reopened: matches!(command.kind, kwf_engine::contract::WorkerCommandKind::Continue),
                        }
                    }
                    None => DispatchOutcome::WorkerContractViolated {
                        ticket_id: ticket_id.clone(),
                        violations: validation.violations.len(),
                    },
                }
            }
        };
    }

    next_map.save(&paths.session_map).context("persisting session map")?;

    render(format, &last_outcome, |o| format!("{o:?}"))
}

/// Runs the worker agent, feeding `instruction` on stdin and returning its
/// trimmed stdout, which the caller parses as the worker's terminal
/// response (§4.7).
async fn invoke_worker_agent(agent: &str, instruction: &str) -> Result<String> {
    let mut child = Command::new(agent)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawning worker agent {agent:?}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(instruction.as_bytes()).await.context("writing instruction to worker agent stdin")?;
    }

    let output = tokio::time::timeout(AGENT_TIMEOUT, child.wait_with_output())
        .await
        .with_context(|| format!("worker agent {agent:?} timed out after {AGENT_TIMEOUT:?}"))?
        .with_context(|| format!("waiting on worker agent {agent:?}"))?;

    if !output.status.success() {
        bail!(
            "worker agent {agent:?} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
