// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session dispatcher (§4.8): owns the stable worker-session identity
//! per ticket and turns a tick outcome into finalize/work actions against a
//! durable [`SessionMap`], without mutating its input.

use chrono::{DateTime, Utc};
use kwf_adapters::{Attachment, LinkedWorkItem};
use kwf_core::Comment;
use kwf_storage::{ActivePointer, SessionEntry, SessionMap, SessionState};
use serde::Serialize;

use crate::contract::{WorkerCommand, WorkerCommandKind};
use crate::tick::TickOutcome;

const SESSION_ID_MAX_LEN: usize = 80;
const SLUG_MAX_LEN: usize = 40;

const EXECUTION_CONTRACT: &str = "Execute real work before reporting back. Your response must end with exactly one terminal command, preceded by an EVIDENCE section substantiating what you actually did.";

const ALLOWED_TERMINAL_COMMANDS: &str = "kanban-workflow continue --text \"<text>\"\nkanban-workflow blocked  --text \"<text>\"\nkanban-workflow completed --result \"<text>\"";

/// The JSON ticket-context payload embedded in a `work` action's instruction.
#[derive(Debug, Clone, Serialize)]
pub struct TicketContext {
    pub id: String,
    pub title: String,
    pub body: Option<String>,
    pub url: Option<String>,
    pub comments: Vec<Comment>,
    pub attachments: Vec<Attachment>,
    pub links: Vec<LinkedWorkItem>,
}

/// The autopilot's tick result as the dispatcher consumes it: the raw
/// decision-engine outcome, the context needed to build a `work` action for
/// its ticket (if any), and an optional immediately-available next ticket
/// when a `blocked`/`completed` outcome frees the worker up right away.
#[derive(Debug, Clone)]
pub struct AutopilotOutput {
    pub outcome: TickOutcome,
    pub context: Option<TicketContext>,
    pub next_ticket: Option<TicketContext>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchAction {
    Work {
        ticket_id: String,
        session_id: String,
        instruction: String,
    },
    Finalize {
        ticket_id: String,
        session_id: String,
        last_state: SessionState,
    },
}

/// Computes `(nextMap, actions, activeTicketId)` from `previous` and
/// `output`, leaving `previous` untouched.
pub fn build_dispatcher_plan(
    previous: &SessionMap,
    now: DateTime<Utc>,
    output: &AutopilotOutput,
) -> (SessionMap, Vec<DispatchAction>, Option<String>) {
    let mut next_map = previous.clone();
    let mut actions = Vec::new();

    match &output.outcome {
        TickOutcome::InProgress { id, .. } | TickOutcome::Started { id, .. } => {
            let title = output.context.as_ref().map(|c| c.title.as_str());
            let session_id = ensure_open_session(&mut next_map, id, title, now);
            next_map.active = Some(ActivePointer {
                ticket_id: id.clone(),
                session_id: session_id.clone(),
            });
            actions.push(DispatchAction::Work {
                ticket_id: id.clone(),
                instruction: build_work_instruction(id, &session_label(&next_map, id), output.context.as_ref()),
                session_id,
            });
        }
        TickOutcome::Blocked { id, .. } => {
            finalize_ticket(&mut next_map, &mut actions, id, SessionState::Blocked, now);
            append_next_ticket_work(&mut next_map, &mut actions, output, now);
        }
        TickOutcome::Completed { id, .. } => {
            finalize_ticket(&mut next_map, &mut actions, id, SessionState::Completed, now);
            append_next_ticket_work(&mut next_map, &mut actions, output, now);
        }
        TickOutcome::NoWork { .. } => {
            next_map.active = None;
        }
    }

    let active_ticket_id = next_map.active.as_ref().map(|a| a.ticket_id.clone());
    (next_map, actions, active_ticket_id)
}

/// Applies the worker's parsed terminal command to the session map
/// post-dispatch: `continue` reopens the ticket's session; `blocked`/
/// `completed` close it. Does not mutate `map` in place by convention with
/// [`build_dispatcher_plan`]; callers persist the returned map.
pub fn apply_worker_command_to_session_map(
    map: &SessionMap,
    ticket_id: &str,
    command: &WorkerCommand,
    now: DateTime<Utc>,
) -> SessionMap {
    let mut next = map.clone();
    let Some(entry) = next.tickets.get_mut(ticket_id) else {
        return next;
    };

    entry.last_seen_at = now;
    match command.kind {
        WorkerCommandKind::Continue => {
            entry.last_state = SessionState::InProgress;
            entry.closed_at = None;
            next.active = Some(ActivePointer {
                ticket_id: ticket_id.to_string(),
                session_id: entry.session_id.clone(),
            });
        }
        WorkerCommandKind::Blocked => {
            entry.last_state = SessionState::Blocked;
            entry.closed_at = Some(now);
            clear_active_if_matches(&mut next, ticket_id);
        }
        WorkerCommandKind::Completed => {
            entry.last_state = SessionState::Completed;
            entry.closed_at = Some(now);
            clear_active_if_matches(&mut next, ticket_id);
        }
    }
    next
}

fn finalize_ticket(
    map: &mut SessionMap,
    actions: &mut Vec<DispatchAction>,
    ticket_id: &str,
    last_state: SessionState,
    now: DateTime<Utc>,
) {
    let session_id = ensure_open_session(map, ticket_id, None, now);
    if let Some(entry) = map.tickets.get_mut(ticket_id) {
        entry.last_state = last_state;
        entry.last_seen_at = now;
        entry.closed_at = Some(now);
    }
    clear_active_if_matches(map, ticket_id);
    actions.push(DispatchAction::Finalize {
        ticket_id: ticket_id.to_string(),
        session_id,
        last_state,
    });
}

fn append_next_ticket_work(
    map: &mut SessionMap,
    actions: &mut Vec<DispatchAction>,
    output: &AutopilotOutput,
    now: DateTime<Utc>,
) {
    let Some(next_ticket) = &output.next_ticket else {
        return;
    };
    let session_id = ensure_open_session(map, &next_ticket.id, Some(next_ticket.title.as_str()), now);
    map.active = Some(ActivePointer {
        ticket_id: next_ticket.id.clone(),
        session_id: session_id.clone(),
    });
    actions.push(DispatchAction::Work {
        ticket_id: next_ticket.id.clone(),
        instruction: build_work_instruction(&next_ticket.id, &session_label(map, &next_ticket.id), Some(next_ticket)),
        session_id,
    });
}

fn clear_active_if_matches(map: &mut SessionMap, ticket_id: &str) {
    if map.active.as_ref().is_some_and(|a| a.ticket_id == ticket_id) {
        map.active = None;
    }
}

/// Reuses the ticket's open (non-closed) session if one exists; otherwise
/// mints a fresh, stable session id and records it with `lastState=in_progress`.
fn ensure_open_session(map: &mut SessionMap, ticket_id: &str, title: Option<&str>, now: DateTime<Utc>) -> String {
    if let Some(entry) = map.tickets.get(ticket_id) {
        if !entry.is_closed() {
            let session_id = entry.session_id.clone();
            if let Some(entry) = map.tickets.get_mut(ticket_id) {
                entry.last_state = SessionState::InProgress;
                entry.last_seen_at = now;
            }
            return session_id;
        }
    }

    let session_id = build_session_id(ticket_id, title);
    let label = title.map(|t| format!("{ticket_id} {t}")).unwrap_or_else(|| ticket_id.to_string());
    map.tickets.insert(
        ticket_id.to_string(),
        SessionEntry {
            session_id: session_id.clone(),
            session_label: Some(label),
            last_state: SessionState::InProgress,
            last_seen_at: now,
            closed_at: None,
        },
    );
    session_id
}

fn session_label(map: &SessionMap, ticket_id: &str) -> String {
    map.entry(ticket_id)
        .and_then(|e| e.session_label.clone())
        .unwrap_or_else(|| ticket_id.to_string())
}

/// `kanban-workflow-worker-<sanitized-id>[-<slug-of-title>]`, restricted to
/// `[a-zA-Z0-9_-]` and capped in length so the id is stable and safe to use
/// as a process/tmux-session name by the worker agent runner.
fn build_session_id(ticket_id: &str, title: Option<&str>) -> String {
    let sanitized_id = sanitize(ticket_id, SLUG_MAX_LEN);
    let mut session_id = format!("kanban-workflow-worker-{sanitized_id}");
    if let Some(title) = title {
        let slug = slugify(title, SLUG_MAX_LEN);
        if !slug.is_empty() {
            session_id.push('-');
            session_id.push_str(&slug);
        }
    }
    session_id.truncate(SESSION_ID_MAX_LEN);
    session_id
}

fn sanitize(raw: &str, max_len: usize) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
        .collect();
    out.truncate(max_len);
    out
}

fn slugify(raw: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_dash = false;
    for c in raw.to_lowercase().chars() {
        let c = if c.is_ascii_alphanumeric() { c } else { '-' };
        if c == '-' {
            if last_was_dash {
                continue;
            }
            last_was_dash = true;
        } else {
            last_was_dash = false;
        }
        out.push(c);
    }
    out.truncate(max_len);
    out.trim_matches('-').to_string()
}

fn build_work_instruction(ticket_id: &str, label: &str, context: Option<&TicketContext>) -> String {
    let context_json = match context {
        Some(ctx) => serde_json::to_string_pretty(ctx).unwrap_or_else(|_| format!("{{\"id\": {ticket_id:?}}}")),
        None => format!("{{\"id\": {ticket_id:?}}}"),
    };

    format!(
        "DO WORK NOW on ticket {ticket_id}.\n{label}\n\n{EXECUTION_CONTRACT}\n\n{ALLOWED_TERMINAL_COMMANDS}\n\n{context_json}"
    )
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
