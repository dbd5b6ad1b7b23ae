// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `start`/`update`/`ask`/`complete`/`create`/`show` (§6): direct stage and
//! comment mutations driven by the §4.5 transition table, plus the two
//! read-only/creation commands that round out the manual surface.

use anyhow::{Context, Result};
use clap::Args;
use kwf_adapters::{AdapterPort, CreateTicketRequest};
use kwf_engine::{TransitionVerb, WorkflowViolation};

use crate::output::{render, OutputFormat};
use crate::ticket_context::build_ticket_context;

#[derive(Args)]
pub struct IdArgs {
    /// Ticket id
    #[arg(long)]
    pub id: String,
}

#[derive(Args)]
pub struct TextArgs {
    #[arg(long)]
    pub id: String,
    /// Freeform text to post as a comment
    #[arg(long)]
    pub text: String,
}

#[derive(Args)]
pub struct SummaryArgs {
    #[arg(long)]
    pub id: String,
    /// Completion summary, posted as a comment
    #[arg(long)]
    pub summary: String,
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub body: String,
}

async fn transition(adapter: &dyn AdapterPort, id: &str, verb: TransitionVerb) -> Result<kwf_core::Stage> {
    let details = adapter.get_work_item(id).await.with_context(|| format!("fetching ticket {id}"))?;
    let target = kwf_engine::apply_transition(details.item.stage, verb).ok_or_else(|| {
        WorkflowViolation::StageNotReachable {
            stage: format!("{verb:?} from {}", details.item.stage),
        }
    })?;
    adapter.set_stage(id, target).await.with_context(|| format!("moving ticket {id} to {target}"))?;
    Ok(target)
}

pub async fn start(adapter: &dyn AdapterPort, args: IdArgs, format: OutputFormat) -> Result<()> {
    let stage = transition(adapter, &args.id, TransitionVerb::Start).await?;
    render(format, &stage, |s| format!("{} moved to {s}", args.id))
}

pub async fn update(adapter: &dyn AdapterPort, args: TextArgs, format: OutputFormat) -> Result<()> {
    adapter.add_comment(&args.id, &args.text).await.context("posting update comment")?;
    render(format, &args.text, |t| format!("posted update on {}: {t}", args.id))
}

pub async fn ask(adapter: &dyn AdapterPort, args: TextArgs, format: OutputFormat) -> Result<()> {
    let stage = transition(adapter, &args.id, TransitionVerb::Ask).await?;
    adapter.add_comment(&args.id, &args.text).await.context("posting blocker comment")?;
    render(format, &stage, |s| format!("{} moved to {s}: {}", args.id, args.text))
}

pub async fn complete(adapter: &dyn AdapterPort, args: SummaryArgs, format: OutputFormat) -> Result<()> {
    let stage = transition(adapter, &args.id, TransitionVerb::Complete).await?;
    adapter.add_comment(&args.id, &args.summary).await.context("posting completion summary")?;
    render(format, &stage, |s| format!("{} moved to {s}: {}", args.id, args.summary))
}

pub async fn create(adapter: &dyn AdapterPort, args: CreateArgs, format: OutputFormat) -> Result<()> {
    let created = adapter
        .create_in_backlog_and_assign_to_self(CreateTicketRequest {
            title: args.title,
            body: args.body,
        })
        .await
        .context("creating ticket")?;
    render(format, &created, |c| format!("created {}{}", c.id, c.url.as_deref().map(|u| format!(" ({u})")).unwrap_or_default()))
}

pub async fn show(adapter: &dyn AdapterPort, args: IdArgs, format: OutputFormat) -> Result<()> {
    let context = build_ticket_context(adapter, &args.id).await?;
    render(format, &context, |c| format!("{} — {} ({} comments)", c.id, c.title, c.comments.len()))
}
