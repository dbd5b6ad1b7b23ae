// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `next`: prints the next backlog ticket's details as JSON. Errors if
//! anything is currently `in-progress` (§6).

use anyhow::{Context, Result};
use kwf_adapters::AdapterPort;
use kwf_core::Stage;
use kwf_engine::WorkflowViolation;

use crate::output::{render, OutputFormat};
use crate::ticket_context::build_ticket_context;

pub async fn handle(adapter: &dyn AdapterPort, format: OutputFormat) -> Result<()> {
    let in_progress = adapter.list_ids_by_stage(Stage::InProgress).await.context("listing in-progress tickets")?;
    if let Some(id) = in_progress.first() {
        return Err(WorkflowViolation::NextWhileInProgress { id: id.clone() }.into());
    }

    let backlog = adapter.list_backlog_ids_in_order().await.context("listing backlog")?;
    let Some(id) = backlog.first() else {
        render(format, &Option::<()>::None, |_| "no backlog tickets".to_string())?;
        return Ok(());
    };

    let context = build_ticket_context(adapter, id).await?;
    render(format, &context, |c| format!("{} — {}", c.id, c.title))
}
