// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builds the `TicketContext` JSON payload (§4.8) shared by `next`, `show`,
//! and the dispatcher's `work` action instruction.

use anyhow::{Context, Result};
use kwf_adapters::AdapterPort;
use kwf_engine::TicketContext;

pub async fn build_ticket_context(adapter: &dyn AdapterPort, id: &str) -> Result<TicketContext> {
    let details = adapter.get_work_item(id).await.with_context(|| format!("fetching ticket {id}"))?;
    Ok(TicketContext {
        id: details.item.id,
        title: details.item.title,
        body: details.item.body,
        url: details.item.url,
        comments: details.comments,
        attachments: details.attachments,
        links: details.links,
    })
}
