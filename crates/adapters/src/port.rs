// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The uniform contract every platform backend implements. The decision
//! engine never sees platform specifics past this boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use kwf_core::{Actor, Comment, Snapshot, Stage, WorkItem};
use serde::Serialize;

use crate::error::AdapterError;

#[derive(Debug, Clone)]
pub struct ListCommentsOptions {
    pub limit: usize,
    pub newest_first: bool,
    pub include_internal: bool,
}

impl Default for ListCommentsOptions {
    fn default() -> Self {
        Self {
            limit: 20,
            newest_first: true,
            include_internal: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkedWorkItem {
    pub id: String,
    pub title: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateTicketRequest {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedWorkItem {
    pub id: String,
    pub url: Option<String>,
}

/// Full detail for a single ticket, including a resolved (non-truncated,
/// HTML-stripped) body.
#[derive(Debug, Clone)]
pub struct WorkItemDetails {
    pub item: WorkItem,
    pub comments: Vec<Comment>,
    pub attachments: Vec<Attachment>,
    pub links: Vec<LinkedWorkItem>,
}

/// The polymorphic port every concrete platform backend (GitHub, Linear,
/// Plane, Planka) implements. A `stageMap` mapping all four canonical
/// stages is a precondition of construction; adapters do not expose it
/// through this trait, only via their configuration type.
#[async_trait]
pub trait AdapterPort: Send + Sync {
    /// Stable identifier, e.g. `"github"`, `"plane"`.
    fn name(&self) -> &str;

    /// The authenticated identity this adapter is acting as.
    async fn whoami(&self) -> Result<Actor, AdapterError>;

    /// Full current view of all mapped tickets.
    async fn fetch_snapshot(&self) -> Result<Snapshot, AdapterError>;

    /// Ids currently in `stage`, in adapter-defined but deterministic order.
    async fn list_ids_by_stage(&self, stage: Stage) -> Result<Vec<String>, AdapterError>;

    /// Ids in the `todo` stage in the order the engine should consume them.
    async fn list_backlog_ids_in_order(&self) -> Result<Vec<String>, AdapterError>;

    /// Full detail for a single ticket, preferring a detail endpoint over a
    /// list-truncated preview.
    async fn get_work_item(&self, id: &str) -> Result<WorkItemDetails, AdapterError>;

    async fn list_comments(&self, id: &str, options: ListCommentsOptions) -> Result<Vec<Comment>, AdapterError>;

    async fn list_attachments(&self, id: &str) -> Result<Vec<Attachment>, AdapterError>;

    async fn list_linked_work_items(&self, id: &str) -> Result<Vec<LinkedWorkItem>, AdapterError>;

    /// Idempotent: setting the current stage is a no-op success.
    async fn set_stage(&self, id: &str, stage: Stage) -> Result<(), AdapterError>;

    /// A body that trims to empty is silently ignored.
    async fn add_comment(&self, id: &str, body: &str) -> Result<(), AdapterError>;

    async fn create_in_backlog_and_assign_to_self(
        &self,
        request: CreateTicketRequest,
    ) -> Result<CreatedWorkItem, AdapterError>;

    /// Best-effort: assign any mapped-stage ticket with no assignee to its
    /// known creator. Failures must be swallowed by the implementation;
    /// this method itself may return `Ok(())` even when individual
    /// reconciliations failed.
    async fn reconcile_assignments(&self) -> Result<(), AdapterError> {
        Ok(())
    }
}

/// Fetches assignees for a batch of ids via repeated [`AdapterPort::get_work_item`]
/// calls, used by the engine's self-assignment filter (§4.4 step 5).
pub async fn fetch_assignees(
    adapter: &dyn AdapterPort,
    ids: &[String],
) -> Result<HashMap<String, Vec<Actor>>, AdapterError> {
    let mut out = HashMap::with_capacity(ids.len());
    for id in ids {
        let details = adapter.get_work_item(id).await?;
        out.insert(id.clone(), details.item.assignees);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "port_tests.rs"]
mod tests;
