// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing wrapper for any [`AdapterPort`], for consistent observability
//! regardless of backend.

use async_trait::async_trait;
use kwf_core::{Actor, Comment, Snapshot, Stage};
use tracing::Instrument;

use crate::error::AdapterError;
use crate::port::{
    AdapterPort, Attachment, CreateTicketRequest, CreatedWorkItem, LinkedWorkItem, ListCommentsOptions,
    WorkItemDetails,
};

/// Wraps any [`AdapterPort`] implementation with `tracing` spans/events at
/// `target: "kwf_adapters"`.
pub struct TracedAdapter<A> {
    inner: A,
}

impl<A> TracedAdapter<A> {
    pub fn new(inner: A) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<A: AdapterPort> AdapterPort for TracedAdapter<A> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn whoami(&self) -> Result<Actor, AdapterError> {
        async {
            let result = self.inner.whoami().await;
            match &result {
                Ok(actor) => tracing::info!(target: "kwf_adapters", ?actor, "whoami ok"),
                Err(e) => tracing::error!(target: "kwf_adapters", error = %e, "whoami failed"),
            }
            result
        }
        .instrument(tracing::info_span!("adapter.whoami", adapter = self.inner.name()))
        .await
    }

    async fn fetch_snapshot(&self) -> Result<Snapshot, AdapterError> {
        async {
            let start = std::time::Instant::now();
            let result = self.inner.fetch_snapshot().await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(snap) => tracing::info!(target: "kwf_adapters", count = snap.len(), elapsed_ms, "fetch_snapshot ok"),
                Err(e) => tracing::error!(target: "kwf_adapters", error = %e, elapsed_ms, "fetch_snapshot failed"),
            }
            result
        }
        .instrument(tracing::info_span!("adapter.fetch_snapshot", adapter = self.inner.name()))
        .await
    }

    async fn list_ids_by_stage(&self, stage: Stage) -> Result<Vec<String>, AdapterError> {
        let result = self.inner.list_ids_by_stage(stage).await;
        if let Err(e) = &result {
            tracing::error!(target: "kwf_adapters", adapter = self.inner.name(), %stage, error = %e, "list_ids_by_stage failed");
        }
        result
    }

    async fn list_backlog_ids_in_order(&self) -> Result<Vec<String>, AdapterError> {
        let result = self.inner.list_backlog_ids_in_order().await;
        if let Err(e) = &result {
            tracing::error!(target: "kwf_adapters", adapter = self.inner.name(), error = %e, "list_backlog_ids_in_order failed");
        }
        result
    }

    async fn get_work_item(&self, id: &str) -> Result<WorkItemDetails, AdapterError> {
        let result = self.inner.get_work_item(id).await;
        if let Err(e) = &result {
            tracing::error!(target: "kwf_adapters", adapter = self.inner.name(), id, error = %e, "get_work_item failed");
        }
        result
    }

    async fn list_comments(&self, id: &str, options: ListCommentsOptions) -> Result<Vec<Comment>, AdapterError> {
        self.inner.list_comments(id, options).await
    }

    async fn list_attachments(&self, id: &str) -> Result<Vec<Attachment>, AdapterError> {
        self.inner.list_attachments(id).await
    }

    async fn list_linked_work_items(&self, id: &str) -> Result<Vec<LinkedWorkItem>, AdapterError> {
        self.inner.list_linked_work_items(id).await
    }

    async fn set_stage(&self, id: &str, stage: Stage) -> Result<(), AdapterError> {
        let result = self.inner.set_stage(id, stage).await;
        tracing::info!(target: "kwf_adapters", adapter = self.inner.name(), id, %stage, ok = result.is_ok(), "set_stage");
        result
    }

    async fn add_comment(&self, id: &str, body: &str) -> Result<(), AdapterError> {
        let result = self.inner.add_comment(id, body).await;
        if let Err(e) = &result {
            tracing::error!(target: "kwf_adapters", adapter = self.inner.name(), id, error = %e, "add_comment failed");
        }
        result
    }

    async fn create_in_backlog_and_assign_to_self(
        &self,
        request: CreateTicketRequest,
    ) -> Result<CreatedWorkItem, AdapterError> {
        let result = self.inner.create_in_backlog_and_assign_to_self(request).await;
        match &result {
            Ok(created) => tracing::info!(target: "kwf_adapters", adapter = self.inner.name(), id = created.id, "created ticket"),
            Err(e) => tracing::error!(target: "kwf_adapters", adapter = self.inner.name(), error = %e, "create failed"),
        }
        result
    }

    async fn reconcile_assignments(&self) -> Result<(), AdapterError> {
        self.inner.reconcile_assignments().await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
