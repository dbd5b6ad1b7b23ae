// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An in-memory [`AdapterPort`] used by every engine-level test in place of
//! a real platform. Exported behind the `test-support` feature so other
//! crates can depend on it for their own tests.

use std::collections::HashMap;

use async_trait::async_trait;
use kwf_core::{Actor, Comment, Snapshot, Stage, WorkItem};
use parking_lot::Mutex;

use crate::error::AdapterError;
use crate::port::{
    AdapterPort, Attachment, CreateTicketRequest, CreatedWorkItem, LinkedWorkItem, ListCommentsOptions,
    WorkItemDetails,
};

#[derive(Debug, Default, Clone)]
struct FakeState {
    items: HashMap<String, WorkItem>,
    comments: HashMap<String, Vec<Comment>>,
    attachments: HashMap<String, Vec<Attachment>>,
    links: HashMap<String, Vec<LinkedWorkItem>>,
    calls: Vec<String>,
    next_created_id: u64,
}

/// An in-memory, fully scriptable stand-in for a real platform.
pub struct FakeAdapter {
    name: String,
    me: Actor,
    state: Mutex<FakeState>,
}

impl FakeAdapter {
    pub fn new(name: impl Into<String>, me: Actor) -> Self {
        Self {
            name: name.into(),
            me,
            state: Mutex::new(FakeState::default()),
        }
    }

    pub fn with_item(self, item: WorkItem) -> Self {
        self.state.lock().items.insert(item.id.clone(), item);
        self
    }

    pub fn with_comments(self, id: impl Into<String>, comments: Vec<Comment>) -> Self {
        self.state.lock().comments.insert(id.into(), comments);
        self
    }

    pub fn set_comments(&self, id: impl Into<String>, comments: Vec<Comment>) {
        self.state.lock().comments.insert(id.into(), comments);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn item(&self, id: &str) -> Option<WorkItem> {
        self.state.lock().items.get(id).cloned()
    }

    fn record(&self, call: impl Into<String>) {
        self.state.lock().calls.push(call.into());
    }
}

#[async_trait]
impl AdapterPort for FakeAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn whoami(&self) -> Result<Actor, AdapterError> {
        self.record("whoami");
        Ok(self.me.clone())
    }

    async fn fetch_snapshot(&self) -> Result<Snapshot, AdapterError> {
        self.record("fetch_snapshot");
        Ok(self.state.lock().items.clone())
    }

    async fn list_ids_by_stage(&self, stage: Stage) -> Result<Vec<String>, AdapterError> {
        self.record(format!("list_ids_by_stage:{stage}"));
        let state = self.state.lock();
        let mut ids: Vec<String> = state
            .items
            .values()
            .filter(|item| item.stage == stage)
            .map(|item| item.id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn list_backlog_ids_in_order(&self) -> Result<Vec<String>, AdapterError> {
        self.record("list_backlog_ids_in_order");
        let state = self.state.lock();
        let mut ids: Vec<String> = state
            .items
            .values()
            .filter(|item| item.stage == Stage::Todo)
            .map(|item| item.id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn get_work_item(&self, id: &str) -> Result<WorkItemDetails, AdapterError> {
        self.record(format!("get_work_item:{id}"));
        let state = self.state.lock();
        let item = state.items.get(id).cloned().ok_or_else(|| {
            AdapterError::protocol(self.name.clone(), "get_work_item", format!("no such item {id}"))
        })?;
        Ok(WorkItemDetails {
            item,
            comments: state.comments.get(id).cloned().unwrap_or_default(),
            attachments: state.attachments.get(id).cloned().unwrap_or_default(),
            links: state.links.get(id).cloned().unwrap_or_default(),
        })
    }

    async fn list_comments(&self, id: &str, options: ListCommentsOptions) -> Result<Vec<Comment>, AdapterError> {
        self.record(format!("list_comments:{id}"));
        let state = self.state.lock();
        let mut comments = state.comments.get(id).cloned().unwrap_or_default();
        if options.newest_first {
            comments.reverse();
        }
        comments.truncate(options.limit.max(1));
        Ok(comments)
    }

    async fn list_attachments(&self, id: &str) -> Result<Vec<Attachment>, AdapterError> {
        self.record(format!("list_attachments:{id}"));
        Ok(self.state.lock().attachments.get(id).cloned().unwrap_or_default())
    }

    async fn list_linked_work_items(&self, id: &str) -> Result<Vec<LinkedWorkItem>, AdapterError> {
        self.record(format!("list_linked_work_items:{id}"));
        Ok(self.state.lock().links.get(id).cloned().unwrap_or_default())
    }

    async fn set_stage(&self, id: &str, stage: Stage) -> Result<(), AdapterError> {
        self.record(format!("set_stage:{id}:{stage}"));
        let mut state = self.state.lock();
        let item = state
            .items
            .get_mut(id)
            .ok_or_else(|| AdapterError::protocol(self.name.clone(), "set_stage", format!("no such item {id}")))?;
        item.stage = stage;
        Ok(())
    }

    async fn add_comment(&self, id: &str, body: &str) -> Result<(), AdapterError> {
        if body.trim().is_empty() {
            return Ok(());
        }
        self.record(format!("add_comment:{id}"));
        let mut state = self.state.lock();
        let next_comment_id = format!("c{}", state.comments.values().map(|v| v.len()).sum::<usize>() + 1);
        state.comments.entry(id.to_string()).or_default().push(Comment {
            id: next_comment_id,
            author: self.me.clone(),
            body: body.to_string(),
            created_at: None,
        });
        Ok(())
    }

    async fn create_in_backlog_and_assign_to_self(
        &self,
        request: CreateTicketRequest,
    ) -> Result<CreatedWorkItem, AdapterError> {
        self.record("create_in_backlog_and_assign_to_self");
        let mut state = self.state.lock();
        state.next_created_id += 1;
        let id = format!("created-{}", state.next_created_id);
        let item = kwf_core::WorkItemBuilder::new(&id)
            .title(request.title)
            .stage(Stage::Todo)
            .body(request.body)
            .assignee(self.me.clone())
            .build()
            .map_err(|e| AdapterError::protocol(self.name.clone(), "create", e.to_string()))?;
        state.items.insert(id.clone(), item);
        Ok(CreatedWorkItem { id, url: None })
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
