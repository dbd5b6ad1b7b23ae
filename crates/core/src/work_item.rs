// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The platform-agnostic ticket representation every adapter produces.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::error::CoreError;
use crate::stage::Stage;

/// A single comment on a work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: Actor,
    pub body: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// A ticket as seen from the autopilot's point of view. Platform-specific
/// detail is preserved opaquely in `raw` for round-tripping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    pub title: String,
    pub stage: Stage,
    pub url: Option<String>,
    pub labels: Vec<String>,
    pub assignees: Vec<Actor>,
    pub updated_at: Option<DateTime<Utc>>,
    pub body: Option<String>,
    pub raw: Option<serde_json::Value>,
}

impl WorkItem {
    /// Labels as a sorted set, for order-insensitive diffing.
    pub fn label_set(&self) -> BTreeSet<String> {
        self.labels.iter().cloned().collect()
    }

    /// True if any assignee's identity keys intersect `me`'s.
    pub fn is_assigned_to(&self, me: &Actor) -> bool {
        self.assignees.iter().any(|a| a.matches(me))
    }
}

/// Builder for [`WorkItem`], used by adapters and tests alike.
#[derive(Debug, Clone, Default)]
pub struct WorkItemBuilder {
    id: Option<String>,
    title: Option<String>,
    stage: Option<Stage>,
    url: Option<String>,
    labels: Vec<String>,
    assignees: Vec<Actor>,
    updated_at: Option<DateTime<Utc>>,
    body: Option<String>,
    raw: Option<serde_json::Value>,
}

impl WorkItemBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn assignee(mut self, actor: Actor) -> Self {
        self.assignees.push(actor);
        self
    }

    pub fn updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn build(self) -> Result<WorkItem, CoreError> {
        let title = self.title.unwrap_or_default();
        if title.trim().is_empty() {
            return Err(CoreError::EmptyTitle);
        }
        Ok(WorkItem {
            id: self.id.unwrap_or_default(),
            title,
            stage: self.stage.unwrap_or(Stage::Todo),
            url: self.url,
            labels: self.labels,
            assignees: self.assignees,
            updated_at: self.updated_at,
            body: self.body,
            raw: self.raw,
        })
    }

    /// Like [`Self::build`], but infallible: falls back to `fallback_title`
    /// when no title was set or it was blank, instead of rejecting the
    /// build. For adapters whose native title field is occasionally empty
    /// but that always have a non-empty synthetic fallback (e.g. `issue
    /// #123`) on hand.
    pub fn build_or_fallback(self, fallback_title: impl Into<String>) -> WorkItem {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| fallback_title.into());
        WorkItem {
            id: self.id.unwrap_or_default(),
            title,
            stage: self.stage.unwrap_or(Stage::Todo),
            url: self.url,
            labels: self.labels,
            assignees: self.assignees,
            updated_at: self.updated_at,
            body: self.body,
            raw: self.raw,
        }
    }
}

#[cfg(test)]
#[path = "work_item_tests.rs"]
mod tests;
