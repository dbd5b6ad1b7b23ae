// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use chrono::{DateTime, Utc};

use crate::actor::Actor;
use crate::stage::Stage;
use crate::work_item::{WorkItem, WorkItemBuilder};

pub fn actor(username: &str) -> Actor {
    Actor::new().with_username(username)
}

pub fn work_item(id: &str, title: &str, stage: Stage) -> WorkItem {
    WorkItemBuilder::new(id)
        .title(title)
        .stage(stage)
        .build()
        .expect("test work item should be valid")
}

pub fn work_item_assigned_to(id: &str, title: &str, stage: Stage, assignee: &str) -> WorkItem {
    WorkItemBuilder::new(id)
        .title(title)
        .stage(stage)
        .assignee(actor(assignee))
        .build()
        .expect("test work item should be valid")
}

pub fn fixed_instant() -> DateTime<Utc> {
    "2026-07-27T12:00:00Z".parse().expect("valid test timestamp")
}
