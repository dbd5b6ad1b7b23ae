// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Diffing two [`Snapshot`]s into a deterministic sequence of [`Event`]s.

use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;
use crate::stage::Stage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Created { id: String },
    Deleted { id: String },
    StageChanged { id: String, from: Stage, to: Stage },
    Updated { id: String },
}

/// Compare two snapshots and emit events in a fixed order: all deletions
/// (id-sorted), then all creations (id-sorted), then all changes over the
/// common-id intersection (id-sorted). An id with both a stage change and a
/// content change yields only the stage change.
pub fn diff(previous: &Snapshot, current: &Snapshot) -> Vec<Event> {
    let mut events = Vec::new();

    let mut deleted: Vec<&String> = previous
        .keys()
        .filter(|id| !current.contains_key(*id))
        .collect();
    deleted.sort();
    events.extend(deleted.into_iter().map(|id| Event::Deleted { id: id.clone() }));

    let mut created: Vec<&String> = current
        .keys()
        .filter(|id| !previous.contains_key(*id))
        .collect();
    created.sort();
    events.extend(created.into_iter().map(|id| Event::Created { id: id.clone() }));

    let mut common: Vec<&String> = current.keys().filter(|id| previous.contains_key(*id)).collect();
    common.sort();
    for id in common {
        let before = &previous[id];
        let after = &current[id];
        if before.stage != after.stage {
            events.push(Event::StageChanged {
                id: id.clone(),
                from: before.stage,
                to: after.stage,
            });
        } else if before.title != after.title || before.label_set() != after.label_set() {
            events.push(Event::Updated { id: id.clone() });
        }
    }

    events
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
