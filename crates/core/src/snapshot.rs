// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single point-in-time view of a platform's tickets.

use std::collections::HashMap;

use crate::work_item::WorkItem;

/// `id -> WorkItem` for a single adapter query. Iteration order carries no
/// meaning; the diff engine sorts by id before comparing.
pub type Snapshot = HashMap<String, WorkItem>;
