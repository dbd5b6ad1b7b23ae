// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An identity on a ticket platform: a bag of optional, partially-populated
//! identifying fields. Adapters rarely agree on which of these are present.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Option<String>,
    pub username: Option<String>,
    pub name: Option<String>,
}

impl Actor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Case-folded, trimmed, non-empty identity keys for this actor.
    pub fn identity_keys(&self) -> Vec<String> {
        [&self.id, &self.username, &self.name]
            .into_iter()
            .filter_map(|field| field.as_ref())
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// True if `self` and `other` share at least one identity key.
    pub fn matches(&self, other: &Actor) -> bool {
        let mine = self.identity_keys();
        let theirs = other.identity_keys();
        mine.iter().any(|k| theirs.contains(k))
    }

    /// True if any of this actor's identity keys appears in `keys`.
    pub fn matches_any(&self, keys: &[String]) -> bool {
        self.identity_keys().iter().any(|k| keys.contains(k))
    }
}
