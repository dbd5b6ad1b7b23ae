// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The required `stageMap` every adapter configuration carries: a mapping
//! from a platform-native state/list/label name to one of the four
//! canonical stages.

use std::collections::HashMap;

use kwf_core::Stage;
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageMap(HashMap<String, Stage>);

impl StageMap {
    pub fn new(map: HashMap<String, Stage>) -> Self {
        Self(map)
    }

    /// Look up the canonical stage for a platform-native name. Names are
    /// matched case-insensitively on the caller's side; this type stores
    /// exactly what was configured.
    pub fn canonical_for(&self, native_name: &str) -> Option<Stage> {
        self.0.get(native_name).copied()
    }

    pub fn native_names_for(&self, stage: Stage) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(_, s)| **s == stage)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// All four canonical stages must be reachable; `setup` must reject a
    /// map that fails this.
    pub fn validate(&self, adapter: &str) -> Result<(), AdapterError> {
        for stage in Stage::ALL {
            if self.native_names_for(stage).is_empty() {
                return Err(AdapterError::Config {
                    adapter: adapter.to_string(),
                    detail: format!("stageMap has no entry mapping to {stage}"),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "stage_map_tests.rs"]
mod tests;
