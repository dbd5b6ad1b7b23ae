// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `config/clawban.json`: a versioned, tagged-union adapter configuration.

use std::path::Path;

use kwf_adapters::{AdapterError, GithubConfig, LinearConfig, PlaneConfig, PlankaConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::atomic::{read_atomic, write_atomic};
use crate::error::StorageError;

const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("no configuration found at {path}; run `setup` first")]
    Missing { path: String },

    #[error("config at {path} has version {found}, expected {expected}")]
    UnsupportedVersion { path: String, found: u32, expected: u32 },

    #[error("config already exists at {path}; pass --force to overwrite")]
    AlreadyExists { path: String },

    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AdapterConfig {
    Github(GithubConfig),
    Linear(LinearConfig),
    Plane(PlaneConfig),
    Planka(PlankaConfig),
}

impl AdapterConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterConfig::Github(_) => "github",
            AdapterConfig::Linear(_) => "linear",
            AdapterConfig::Plane(_) => "plane",
            AdapterConfig::Planka(_) => "planka",
        }
    }

    fn validate(&self) -> Result<(), AdapterError> {
        match self {
            AdapterConfig::Github(c) => c.stage_map.validate("github"),
            AdapterConfig::Linear(c) => c.stage_map.validate("linear"),
            AdapterConfig::Plane(c) => c.stage_map.validate("plane"),
            AdapterConfig::Planka(c) => c.stage_map.validate("planka"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDocument {
    pub version: u32,
    #[serde(flatten)]
    pub adapter: AdapterConfig,
}

/// Load the config at `path`. Fails with [`ConfigError::Missing`] rather
/// than treating an absent/corrupt file as empty, unlike the smaller
/// autopilot state files — configuration is user-authored and silently
/// discarding it would be surprising.
pub fn load_config(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let doc: Option<ConfigDocument> = read_atomic(path)?;
    let doc = doc.ok_or_else(|| ConfigError::Missing {
        path: path.display().to_string(),
    })?;
    if doc.version != CURRENT_VERSION {
        return Err(ConfigError::UnsupportedVersion {
            path: path.display().to_string(),
            found: doc.version,
            expected: CURRENT_VERSION,
        });
    }
    doc.adapter.validate()?;
    Ok(doc)
}

/// Write `adapter` to `path` atomically. Refuses to overwrite an existing
/// file unless `force` is set.
pub fn save_config(path: &Path, adapter: AdapterConfig, force: bool) -> Result<(), ConfigError> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists {
            path: path.display().to_string(),
        });
    }
    adapter.validate()?;
    let doc = ConfigDocument {
        version: CURRENT_VERSION,
        adapter,
    };
    write_atomic(path, &doc)?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
