// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `setup`: validates connectivity against the selected platform (whoami +
//! every list operation + a sampled get/comments/attachments/links) before
//! writing `config/clawban.json` atomically.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use kwf_adapters::{AdapterPort, GithubConfig, LinearConfig, ListCommentsOptions, PlaneConfig, PlankaConfig, StageMap};
use kwf_core::Stage;
use kwf_storage::AdapterConfig;

use crate::adapter_factory;
use crate::output::{render, OutputFormat};
use crate::paths::Paths;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum AdapterKind {
    Github,
    Linear,
    Plane,
    Planka,
}

#[derive(Args)]
pub struct SetupArgs {
    /// Which platform backend to configure
    #[arg(long, value_enum)]
    pub kind: AdapterKind,

    /// JSON object mapping platform-native state names to one of the four
    /// canonical stages (`todo`, `blocked`, `in-progress`, `in-review`)
    #[arg(long = "stage-map-json")]
    pub stage_map_json: String,

    /// GitHub `owner/repo` (required for `--kind github`)
    #[arg(long)]
    pub repo: Option<String>,

    /// Linear team id (required for `--kind linear`)
    #[arg(long = "team-id")]
    pub team_id: Option<String>,

    /// Plane workspace slug (required for `--kind plane`)
    #[arg(long = "workspace-slug")]
    pub workspace_slug: Option<String>,

    /// Comma-separated project ids (required for `--kind plane`/`--kind planka`)
    #[arg(long = "project-ids", value_delimiter = ',')]
    pub project_ids: Vec<String>,

    /// Base URL override (required for `--kind planka`, optional for `--kind plane`)
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

pub async fn handle(args: SetupArgs, paths: &Paths, format: OutputFormat) -> Result<()> {
    let stage_map = parse_stage_map(&args.stage_map_json)?;
    let config = build_config(&args, stage_map)?;

    let adapter = adapter_factory::build(config.clone())?;
    let mut probe = run_connectivity_probe(adapter.as_ref()).await?;

    kwf_storage::save_config(&paths.config, config, args.force).context("writing config/clawban.json")?;
    probe.config_path = paths.config.display().to_string();

    render(format, &probe, |p| {
        format!(
            "setup ok: adapter={} identity={} stages_probed={} config={}",
            p.adapter, p.identity, p.stages_probed, p.config_path
        )
    })
}

fn parse_stage_map(raw: &str) -> Result<StageMap> {
    let entries: HashMap<String, String> = serde_json::from_str(raw).context("parsing --stage-map-json")?;
    let mut map = HashMap::with_capacity(entries.len());
    for (native_name, stage_str) in entries {
        let stage = Stage::from_any(&stage_str).with_context(|| format!("stageMap entry {native_name:?} -> {stage_str:?}"))?;
        map.insert(native_name, stage);
    }
    Ok(StageMap::new(map))
}

fn build_config(args: &SetupArgs, stage_map: StageMap) -> Result<AdapterConfig> {
    Ok(match args.kind {
        AdapterKind::Github => AdapterConfig::Github(GithubConfig {
            repo: required(&args.repo, "--repo")?,
            stage_map,
        }),
        AdapterKind::Linear => AdapterConfig::Linear(LinearConfig {
            team_id: required(&args.team_id, "--team-id")?,
            stage_map,
        }),
        AdapterKind::Plane => AdapterConfig::Plane(PlaneConfig {
            workspace_slug: required(&args.workspace_slug, "--workspace-slug")?,
            project_ids: non_empty(&args.project_ids, "--project-ids")?,
            base_url: args.base_url.clone(),
            stage_map,
        }),
        AdapterKind::Planka => AdapterConfig::Planka(PlankaConfig {
            base_url: required(&args.base_url, "--base-url")?,
            project_ids: non_empty(&args.project_ids, "--project-ids")?,
            stage_map,
        }),
    })
}

fn required(field: &Option<String>, flag: &str) -> Result<String> {
    match field {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => bail!("{flag} is required for this adapter kind"),
    }
}

fn non_empty(field: &[String], flag: &str) -> Result<Vec<String>> {
    if field.is_empty() {
        bail!("{flag} is required for this adapter kind");
    }
    Ok(field.to_vec())
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ConnectivityProbe {
    pub adapter: String,
    pub identity: String,
    pub stages_probed: usize,
    pub sampled_ticket_id: Option<String>,
    pub config_path: String,
}

/// Exercises whoami, every list operation, and (when the backlog isn't
/// empty) a sampled detail/comments/attachments/links fetch, so a broken
/// credential or endpoint is caught at `setup` time rather than on the
/// first scheduled tick.
async fn run_connectivity_probe(adapter: &dyn AdapterPort) -> Result<ConnectivityProbe> {
    let me = adapter.whoami().await.context("whoami probe")?;
    let mut stages_probed = 0;
    for stage in Stage::ALL {
        adapter.list_ids_by_stage(stage).await.with_context(|| format!("list_ids_by_stage({stage}) probe"))?;
        stages_probed += 1;
    }
    let backlog = adapter.list_backlog_ids_in_order().await.context("list_backlog_ids_in_order probe")?;

    let sampled_ticket_id = if let Some(id) = backlog.first() {
        adapter.get_work_item(id).await.context("get_work_item probe")?;
        adapter
            .list_comments(id, ListCommentsOptions::default())
            .await
            .context("list_comments probe")?;
        adapter.list_attachments(id).await.context("list_attachments probe")?;
        adapter.list_linked_work_items(id).await.context("list_linked_work_items probe")?;
        Some(id.clone())
    } else {
        None
    };

    Ok(ConnectivityProbe {
        adapter: adapter.name().to_string(),
        identity: me.username.or(me.name).or(me.id).unwrap_or_else(|| "<unknown>".to_string()),
        stages_probed,
        sampled_ticket_id,
        config_path: String::new(),
    })
}
