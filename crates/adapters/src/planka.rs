// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Planka backend: REST against a self-hosted board. Comments here are the
//! canonical source of the "relayed author" convention the auto-reopen
//! watcher looks for (a bridge service posting third-party replies under
//! the worker's own account, with an `Author: <name>` header line).

use async_trait::async_trait;
use kwf_core::{Actor, Comment, Snapshot, Stage, WorkItem, WorkItemBuilder};
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;
use crate::port::{
    AdapterPort, Attachment, CreateTicketRequest, CreatedWorkItem, LinkedWorkItem, ListCommentsOptions,
    WorkItemDetails,
};
use crate::stage_map::StageMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlankaConfig {
    pub base_url: String,
    pub project_ids: Vec<String>,
    pub stage_map: StageMap,
}

pub struct PlankaAdapter {
    config: PlankaConfig,
    client: reqwest::Client,
    token: String,
}

impl PlankaAdapter {
    pub fn new(config: PlankaConfig) -> Result<Self, AdapterError> {
        config.stage_map.validate("planka")?;
        let token = std::env::var("PLANKA_TOKEN").map_err(|_| AdapterError::Config {
            adapter: "planka".to_string(),
            detail: "PLANKA_TOKEN is not set".to_string(),
        })?;
        Ok(Self {
            config,
            client: reqwest::Client::new(),
            token,
        })
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value, AdapterError> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|source| AdapterError::Http { url: url.clone(), source })?;
        response.json().await.map_err(|source| AdapterError::Http { url, source })
    }

    fn card_to_work_item(&self, card: &PlankaCard) -> WorkItem {
        let stage = card
            .list_name
            .as_deref()
            .and_then(|name| self.config.stage_map.canonical_for(name))
            .unwrap_or(Stage::Todo);
        let mut builder = WorkItemBuilder::new(card.id.clone()).title(card.name.clone()).stage(stage);
        for label in &card.labels {
            builder = builder.label(label.clone());
        }
        for member_id in &card.member_ids {
            builder = builder.assignee(Actor::new().with_id(member_id.clone()));
        }
        if let Some(description) = &card.description {
            builder = builder.body(description.clone());
        }
        builder.build_or_fallback(format!("card {}", card.id))
    }
}

#[derive(Debug, Deserialize)]
struct PlankaCard {
    id: String,
    name: String,
    description: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    member_ids: Vec<String>,
    list_name: Option<String>,
}

#[async_trait]
impl AdapterPort for PlankaAdapter {
    fn name(&self) -> &str {
        "planka"
    }

    async fn whoami(&self) -> Result<Actor, AdapterError> {
        let data = self.get_json("/api/users/me").await?;
        let item = &data["item"];
        Ok(Actor::new()
            .with_id(item["id"].as_str().unwrap_or_default())
            .with_username(item["username"].as_str().unwrap_or_default())
            .with_name(item["name"].as_str().unwrap_or_default()))
    }

    async fn fetch_snapshot(&self) -> Result<Snapshot, AdapterError> {
        let mut snapshot = Snapshot::new();
        for project_id in &self.config.project_ids {
            let data = self.get_json(&format!("/api/projects/{project_id}")).await?;
            let cards: Vec<PlankaCard> = serde_json::from_value(data["included"]["cards"].clone())
                .map_err(|e| AdapterError::protocol("planka", "fetch_snapshot", e.to_string()))?;
            for card in &cards {
                let item = self.card_to_work_item(card);
                snapshot.insert(item.id.clone(), item);
            }
        }
        Ok(snapshot)
    }

    async fn list_ids_by_stage(&self, stage: Stage) -> Result<Vec<String>, AdapterError> {
        let snapshot = self.fetch_snapshot().await?;
        let mut ids: Vec<String> = snapshot.values().filter(|i| i.stage == stage).map(|i| i.id.clone()).collect();
        ids.sort();
        Ok(ids)
    }

    async fn list_backlog_ids_in_order(&self) -> Result<Vec<String>, AdapterError> {
        let snapshot = self.fetch_snapshot().await?;
        let mut ids: Vec<String> = snapshot.values().filter(|i| i.stage == Stage::Todo).map(|i| i.id.clone()).collect();
        ids.sort();
        Ok(ids)
    }

    async fn get_work_item(&self, id: &str) -> Result<WorkItemDetails, AdapterError> {
        let data = self.get_json(&format!("/api/cards/{id}")).await?;
        let card: PlankaCard = serde_json::from_value(data["item"].clone())
            .map_err(|e| AdapterError::protocol("planka", "get_work_item", e.to_string()))?;
        let item = self.card_to_work_item(&card);
        let comments = self.list_comments(id, ListCommentsOptions::default()).await?;
        Ok(WorkItemDetails {
            item,
            comments,
            attachments: Vec::new(),
            links: Vec::new(),
        })
    }

    async fn list_comments(&self, id: &str, options: ListCommentsOptions) -> Result<Vec<Comment>, AdapterError> {
        let data = self.get_json(&format!("/api/cards/{id}/comment-actions")).await?;
        #[derive(Deserialize)]
        struct RawComment {
            id: String,
            text: String,
            #[serde(rename = "createdAt")]
            created_at: Option<chrono::DateTime<chrono::Utc>>,
            #[serde(rename = "userId")]
            user_id: Option<String>,
        }
        let items: Vec<RawComment> = serde_json::from_value(data["items"].clone())
            .map_err(|e| AdapterError::protocol("planka", "list_comments", e.to_string()))?;
        let mut comments: Vec<Comment> = items
            .into_iter()
            .map(|c| Comment {
                id: c.id,
                author: c.user_id.map(|id| Actor::new().with_id(id)).unwrap_or_default(),
                body: c.text,
                created_at: c.created_at,
            })
            .collect();
        if options.newest_first {
            comments.reverse();
        }
        comments.truncate(options.limit.max(1));
        Ok(comments)
    }

    async fn list_attachments(&self, _id: &str) -> Result<Vec<Attachment>, AdapterError> {
        Ok(Vec::new())
    }

    async fn list_linked_work_items(&self, _id: &str) -> Result<Vec<LinkedWorkItem>, AdapterError> {
        Ok(Vec::new())
    }

    async fn set_stage(&self, id: &str, stage: Stage) -> Result<(), AdapterError> {
        let Some(list_name) = self.config.stage_map.native_names_for(stage).first().map(|s| s.to_string()) else {
            return Err(AdapterError::Config {
                adapter: "planka".to_string(),
                detail: format!("no stageMap list for {stage}"),
            });
        };
        let url = format!("{}/api/cards/{id}", self.config.base_url);
        self.client
            .patch(&url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "listName": list_name }))
            .send()
            .await
            .map_err(|source| AdapterError::Http { url, source })?;
        Ok(())
    }

    async fn add_comment(&self, id: &str, body: &str) -> Result<(), AdapterError> {
        if body.trim().is_empty() {
            return Ok(());
        }
        let url = format!("{}/api/cards/{id}/comment-actions", self.config.base_url);
        self.client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "text": body }))
            .send()
            .await
            .map_err(|source| AdapterError::Http { url, source })?;
        Ok(())
    }

    async fn create_in_backlog_and_assign_to_self(
        &self,
        request: CreateTicketRequest,
    ) -> Result<CreatedWorkItem, AdapterError> {
        let project_id = self.config.project_ids.first().ok_or_else(|| AdapterError::Config {
            adapter: "planka".to_string(),
            detail: "no projectIds configured".to_string(),
        })?;
        let me = self.whoami().await?;
        let url = format!("{}/api/projects/{project_id}/cards", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({
                "name": request.title,
                "description": request.body,
                "memberIds": me.id.iter().collect::<Vec<_>>(),
            }))
            .send()
            .await
            .map_err(|source| AdapterError::Http { url: url.clone(), source })?;
        let created: serde_json::Value = response.json().await.map_err(|source| AdapterError::Http { url, source })?;
        Ok(CreatedWorkItem {
            id: created["item"]["id"].as_str().unwrap_or_default().to_string(),
            url: None,
        })
    }
}

/// Parses the relayed-author metadata block a comment-bridging service
/// prefixes onto a comment body: a line of the form `Author: <name>`
/// somewhere in the leading metadata lines (e.g. preceded by a
/// `[planka-comment:...]` marker line). Returns the parsed name, case-folded,
/// if present. Only the first few lines are considered so an `Author:`
/// mentioned in the body proper is never mistaken for the header.
const RELAYED_AUTHOR_SCAN_LINES: usize = 4;

pub fn relayed_author(body: &str) -> Option<String> {
    body.lines()
        .take(RELAYED_AUTHOR_SCAN_LINES)
        .find_map(|line| line.trim().strip_prefix("Author:"))
        .map(|rest| rest.trim().to_lowercase())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
#[path = "planka_tests.rs"]
mod tests;
