// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plane backend: REST over `reqwest`. `listBacklogIdsInOrder` filters to
//! "mine" at this layer rather than the core engine (documented deviation,
//! see the Open Questions in the design notes).

use async_trait::async_trait;
use kwf_core::{Actor, Comment, Snapshot, Stage, WorkItem, WorkItemBuilder};
use serde::{Deserialize, Serialize};

use crate::error::AdapterError;
use crate::html::html_to_text;
use crate::port::{
    AdapterPort, Attachment, CreateTicketRequest, CreatedWorkItem, LinkedWorkItem, ListCommentsOptions,
    WorkItemDetails,
};
use crate::priority::priority_rank;
use crate::stage_map::StageMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaneConfig {
    pub workspace_slug: String,
    pub project_ids: Vec<String>,
    pub base_url: Option<String>,
    pub stage_map: StageMap,
}

pub struct PlaneAdapter {
    config: PlaneConfig,
    client: reqwest::Client,
    api_key: String,
}

impl PlaneAdapter {
    pub fn new(config: PlaneConfig) -> Result<Self, AdapterError> {
        config.stage_map.validate("plane")?;
        let api_key = std::env::var("PLANE_API_KEY").map_err(|_| AdapterError::Config {
            adapter: "plane".to_string(),
            detail: "PLANE_API_KEY is not set".to_string(),
        })?;
        Ok(Self {
            config,
            client: reqwest::Client::new(),
            api_key,
        })
    }

    fn base_url(&self) -> String {
        self.config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://api.plane.so".to_string())
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value, AdapterError> {
        let url = format!("{}{}", self.base_url(), path);
        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|source| AdapterError::Http { url: url.clone(), source })?;
        response.json().await.map_err(|source| AdapterError::Http { url, source })
    }

    fn issue_to_work_item(&self, project_id: &str, issue: &PlaneIssue) -> WorkItem {
        let stage = self
            .config
            .stage_map
            .canonical_for(issue.state_name())
            .unwrap_or(Stage::Todo);
        let mut builder = WorkItemBuilder::new(format!("{project_id}:{}", issue.id))
            .title(issue.name.clone())
            .stage(stage);
        for assignee in &issue.assignees {
            builder = builder.assignee(Actor::new().with_id(assignee.clone()));
        }
        if let Some(description_html) = &issue.description_html {
            builder = builder.body(html_to_text(description_html));
        }
        if let Some(updated_at) = issue.updated_at {
            builder = builder.updated_at(updated_at);
        }
        builder
            .raw(serde_json::json!({ "priority": issue.priority }))
            .build_or_fallback(format!("issue {}", issue.id))
    }
}

#[derive(Debug, Deserialize)]
struct PlaneIssue {
    id: String,
    name: String,
    description_html: Option<String>,
    priority: Option<String>,
    assignees: Vec<String>,
    state_detail: PlaneStateDetail,
    updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize)]
struct PlaneStateDetail {
    name: String,
}

impl PlaneIssue {
    fn state_name(&self) -> &str {
        &self.state_detail.name
    }
}

#[async_trait]
impl AdapterPort for PlaneAdapter {
    fn name(&self) -> &str {
        "plane"
    }

    async fn whoami(&self) -> Result<Actor, AdapterError> {
        let data = self.get_json("/api/v1/users/me/").await?;
        Ok(Actor::new()
            .with_id(data["id"].as_str().unwrap_or_default())
            .with_username(data["email"].as_str().unwrap_or_default())
            .with_name(data["display_name"].as_str().unwrap_or_default()))
    }

    async fn fetch_snapshot(&self) -> Result<Snapshot, AdapterError> {
        let mut snapshot = Snapshot::new();
        for project_id in &self.config.project_ids {
            let data = self
                .get_json(&format!(
                    "/api/v1/workspaces/{}/projects/{project_id}/issues/",
                    self.config.workspace_slug
                ))
                .await?;
            let results: Vec<PlaneIssue> = serde_json::from_value(data["results"].clone())
                .map_err(|e| AdapterError::protocol("plane", "fetch_snapshot", e.to_string()))?;
            for issue in &results {
                let item = self.issue_to_work_item(project_id, issue);
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
        let me = self.whoami().await?;
        let mut per_project_ids: Vec<String> = Vec::new();
        for project_id in &self.config.project_ids {
            let data = self
                .get_json(&format!(
                    "/api/v1/workspaces/{}/projects/{project_id}/issues/",
                    self.config.workspace_slug
                ))
                .await?;
            let mut results: Vec<PlaneIssue> = serde_json::from_value(data["results"].clone())
                .map_err(|e| AdapterError::protocol("plane", "list_backlog_ids_in_order", e.to_string()))?;
            results.retain(|issue| {
                self.config.stage_map.canonical_for(issue.state_name()) == Some(Stage::Todo)
                    && issue.assignees.iter().any(|a| me.identity_keys().contains(&a.to_lowercase()))
            });
            results.sort_by(|a, b| {
                priority_rank(a.priority.as_deref().unwrap_or("none"))
                    .cmp(&priority_rank(b.priority.as_deref().unwrap_or("none")))
                    .reverse()
                    .then_with(|| a.id.cmp(&b.id))
            });
            per_project_ids.extend(results.into_iter().map(|issue| format!("{project_id}:{}", issue.id)));
        }
        Ok(per_project_ids)
    }

    async fn get_work_item(&self, id: &str) -> Result<WorkItemDetails, AdapterError> {
        let (project_id, issue_id) = id.split_once(':').ok_or_else(|| {
            AdapterError::protocol("plane", "get_work_item", format!("malformed id {id}"))
        })?;
        let data = self
            .get_json(&format!(
                "/api/v1/workspaces/{}/projects/{project_id}/issues/{issue_id}/",
                self.config.workspace_slug
            ))
            .await?;
        let issue: PlaneIssue = serde_json::from_value(data)
            .map_err(|e| AdapterError::protocol("plane", "get_work_item", e.to_string()))?;
        let item = self.issue_to_work_item(project_id, &issue);
        let comments = self.list_comments(id, ListCommentsOptions::default()).await?;
        Ok(WorkItemDetails {
            item,
            comments,
            attachments: Vec::new(),
            links: Vec::new(),
        })
    }

    async fn list_comments(&self, id: &str, options: ListCommentsOptions) -> Result<Vec<Comment>, AdapterError> {
        let (project_id, issue_id) = id.split_once(':').ok_or_else(|| {
            AdapterError::protocol("plane", "list_comments", format!("malformed id {id}"))
        })?;
        let data = self
            .get_json(&format!(
                "/api/v1/workspaces/{}/projects/{project_id}/issues/{issue_id}/comments/",
                self.config.workspace_slug
            ))
            .await?;
        #[derive(Deserialize)]
        struct RawComment {
            id: String,
            comment_html: String,
            actor_detail: Option<RawActor>,
            created_at: Option<chrono::DateTime<chrono::Utc>>,
        }
        #[derive(Deserialize)]
        struct RawActor {
            id: String,
            display_name: String,
        }
        let results: Vec<RawComment> = serde_json::from_value(data["results"].clone())
            .map_err(|e| AdapterError::protocol("plane", "list_comments", e.to_string()))?;
        let mut comments: Vec<Comment> = results
            .into_iter()
            .map(|c| Comment {
                id: c.id,
                author: c
                    .actor_detail
                    .map(|a| Actor::new().with_id(a.id).with_name(a.display_name))
                    .unwrap_or_default(),
                body: html_to_text(&c.comment_html),
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
        let (project_id, issue_id) = id.split_once(':').ok_or_else(|| {
            AdapterError::protocol("plane", "set_stage", format!("malformed id {id}"))
        })?;
        let Some(state_name) = self.config.stage_map.native_names_for(stage).first().map(|s| s.to_string()) else {
            return Err(AdapterError::Config {
                adapter: "plane".to_string(),
                detail: format!("no stageMap state for {stage}"),
            });
        };
        let url = format!(
            "{}/api/v1/workspaces/{}/projects/{project_id}/issues/{issue_id}/",
            self.base_url(),
            self.config.workspace_slug
        );
        self.client
            .patch(&url)
            .header("x-api-key", &self.api_key)
            .json(&serde_json::json!({ "state": state_name }))
            .send()
            .await
            .map_err(|source| AdapterError::Http { url, source })?;
        Ok(())
    }

    async fn add_comment(&self, id: &str, body: &str) -> Result<(), AdapterError> {
        if body.trim().is_empty() {
            return Ok(());
        }
        let (project_id, issue_id) = id.split_once(':').ok_or_else(|| {
            AdapterError::protocol("plane", "add_comment", format!("malformed id {id}"))
        })?;
        let url = format!(
            "{}/api/v1/workspaces/{}/projects/{project_id}/issues/{issue_id}/comments/",
            self.base_url(),
            self.config.workspace_slug
        );
        self.client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&serde_json::json!({ "comment_html": format!("<p>{body}</p>") }))
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
            adapter: "plane".to_string(),
            detail: "no projectIds configured".to_string(),
        })?;
        let me = self.whoami().await?;
        let url = format!(
            "{}/api/v1/workspaces/{}/projects/{project_id}/issues/",
            self.base_url(),
            self.config.workspace_slug
        );
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&serde_json::json!({
                "name": request.title,
                "description_html": format!("<p>{}</p>", request.body),
                "assignees": me.id.iter().collect::<Vec<_>>(),
            }))
            .send()
            .await
            .map_err(|source| AdapterError::Http { url: url.clone(), source })?;
        let created: serde_json::Value = response.json().await.map_err(|source| AdapterError::Http { url, source })?;
        let issue_id = created["id"].as_str().unwrap_or_default().to_string();
        Ok(CreatedWorkItem {
            id: format!("{project_id}:{issue_id}"),
            url: None,
        })
    }
}

#[cfg(test)]
#[path = "plane_tests.rs"]
mod tests;
