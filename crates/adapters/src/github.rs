// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GitHub backend: shells out to the `gh` CLI for issue/label/comment
//! operations, the way the rest of this codebase's local-tool adapters do.

use async_trait::async_trait;
use kwf_core::{Actor, Comment, Snapshot, Stage, WorkItem, WorkItemBuilder};
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::error::{AdapterError, AdapterProtocolError};
use crate::html::html_to_text;
use crate::port::{
    AdapterPort, Attachment, CreateTicketRequest, CreatedWorkItem, LinkedWorkItem, ListCommentsOptions,
    WorkItemDetails,
};
use crate::stage_map::StageMap;
use crate::subprocess::{require_success, run_with_timeout, CLI_TIMEOUT};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    pub repo: String,
    pub stage_map: StageMap,
}

pub struct GithubAdapter {
    config: GithubConfig,
}

impl GithubAdapter {
    pub fn new(config: GithubConfig) -> Result<Self, AdapterError> {
        config.stage_map.validate("github")?;
        Ok(Self { config })
    }

    fn stage_label_for(&self, stage: Stage) -> Option<String> {
        self.config
            .stage_map
            .native_names_for(stage)
            .first()
            .map(|s| s.to_string())
    }

    async fn run_gh(&self, args: &[&str], desc: &str) -> Result<Vec<u8>, AdapterError> {
        let mut cmd = Command::new("gh");
        cmd.args(args).arg("--repo").arg(&self.config.repo);
        let output = run_with_timeout(cmd, CLI_TIMEOUT, desc).await?;
        let output = require_success(output, desc)?;
        Ok(output.stdout)
    }

    fn issue_to_work_item(&self, issue: &GhIssue) -> WorkItem {
        let stage = issue
            .labels
            .iter()
            .find_map(|l| self.config.stage_map.canonical_for(&l.name))
            .unwrap_or(Stage::Todo);

        let mut builder = WorkItemBuilder::new(issue.number.to_string())
            .title(issue.title.clone())
            .stage(stage)
            .url(issue.url.clone());
        for label in &issue.labels {
            builder = builder.label(label.name.clone());
        }
        for assignee in &issue.assignees {
            builder = builder.assignee(Actor::new().with_username(assignee.login.clone()));
        }
        if let Some(body) = &issue.body {
            builder = builder.body(html_to_text(body));
        }
        if let Some(updated_at) = issue.updated_at {
            builder = builder.updated_at(updated_at);
        }
        builder.build_or_fallback(format!("issue #{}", issue.number))
    }
}

#[derive(Debug, Deserialize)]
struct GhIssue {
    number: u64,
    title: String,
    url: String,
    body: Option<String>,
    labels: Vec<GhLabel>,
    assignees: Vec<GhUser>,
    #[serde(rename = "updatedAt")]
    updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize)]
struct GhLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GhUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GhComment {
    id: u64,
    body: String,
    author: GhCommentAuthor,
    #[serde(rename = "createdAt")]
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize)]
struct GhCommentAuthor {
    login: String,
}

const ISSUE_FIELDS: &str = "number,title,url,body,labels,assignees,updatedAt";

#[async_trait]
impl AdapterPort for GithubAdapter {
    fn name(&self) -> &str {
        "github"
    }

    async fn whoami(&self) -> Result<Actor, AdapterError> {
        let mut cmd = Command::new("gh");
        cmd.args(["api", "user", "--jq", ".login"]);
        let output = run_with_timeout(cmd, CLI_TIMEOUT, "gh api user").await?;
        let output = require_success(output, "gh api user")?;
        let login = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Actor::new().with_username(login))
    }

    async fn fetch_snapshot(&self) -> Result<Snapshot, AdapterError> {
        let raw = self
            .run_gh(
                &["issue", "list", "--state", "open", "--limit", "500", "--json", ISSUE_FIELDS],
                "gh issue list",
            )
            .await?;
        let issues: Vec<GhIssue> = serde_json::from_slice(&raw).map_err(|e| {
            AdapterError::Protocol(AdapterProtocolError {
                adapter: "github".to_string(),
                operation: "fetch_snapshot".to_string(),
                detail: e.to_string(),
            })
        })?;
        Ok(issues
            .iter()
            .map(|issue| (issue.number.to_string(), self.issue_to_work_item(issue)))
            .collect())
    }

    async fn list_ids_by_stage(&self, stage: Stage) -> Result<Vec<String>, AdapterError> {
        let snapshot = self.fetch_snapshot().await?;
        let mut ids: Vec<String> = snapshot
            .values()
            .filter(|item| item.stage == stage)
            .map(|item| item.id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn list_backlog_ids_in_order(&self) -> Result<Vec<String>, AdapterError> {
        let snapshot = self.fetch_snapshot().await?;
        let mut items: Vec<&WorkItem> = snapshot.values().filter(|item| item.stage == Stage::Todo).collect();
        items.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(items.into_iter().map(|item| item.id.clone()).collect())
    }

    async fn get_work_item(&self, id: &str) -> Result<WorkItemDetails, AdapterError> {
        let raw = self
            .run_gh(&["issue", "view", id, "--json", ISSUE_FIELDS], "gh issue view")
            .await?;
        let issue: GhIssue = serde_json::from_slice(&raw).map_err(|e| {
            AdapterError::Protocol(AdapterProtocolError {
                adapter: "github".to_string(),
                operation: "get_work_item".to_string(),
                detail: e.to_string(),
            })
        })?;
        let item = self.issue_to_work_item(&issue);
        let comments = self.list_comments(id, ListCommentsOptions::default()).await?;
        Ok(WorkItemDetails {
            item,
            comments,
            attachments: Vec::new(),
            links: Vec::new(),
        })
    }

    async fn list_comments(&self, id: &str, options: ListCommentsOptions) -> Result<Vec<Comment>, AdapterError> {
        let raw = self
            .run_gh(&["issue", "view", id, "--json", "comments"], "gh issue view comments")
            .await?;
        #[derive(Deserialize)]
        struct Wrapper {
            comments: Vec<GhComment>,
        }
        let wrapper: Wrapper = serde_json::from_slice(&raw).map_err(|e| {
            AdapterError::Protocol(AdapterProtocolError {
                adapter: "github".to_string(),
                operation: "list_comments".to_string(),
                detail: e.to_string(),
            })
        })?;
        let mut comments: Vec<Comment> = wrapper
            .comments
            .into_iter()
            .map(|c| Comment {
                id: c.id.to_string(),
                author: Actor::new().with_username(c.author.login),
                body: c.body,
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
        let Some(label) = self.stage_label_for(stage) else {
            return Err(AdapterError::Config {
                adapter: "github".to_string(),
                detail: format!("no stageMap label for {stage}"),
            });
        };
        let details = self.get_work_item(id).await?;
        for existing in &details.item.labels {
            if self.config.stage_map.canonical_for(existing).is_some() && existing != &label {
                let mut cmd = Command::new("gh");
                cmd.args(["issue", "edit", id, "--remove-label", existing]);
                let output = run_with_timeout(cmd, CLI_TIMEOUT, "gh issue edit --remove-label").await?;
                require_success(output, "gh issue edit --remove-label")?;
            }
        }
        let mut cmd = Command::new("gh");
        cmd.args(["issue", "edit", id, "--add-label", &label]);
        let output = run_with_timeout(cmd, CLI_TIMEOUT, "gh issue edit --add-label").await?;
        require_success(output, "gh issue edit --add-label")?;
        Ok(())
    }

    async fn add_comment(&self, id: &str, body: &str) -> Result<(), AdapterError> {
        if body.trim().is_empty() {
            return Ok(());
        }
        let mut cmd = Command::new("gh");
        cmd.args(["issue", "comment", id, "--body", body]);
        let output = run_with_timeout(cmd, CLI_TIMEOUT, "gh issue comment").await?;
        require_success(output, "gh issue comment")?;
        Ok(())
    }

    async fn create_in_backlog_and_assign_to_self(
        &self,
        request: CreateTicketRequest,
    ) -> Result<CreatedWorkItem, AdapterError> {
        let mut cmd = Command::new("gh");
        cmd.args(["issue", "create", "--title", &request.title, "--body", &request.body, "--assignee", "@me"]);
        let output = run_with_timeout(cmd, CLI_TIMEOUT, "gh issue create").await?;
        let output = require_success(output, "gh issue create")?;
        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let id = url.rsplit('/').next().unwrap_or_default().to_string();
        Ok(CreatedWorkItem { id, url: Some(url) })
    }
}

#[cfg(test)]
#[path = "github_tests.rs"]
mod tests;
