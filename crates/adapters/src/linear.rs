// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Linear backend: GraphQL over `reqwest` against `api.linear.app`.

use async_trait::async_trait;
use kwf_core::{Actor, Comment, Snapshot, Stage, WorkItem, WorkItemBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AdapterError, AdapterProtocolError};
use crate::port::{
    AdapterPort, Attachment, CreateTicketRequest, CreatedWorkItem, LinkedWorkItem, ListCommentsOptions,
    WorkItemDetails,
};
use crate::stage_map::StageMap;

const LINEAR_GRAPHQL_URL: &str = "https://api.linear.app/graphql";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearConfig {
    pub team_id: String,
    pub stage_map: StageMap,
}

pub struct LinearAdapter {
    config: LinearConfig,
    client: reqwest::Client,
    api_key: String,
}

impl LinearAdapter {
    pub fn new(config: LinearConfig) -> Result<Self, AdapterError> {
        config.stage_map.validate("linear")?;
        let api_key = std::env::var("LINEAR_API_KEY").map_err(|_| AdapterError::Config {
            adapter: "linear".to_string(),
            detail: "LINEAR_API_KEY is not set".to_string(),
        })?;
        Ok(Self {
            config,
            client: reqwest::Client::new(),
            api_key,
        })
    }

    async fn graphql(&self, query: &str, variables: serde_json::Value) -> Result<serde_json::Value, AdapterError> {
        let response = self
            .client
            .post(LINEAR_GRAPHQL_URL)
            .header("Authorization", &self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|source| AdapterError::Http {
                url: LINEAR_GRAPHQL_URL.to_string(),
                source,
            })?;
        let body: serde_json::Value = response.json().await.map_err(|source| AdapterError::Http {
            url: LINEAR_GRAPHQL_URL.to_string(),
            source,
        })?;
        if let Some(errors) = body.get("errors") {
            return Err(AdapterError::Protocol(AdapterProtocolError {
                adapter: "linear".to_string(),
                operation: "graphql".to_string(),
                detail: errors.to_string(),
            }));
        }
        body.get("data").cloned().ok_or_else(|| {
            AdapterError::Protocol(AdapterProtocolError {
                adapter: "linear".to_string(),
                operation: "graphql".to_string(),
                detail: "response had no data field".to_string(),
            })
        })
    }

    fn issue_to_work_item(&self, issue: &LinearIssue) -> WorkItem {
        let stage = self
            .config
            .stage_map
            .canonical_for(&issue.state.name)
            .unwrap_or(Stage::Todo);
        let mut builder = WorkItemBuilder::new(issue.id.clone())
            .title(issue.title.clone())
            .stage(stage)
            .url(issue.url.clone());
        for label in &issue.labels.nodes {
            builder = builder.label(label.name.clone());
        }
        for assignee in issue.assignee.iter() {
            builder = builder.assignee(
                Actor::new()
                    .with_id(assignee.id.clone())
                    .with_name(assignee.name.clone()),
            );
        }
        if let Some(description) = &issue.description {
            builder = builder.body(description.clone());
        }
        if let Some(updated_at) = issue.updated_at {
            builder = builder.updated_at(updated_at);
        }
        let fallback_title = if issue.identifier.trim().is_empty() {
            format!("issue {}", issue.id)
        } else {
            issue.identifier.clone()
        };
        builder.build_or_fallback(fallback_title)
    }
}

#[derive(Debug, Deserialize)]
struct LinearIssue {
    id: String,
    identifier: String,
    title: String,
    url: String,
    description: Option<String>,
    priority: Option<f64>,
    #[serde(rename = "updatedAt")]
    updated_at: Option<chrono::DateTime<chrono::Utc>>,
    state: LinearState,
    labels: LinearLabelConnection,
    assignee: Option<LinearUser>,
}

#[derive(Debug, Deserialize)]
struct LinearState {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LinearLabelConnection {
    nodes: Vec<LinearLabel>,
}

#[derive(Debug, Deserialize)]
struct LinearLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct LinearUser {
    id: String,
    name: String,
}

const ISSUES_QUERY: &str = r#"
query($teamId: String!) {
  team(id: $teamId) {
    issues(first: 250, filter: { state: { type: { neq: "canceled" } } }) {
      nodes {
        id identifier title url description priority updatedAt
        state { name }
        labels { nodes { name } }
        assignee { id name }
      }
    }
  }
}
"#;

#[async_trait]
impl AdapterPort for LinearAdapter {
    fn name(&self) -> &str {
        "linear"
    }

    async fn whoami(&self) -> Result<Actor, AdapterError> {
        let data = self.graphql("query { viewer { id name email } }", json!({})).await?;
        let viewer = &data["viewer"];
        Ok(Actor::new()
            .with_id(viewer["id"].as_str().unwrap_or_default())
            .with_name(viewer["name"].as_str().unwrap_or_default())
            .with_username(viewer["email"].as_str().unwrap_or_default()))
    }

    async fn fetch_snapshot(&self) -> Result<Snapshot, AdapterError> {
        let data = self
            .graphql(ISSUES_QUERY, json!({ "teamId": self.config.team_id }))
            .await?;
        let nodes: Vec<LinearIssue> = serde_json::from_value(data["team"]["issues"]["nodes"].clone())
            .map_err(|e| AdapterError::protocol("linear", "fetch_snapshot", e.to_string()))?;
        Ok(nodes.iter().map(|issue| (issue.id.clone(), self.issue_to_work_item(issue))).collect())
    }

    async fn list_ids_by_stage(&self, stage: Stage) -> Result<Vec<String>, AdapterError> {
        let snapshot = self.fetch_snapshot().await?;
        let mut ids: Vec<String> = snapshot.values().filter(|i| i.stage == stage).map(|i| i.id.clone()).collect();
        ids.sort();
        Ok(ids)
    }

    async fn list_backlog_ids_in_order(&self) -> Result<Vec<String>, AdapterError> {
        let data = self
            .graphql(ISSUES_QUERY, json!({ "teamId": self.config.team_id }))
            .await?;
        let nodes: Vec<LinearIssue> = serde_json::from_value(data["team"]["issues"]["nodes"].clone())
            .map_err(|e| AdapterError::protocol("linear", "list_backlog_ids_in_order", e.to_string()))?;
        let mut backlog: Vec<&LinearIssue> = nodes
            .iter()
            .filter(|issue| self.config.stage_map.canonical_for(&issue.state.name) == Some(Stage::Todo))
            .collect();
        backlog.sort_by(|a, b| {
            b.priority
                .partial_cmp(&a.priority)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(backlog.into_iter().map(|issue| issue.id.clone()).collect())
    }

    async fn get_work_item(&self, id: &str) -> Result<WorkItemDetails, AdapterError> {
        let data = self
            .graphql(
                r#"query($id: String!) { issue(id: $id) {
                    id identifier title url description priority updatedAt
                    state { name } labels { nodes { name } } assignee { id name }
                } }"#,
                json!({ "id": id }),
            )
            .await?;
        let issue: LinearIssue = serde_json::from_value(data["issue"].clone())
            .map_err(|e| AdapterError::protocol("linear", "get_work_item", e.to_string()))?;
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
        let data = self
            .graphql(
                r#"query($id: String!) { issue(id: $id) { comments(first: 100) { nodes {
                    id body createdAt user { id name }
                } } } }"#,
                json!({ "id": id }),
            )
            .await?;
        #[derive(Deserialize)]
        struct RawComment {
            id: String,
            body: String,
            #[serde(rename = "createdAt")]
            created_at: Option<chrono::DateTime<chrono::Utc>>,
            user: Option<LinearUser>,
        }
        let nodes: Vec<RawComment> = serde_json::from_value(data["issue"]["comments"]["nodes"].clone())
            .map_err(|e| AdapterError::protocol("linear", "list_comments", e.to_string()))?;
        let mut comments: Vec<Comment> = nodes
            .into_iter()
            .map(|c| Comment {
                id: c.id,
                author: c
                    .user
                    .map(|u| Actor::new().with_id(u.id).with_name(u.name))
                    .unwrap_or_default(),
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
        let Some(state_name) = self.config.stage_map.native_names_for(stage).first().map(|s| s.to_string()) else {
            return Err(AdapterError::Config {
                adapter: "linear".to_string(),
                detail: format!("no stageMap state for {stage}"),
            });
        };
        self.graphql(
            r#"mutation($id: String!, $stateName: String!) {
                issueUpdate(id: $id, input: { stateId: $stateName }) { success }
            }"#,
            json!({ "id": id, "stateName": state_name }),
        )
        .await?;
        Ok(())
    }

    async fn add_comment(&self, id: &str, body: &str) -> Result<(), AdapterError> {
        if body.trim().is_empty() {
            return Ok(());
        }
        self.graphql(
            r#"mutation($issueId: String!, $body: String!) {
                commentCreate(input: { issueId: $issueId, body: $body }) { success }
            }"#,
            json!({ "issueId": id, "body": body }),
        )
        .await?;
        Ok(())
    }

    async fn create_in_backlog_and_assign_to_self(
        &self,
        request: CreateTicketRequest,
    ) -> Result<CreatedWorkItem, AdapterError> {
        let data = self
            .graphql(
                r#"mutation($teamId: String!, $title: String!, $description: String!) {
                    issueCreate(input: { teamId: $teamId, title: $title, description: $description, assigneeId: "me" }) {
                        issue { id url }
                    }
                }"#,
                json!({ "teamId": self.config.team_id, "title": request.title, "description": request.body }),
            )
            .await?;
        let issue = &data["issueCreate"]["issue"];
        Ok(CreatedWorkItem {
            id: issue["id"].as_str().unwrap_or_default().to_string(),
            url: issue["url"].as_str().map(|s| s.to_string()),
        })
    }
}

#[cfg(test)]
#[path = "linear_tests.rs"]
mod tests;
