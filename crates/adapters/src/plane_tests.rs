use super::*;

fn stage_map() -> StageMap {
    StageMap::new(
        [
            ("Backlog".to_string(), Stage::Todo),
            ("Blocked".to_string(), Stage::Blocked),
            ("In Progress".to_string(), Stage::InProgress),
            ("In Review".to_string(), Stage::InReview),
        ]
        .into_iter()
        .collect(),
    )
}

fn adapter() -> PlaneAdapter {
    PlaneAdapter {
        config: PlaneConfig {
            workspace_slug: "acme".to_string(),
            project_ids: vec!["proj-1".to_string()],
            base_url: None,
            stage_map: stage_map(),
        },
        client: reqwest::Client::new(),
        api_key: "test-key".to_string(),
    }
}

fn issue(id: &str, state: &str, priority: Option<&str>) -> PlaneIssue {
    PlaneIssue {
        id: id.to_string(),
        name: "Fix bug".to_string(),
        description_html: Some("<p>repro</p>".to_string()),
        priority: priority.map(|s| s.to_string()),
        assignees: vec!["user-1".to_string()],
        state_detail: PlaneStateDetail { name: state.to_string() },
        updated_at: None,
    }
}

#[test]
fn issue_to_work_item_namespaces_id_by_project() {
    let item = adapter().issue_to_work_item("proj-1", &issue("5", "In Progress", Some("high")));
    assert_eq!(item.id, "proj-1:5");
    assert_eq!(item.stage, Stage::InProgress);
    assert_eq!(item.body.as_deref(), Some("repro\n"));
}

#[test]
fn unmapped_state_defaults_to_todo() {
    let item = adapter().issue_to_work_item("proj-1", &issue("6", "Triage", None));
    assert_eq!(item.stage, Stage::Todo);
}
