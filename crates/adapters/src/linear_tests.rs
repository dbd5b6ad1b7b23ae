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

fn adapter() -> LinearAdapter {
    LinearAdapter {
        config: LinearConfig {
            team_id: "team-1".to_string(),
            stage_map: stage_map(),
        },
        client: reqwest::Client::new(),
        api_key: "test-key".to_string(),
    }
}

#[test]
fn issue_to_work_item_maps_state_to_stage() {
    let issue = LinearIssue {
        id: "issue-1".to_string(),
        identifier: "ENG-1".to_string(),
        title: "Fix bug".to_string(),
        url: "https://linear.app/team/issue/ENG-1".to_string(),
        description: Some("repro steps".to_string()),
        priority: Some(2.0),
        updated_at: None,
        state: LinearState {
            name: "In Progress".to_string(),
        },
        labels: LinearLabelConnection { nodes: vec![] },
        assignee: Some(LinearUser {
            id: "user-1".to_string(),
            name: "Ada".to_string(),
        }),
    };
    let item = adapter().issue_to_work_item(&issue);
    assert_eq!(item.stage, Stage::InProgress);
    assert!(item.is_assigned_to(&Actor::new().with_id("user-1")));
}

#[test]
fn issue_with_unmapped_state_defaults_to_todo() {
    let issue = LinearIssue {
        id: "issue-2".to_string(),
        identifier: "ENG-2".to_string(),
        title: "Other".to_string(),
        url: "https://linear.app/team/issue/ENG-2".to_string(),
        description: None,
        priority: None,
        updated_at: None,
        state: LinearState {
            name: "Triage".to_string(),
        },
        labels: LinearLabelConnection { nodes: vec![] },
        assignee: None,
    };
    assert_eq!(adapter().issue_to_work_item(&issue).stage, Stage::Todo);
}
