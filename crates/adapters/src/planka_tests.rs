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

fn adapter() -> PlankaAdapter {
    PlankaAdapter {
        config: PlankaConfig {
            base_url: "https://planka.example.com".to_string(),
            project_ids: vec!["proj-1".to_string()],
            stage_map: stage_map(),
        },
        client: reqwest::Client::new(),
        token: "test-token".to_string(),
    }
}

#[test]
fn card_to_work_item_maps_list_name_to_stage() {
    let card = PlankaCard {
        id: "card-1".to_string(),
        name: "Fix bug".to_string(),
        description: Some("repro".to_string()),
        labels: vec!["urgent".to_string()],
        member_ids: vec!["user-1".to_string()],
        list_name: Some("In Review".to_string()),
    };
    let item = adapter().card_to_work_item(&card);
    assert_eq!(item.stage, Stage::InReview);
    assert!(item.is_assigned_to(&Actor::new().with_id("user-1")));
}

#[test]
fn card_without_list_name_defaults_to_todo() {
    let card = PlankaCard {
        id: "card-2".to_string(),
        name: "Other".to_string(),
        description: None,
        labels: vec![],
        member_ids: vec![],
        list_name: None,
    };
    assert_eq!(adapter().card_to_work_item(&card).stage, Stage::Todo);
}

#[test]
fn relayed_author_parses_leading_author_header() {
    let body = "Author: Simon van Laak\nThanks, looks good to me.";
    assert_eq!(relayed_author(body), Some("simon van laak".to_string()));
}

#[test]
fn relayed_author_is_none_without_header() {
    assert_eq!(relayed_author("Just a normal reply."), None);
}

#[test]
fn relayed_author_parses_header_behind_a_marker_line() {
    let body = "[planka-comment:9f2a]\nAuthor: Simon van Laak\n\nThanks, looks good to me.";
    assert_eq!(relayed_author(body), Some("simon van laak".to_string()));
}

#[test]
fn relayed_author_ignores_author_mentioned_past_the_scan_window() {
    let body = "L1\nL2\nL3\nL4\nAuthor: someone else entirely, much later in the thread.";
    assert_eq!(relayed_author(body), None);
}
