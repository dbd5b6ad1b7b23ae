use super::*;
use crate::work_item::WorkItemBuilder;

fn item(id: &str, title: &str, stage: Stage) -> (String, crate::WorkItem) {
    (
        id.to_string(),
        WorkItemBuilder::new(id).title(title).stage(stage).build().unwrap(),
    )
}

#[test]
fn diff_is_empty_for_identical_snapshots() {
    let snap: Snapshot = [item("A", "Fix bug", Stage::Todo)].into_iter().collect();
    assert!(diff(&snap, &snap.clone()).is_empty());
}

#[test]
fn diff_detects_deletions_before_creations_before_changes() {
    let before: Snapshot = [
        item("A", "Fix bug", Stage::Todo),
        item("Z", "Old ticket", Stage::Todo),
    ]
    .into_iter()
    .collect();
    let after: Snapshot = [
        item("A", "Fix bug", Stage::InProgress),
        item("B", "New ticket", Stage::Todo),
    ]
    .into_iter()
    .collect();

    let events = diff(&before, &after);
    assert_eq!(
        events,
        vec![
            Event::Deleted { id: "Z".into() },
            Event::Created { id: "B".into() },
            Event::StageChanged {
                id: "A".into(),
                from: Stage::Todo,
                to: Stage::InProgress,
            },
        ]
    );
}

#[test]
fn stage_change_takes_precedence_over_content_update() {
    let before: Snapshot = [item("A", "Fix bug", Stage::Todo)].into_iter().collect();
    let mut after_item = WorkItemBuilder::new("A")
        .title("Fix the bug")
        .stage(Stage::Blocked)
        .build()
        .unwrap();
    after_item.labels.push("urgent".to_string());
    let after: Snapshot = [("A".to_string(), after_item)].into_iter().collect();

    let events = diff(&before, &after);
    assert_eq!(
        events,
        vec![Event::StageChanged {
            id: "A".into(),
            from: Stage::Todo,
            to: Stage::Blocked,
        }]
    );
}

#[test]
fn title_or_label_change_without_stage_change_is_updated() {
    let before: Snapshot = [item("A", "Fix bug", Stage::Todo)].into_iter().collect();
    let after: Snapshot = [item("A", "Fix the bug", Stage::Todo)].into_iter().collect();

    assert_eq!(diff(&before, &after), vec![Event::Updated { id: "A".into() }]);
}

#[test]
fn diff_is_order_insensitive_to_insertion_order() {
    let a: Snapshot = [item("A", "x", Stage::Todo), item("B", "y", Stage::Todo)]
        .into_iter()
        .collect();
    let b: Snapshot = [item("B", "y", Stage::Todo), item("A", "x", Stage::Todo)]
        .into_iter()
        .collect();
    assert!(diff(&a, &b).is_empty());
}
