use super::*;
use crate::fake::FakeAdapter;
use kwf_core::test_support::{actor, work_item_assigned_to};

#[tokio::test]
async fn fetch_assignees_batches_get_work_item_calls() {
    let adapter = FakeAdapter::new("fake", actor("me"))
        .with_item(work_item_assigned_to("A", "Fix bug", Stage::InProgress, "me"))
        .with_item(work_item_assigned_to("B", "Other", Stage::InProgress, "someone-else"));

    let ids = vec!["A".to_string(), "B".to_string()];
    let assignees = fetch_assignees(&adapter, &ids).await.unwrap();

    assert_eq!(assignees.len(), 2);
    assert!(assignees["A"].iter().any(|a| a.matches(&actor("me"))));
    assert!(assignees["B"].iter().any(|a| a.matches(&actor("someone-else"))));
}

#[test]
fn list_comments_options_default_favors_recent_external_comments() {
    let options = ListCommentsOptions::default();
    assert_eq!(options.limit, 20);
    assert!(options.newest_first);
    assert!(!options.include_internal);
}
