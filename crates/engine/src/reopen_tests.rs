use super::*;
use kwf_adapters::FakeAdapter;
use kwf_core::test_support::{actor, work_item};
use kwf_core::{Comment, Stage};

fn comment(id: &str, author: Actor, body: &str) -> Comment {
    Comment {
        id: id.to_string(),
        author,
        body: body.to_string(),
        created_at: None,
    }
}

#[tokio::test]
async fn reopens_blocked_ticket_on_human_reply() {
    let me = actor("kwf-bot");
    let adapter = FakeAdapter::new("fake", me.clone()).with_item(work_item("A", "Ticket A", Stage::Blocked));
    adapter.set_comments(
        "A",
        vec![comment("c1", me.clone(), "Moved back."), comment("c2", actor("alice"), "Can you check on this?")],
    );

    let mut cursor = AutoReopenCursor::new();
    let config = AutoReopenConfig::default();
    let reopened = run_auto_reopen_watcher(&adapter, &me, &mut cursor, &config).await.unwrap();

    assert_eq!(reopened, vec!["A".to_string()]);
    assert_eq!(adapter.item("A").unwrap().stage, Stage::Todo);
    assert_eq!(cursor.newest_seen("A"), Some("c2"));
}

#[tokio::test]
async fn does_not_reopen_when_only_worker_commented() {
    let me = actor("kwf-bot");
    let adapter = FakeAdapter::new("fake", me.clone()).with_item(work_item("A", "Ticket A", Stage::InReview));
    adapter.set_comments("A", vec![comment("c1", me.clone(), "Still working on follow-ups.")]);

    let mut cursor = AutoReopenCursor::new();
    let config = AutoReopenConfig::default();
    let reopened = run_auto_reopen_watcher(&adapter, &me, &mut cursor, &config).await.unwrap();

    assert!(reopened.is_empty());
    assert_eq!(adapter.item("A").unwrap().stage, Stage::InReview);
    assert_eq!(cursor.newest_seen("A"), Some("c1"));
}

#[tokio::test]
async fn relayed_author_under_worker_account_still_counts_as_human() {
    let me = actor("kwf-bot");
    let adapter = FakeAdapter::new("fake", me.clone()).with_item(work_item("A", "Ticket A", Stage::InReview));
    adapter.set_comments(
        "A",
        vec![comment(
            "c1",
            me.clone(),
            "[planka-comment:9f2a]\nAuthor: Simon van Laak\n\nLooks good to me.",
        )],
    );

    let mut cursor = AutoReopenCursor::new();
    let config = AutoReopenConfig::default();
    let reopened = run_auto_reopen_watcher(&adapter, &me, &mut cursor, &config).await.unwrap();

    assert_eq!(reopened, vec!["A".to_string()]);
    assert_eq!(adapter.item("A").unwrap().stage, Stage::Todo);
}

#[tokio::test]
async fn stops_scanning_at_the_stored_cursor() {
    let me = actor("kwf-bot");
    let adapter = FakeAdapter::new("fake", me.clone()).with_item(work_item("A", "Ticket A", Stage::Blocked));
    adapter.set_comments(
        "A",
        vec![comment("c1", actor("alice"), "Old human reply."), comment("c2", me.clone(), "Acknowledged.")],
    );

    let mut cursor = AutoReopenCursor::new();
    cursor.advance("A", "c1");
    let config = AutoReopenConfig::default();
    let reopened = run_auto_reopen_watcher(&adapter, &me, &mut cursor, &config).await.unwrap();

    assert!(reopened.is_empty());
    assert_eq!(adapter.item("A").unwrap().stage, Stage::Blocked);
    assert_eq!(cursor.newest_seen("A"), Some("c2"));
}

#[tokio::test]
async fn dry_run_skips_mutation_and_cursor_write() {
    let me = actor("kwf-bot");
    let adapter = FakeAdapter::new("fake", me.clone()).with_item(work_item("A", "Ticket A", Stage::Blocked));
    adapter.set_comments("A", vec![comment("c1", actor("alice"), "Ping?")]);

    let mut cursor = AutoReopenCursor::new();
    let config = AutoReopenConfig {
        dry_run: true,
        ..Default::default()
    };
    let reopened = run_auto_reopen_watcher(&adapter, &me, &mut cursor, &config).await.unwrap();

    assert_eq!(reopened, vec!["A".to_string()]);
    assert_eq!(adapter.item("A").unwrap().stage, Stage::Blocked);
    assert_eq!(cursor.newest_seen("A"), None);
}
