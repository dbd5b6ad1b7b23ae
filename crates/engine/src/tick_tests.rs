use super::*;
use kwf_adapters::FakeAdapter;
use kwf_core::test_support::{actor, fixed_instant, work_item, work_item_assigned_to};
use kwf_core::{Comment, Stage};

fn config(now: chrono::DateTime<Utc>) -> TickConfig {
    let mut cfg = TickConfig::new(std::env::temp_dir().join(format!("kwf-tick-test-{}.lock", now.timestamp_nanos_opt().unwrap_or(0))), 1);
    cfg.stale_threshold_minutes = 15;
    cfg
}

fn comment(id: &str, body: &str) -> Comment {
    Comment {
        id: id.to_string(),
        author: actor("me"),
        body: body.to_string(),
        created_at: Some(fixed_instant()),
    }
}

#[tokio::test]
async fn idle_pick_starts_first_assigned_backlog_item() {
    let me = actor("me");
    let adapter = FakeAdapter::new("fake", me.clone())
        .with_item(work_item_assigned_to("B", "Do the thing", Stage::Todo, "me"))
        .with_item(work_item_assigned_to("C", "Do another thing", Stage::Todo, "me"));

    let now = fixed_instant();
    let outcome = tick(&adapter, now, &config(now)).await.expect("tick succeeds");

    match outcome {
        TickOutcome::Started { id, reason_code, .. } => {
            assert_eq!(id, "B");
            assert_eq!(reason_code, "start_next_assigned_backlog");
        }
        other => panic!("expected Started, got {other:?}"),
    }
}

#[tokio::test]
async fn self_assignment_filter_skips_in_progress_not_mine() {
    let me = actor("me");
    let adapter = FakeAdapter::new("fake", me.clone())
        .with_item(work_item_assigned_to("A", "Someone else's", Stage::InProgress, "other"))
        .with_item(work_item_assigned_to("B", "Mine", Stage::Todo, "me"))
        .with_item(work_item_assigned_to("C", "Also mine", Stage::Todo, "me"));

    let now = fixed_instant();
    let outcome = tick(&adapter, now, &config(now)).await.expect("tick succeeds");

    match outcome {
        TickOutcome::Started { id, .. } => assert_eq!(id, "B"),
        other => panic!("expected Started, got {other:?}"),
    }
}

#[tokio::test]
async fn heal_extras_keeps_oldest_and_moves_the_rest_back() {
    let me = actor("me");
    let older = fixed_instant();
    let newer = older + chrono::Duration::hours(1);

    let adapter = FakeAdapter::new("fake", me.clone())
        .with_item({
            let mut item = work_item_assigned_to("A", "Oldest mine", Stage::InProgress, "me");
            item.updated_at = Some(older);
            item
        })
        .with_item({
            let mut item = work_item_assigned_to("B", "Newer mine", Stage::InProgress, "me");
            item.updated_at = Some(newer);
            item
        })
        .with_item(work_item_assigned_to("C", "Not mine", Stage::InProgress, "other"));

    let outcome = tick(&adapter, newer, &config(newer)).await.expect("tick succeeds");

    match outcome {
        TickOutcome::InProgress { id, in_progress_ids } => {
            assert_eq!(id, "A");
            assert_eq!(in_progress_ids, vec!["A".to_string()]);
        }
        other => panic!("expected InProgress, got {other:?}"),
    }

    let calls = adapter.calls();
    assert!(calls.iter().any(|c| c.contains("set_stage") && c.contains('B') && c.contains("Todo")));
    let b_comments = adapter.list_comments("B", ListCommentsOptions::default()).await.expect("list succeeds");
    assert!(b_comments.iter().any(|c| c.body.starts_with("Moved back to Backlog automatically")));
}

#[tokio::test]
async fn strong_completion_signal_wins_over_staleness() {
    let me = actor("me");
    let now = fixed_instant();
    let adapter = FakeAdapter::new("fake", me.clone())
        .with_item({
            let mut item = work_item_assigned_to("A", "Shipping", Stage::InProgress, "me");
            item.updated_at = Some(now - chrono::Duration::minutes(30));
            item
        })
        .with_comments("A", vec![comment("c1", "Completed: shipped and verified")]);

    let outcome = tick(&adapter, now, &config(now)).await.expect("tick succeeds");

    match outcome {
        TickOutcome::Completed {
            id,
            reason_code,
            evidence,
        } => {
            assert_eq!(id, "A");
            assert_eq!(reason_code, "completion_signal_strong");
            assert_eq!(evidence.matched_signal.as_deref(), Some("completed:"));
        }
        other => panic!("expected Completed, got {other:?}"),
    }
}

#[tokio::test]
async fn stale_with_blocker_signal_reports_blocked() {
    let me = actor("me");
    let now = fixed_instant();
    let adapter = FakeAdapter::new("fake", me.clone())
        .with_item({
            let mut item = work_item_assigned_to("A", "Stuck", Stage::InProgress, "me");
            item.updated_at = Some(now - chrono::Duration::minutes(20));
            item
        })
        .with_comments("A", vec![comment("c1", "Still waiting on API credential, blocked here.")]);

    let outcome = tick(&adapter, now, &config(now)).await.expect("tick succeeds");

    match outcome {
        TickOutcome::Blocked {
            id,
            minutes_stale,
            reason_code,
            evidence,
            ..
        } => {
            assert_eq!(id, "A");
            assert_eq!(minutes_stale, 20);
            assert_eq!(reason_code, "stale_with_blocker_signal");
            assert_eq!(evidence.matched_signal.as_deref(), Some("waiting on"));
        }
        other => panic!("expected Blocked, got {other:?}"),
    }
}

#[tokio::test]
async fn blocker_signal_below_stale_threshold_keeps_in_progress() {
    let me = actor("me");
    let now = fixed_instant();
    let adapter = FakeAdapter::new("fake", me.clone())
        .with_item({
            let mut item = work_item_assigned_to("A", "Stuck soon", Stage::InProgress, "me");
            item.updated_at = Some(now - chrono::Duration::minutes(5));
            item
        })
        .with_comments("A", vec![comment("c1", "blocked on review")]);

    let outcome = tick(&adapter, now, &config(now)).await.expect("tick succeeds");

    assert!(matches!(outcome, TickOutcome::InProgress { .. }));
}

#[tokio::test]
async fn no_mine_in_progress_and_empty_backlog_is_no_work() {
    let me = actor("me");
    let now = fixed_instant();
    let adapter = FakeAdapter::new("fake", me.clone());

    let outcome = tick(&adapter, now, &config(now)).await.expect("tick succeeds");

    match outcome {
        TickOutcome::NoWork { reason_code } => assert_eq!(reason_code, "no_backlog_assigned"),
        other => panic!("expected NoWork, got {other:?}"),
    }
}

#[tokio::test]
async fn next_backlog_item_not_assigned_to_me_is_no_work() {
    let me = actor("me");
    let now = fixed_instant();
    let adapter = FakeAdapter::new("fake", me.clone()).with_item(work_item("B", "Unassigned", Stage::Todo));

    let outcome = tick(&adapter, now, &config(now)).await.expect("tick succeeds");

    match outcome {
        TickOutcome::NoWork { reason_code } => assert_eq!(reason_code, "next_not_assigned_to_me"),
        other => panic!("expected NoWork, got {other:?}"),
    }
}

#[tokio::test]
async fn decision_exclusivity_in_progress_ids_subset_of_listed() {
    let me = actor("me");
    let now = fixed_instant();
    let adapter = FakeAdapter::new("fake", me.clone()).with_item(work_item_assigned_to("A", "Solo", Stage::InProgress, "me"));

    let outcome = tick(&adapter, now, &config(now)).await.expect("tick succeeds");
    let listed = adapter.list_ids_by_stage(Stage::InProgress).await.expect("list succeeds");

    if let TickOutcome::InProgress { in_progress_ids, .. } = outcome {
        assert!(in_progress_ids.iter().all(|id| listed.contains(id)));
    } else {
        panic!("expected InProgress");
    }
}

#[test]
fn completion_is_proven_only_for_strong_signal() {
    let strong = TickOutcome::Completed {
        id: "A".into(),
        reason_code: "completion_signal_strong",
        evidence: Evidence::default(),
    };
    assert!(completion_is_proven(&strong));

    let blocked = TickOutcome::Blocked {
        id: "A".into(),
        minutes_stale: 20,
        reason: "x".into(),
        reason_code: "stale_with_blocker_signal",
        evidence: Evidence::default(),
    };
    assert!(!completion_is_proven(&blocked));
}
