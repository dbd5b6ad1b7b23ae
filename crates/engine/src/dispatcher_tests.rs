use super::*;
use kwf_core::test_support::fixed_instant;
use kwf_storage::SessionMap;

fn context(id: &str, title: &str) -> TicketContext {
    TicketContext {
        id: id.to_string(),
        title: title.to_string(),
        body: None,
        url: None,
        comments: vec![],
        attachments: vec![],
        links: vec![],
    }
}

#[test]
fn started_outcome_opens_a_session_and_emits_work() {
    let previous = SessionMap::new();
    let now = fixed_instant();
    let output = AutopilotOutput {
        outcome: TickOutcome::Started {
            id: "A".to_string(),
            reason_code: "start_next_assigned_backlog",
            evidence: crate::tick::Evidence::default(),
        },
        context: Some(context("A", "Fix the thing")),
        next_ticket: None,
    };

    let (next, actions, active) = build_dispatcher_plan(&previous, now, &output);

    assert_eq!(active, Some("A".to_string()));
    let entry = next.entry("A").expect("session entry");
    assert_eq!(entry.last_state, SessionState::InProgress);
    assert!(!entry.is_closed());
    assert!(entry.session_id.starts_with("kanban-workflow-worker-A"));

    match &actions[..] {
        [DispatchAction::Work { ticket_id, session_id, instruction }] => {
            assert_eq!(ticket_id, "A");
            assert_eq!(session_id, &entry.session_id);
            assert!(instruction.starts_with("DO WORK NOW on ticket A."));
            assert!(instruction.contains("kanban-workflow continue --text"));
        }
        other => panic!("expected exactly one Work action, got {other:?}"),
    }
}

#[test]
fn session_id_is_stable_across_repeated_calls() {
    let mut previous = SessionMap::new();
    let now = fixed_instant();
    let output = AutopilotOutput {
        outcome: TickOutcome::InProgress {
            id: "A".to_string(),
            in_progress_ids: vec!["A".to_string()],
        },
        context: Some(context("A", "Fix the thing")),
        next_ticket: None,
    };

    let (next1, _, _) = build_dispatcher_plan(&previous, now, &output);
    previous = next1.clone();
    let (next2, _, _) = build_dispatcher_plan(&previous, now, &output);

    assert_eq!(next1.entry("A").unwrap().session_id, next2.entry("A").unwrap().session_id);
}

#[test]
fn blocked_outcome_finalizes_and_clears_active() {
    let mut previous = SessionMap::new();
    previous.active = Some(ActivePointer {
        ticket_id: "A".to_string(),
        session_id: "kanban-workflow-worker-a".to_string(),
    });
    previous.tickets.insert(
        "A".to_string(),
        SessionEntry {
            session_id: "kanban-workflow-worker-a".to_string(),
            session_label: Some("A Fix the thing".to_string()),
            last_state: SessionState::InProgress,
            last_seen_at: fixed_instant(),
            closed_at: None,
        },
    );

    let now = fixed_instant();
    let output = AutopilotOutput {
        outcome: TickOutcome::Blocked {
            id: "A".to_string(),
            minutes_stale: 20,
            reason: "stale".to_string(),
            reason_code: "stale_with_blocker_signal",
            evidence: crate::tick::Evidence::default(),
        },
        context: None,
        next_ticket: None,
    };

    let (next, actions, active) = build_dispatcher_plan(&previous, now, &output);

    assert_eq!(active, None);
    let entry = next.entry("A").unwrap();
    assert_eq!(entry.last_state, SessionState::Blocked);
    assert_eq!(entry.closed_at, Some(now));
    assert_eq!(
        actions,
        vec![DispatchAction::Finalize {
            ticket_id: "A".to_string(),
            session_id: "kanban-workflow-worker-a".to_string(),
            last_state: SessionState::Blocked,
        }]
    );
}

#[test]
fn completed_outcome_with_next_ticket_appends_a_work_action() {
    let previous = SessionMap::new();
    let now = fixed_instant();
    let output = AutopilotOutput {
        outcome: TickOutcome::Completed {
            id: "A".to_string(),
            reason_code: "completion_signal_strong",
            evidence: crate::tick::Evidence::default(),
        },
        context: None,
        next_ticket: Some(context("B", "Next thing")),
    };

    let (next, actions, active) = build_dispatcher_plan(&previous, now, &output);

    assert_eq!(active, Some("B".to_string()));
    assert_eq!(actions.len(), 2);
    assert!(matches!(&actions[0], DispatchAction::Finalize { ticket_id, .. } if ticket_id == "A"));
    assert!(matches!(&actions[1], DispatchAction::Work { ticket_id, .. } if ticket_id == "B"));
    assert_eq!(next.entry("B").unwrap().last_state, SessionState::InProgress);
}

#[test]
fn no_work_clears_active_and_emits_nothing() {
    let mut previous = SessionMap::new();
    previous.active = Some(ActivePointer {
        ticket_id: "A".to_string(),
        session_id: "kanban-workflow-worker-a".to_string(),
    });

    let now = fixed_instant();
    let output = AutopilotOutput {
        outcome: TickOutcome::NoWork {
            reason_code: "no_backlog_assigned",
        },
        context: None,
        next_ticket: None,
    };

    let (next, actions, active) = build_dispatcher_plan(&previous, now, &output);

    assert!(actions.is_empty());
    assert_eq!(active, None);
    assert_eq!(next.active, None);
}

#[test]
fn applying_continue_command_reopens_the_session() {
    let mut map = SessionMap::new();
    map.tickets.insert(
        "A".to_string(),
        SessionEntry {
            session_id: "kanban-workflow-worker-a".to_string(),
            session_label: Some("A".to_string()),
            last_state: SessionState::InProgress,
            last_seen_at: fixed_instant(),
            closed_at: None,
        },
    );
    let command = WorkerCommand {
        kind: WorkerCommandKind::Continue,
        text: "still going".to_string(),
    };

    let next = apply_worker_command_to_session_map(&map, "A", &command, fixed_instant());

    let entry = next.entry("A").unwrap();
    assert_eq!(entry.last_state, SessionState::InProgress);
    assert_eq!(entry.closed_at, None);
    assert_eq!(next.active, Some(ActivePointer { ticket_id: "A".to_string(), session_id: entry.session_id.clone() }));
}

#[test]
fn applying_completed_command_closes_the_session_and_clears_active() {
    let mut map = SessionMap::new();
    map.active = Some(ActivePointer {
        ticket_id: "A".to_string(),
        session_id: "kanban-workflow-worker-a".to_string(),
    });
    map.tickets.insert(
        "A".to_string(),
        SessionEntry {
            session_id: "kanban-workflow-worker-a".to_string(),
            session_label: Some("A".to_string()),
            last_state: SessionState::InProgress,
            last_seen_at: fixed_instant(),
            closed_at: None,
        },
    );
    let command = WorkerCommand {
        kind: WorkerCommandKind::Completed,
        text: "done".to_string(),
    };

    let next = apply_worker_command_to_session_map(&map, "A", &command, fixed_instant());

    let entry = next.entry("A").unwrap();
    assert_eq!(entry.last_state, SessionState::Completed);
    assert_eq!(entry.closed_at, Some(fixed_instant()));
    assert_eq!(next.active, None);
}
