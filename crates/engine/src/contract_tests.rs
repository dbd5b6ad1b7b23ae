use super::*;
use crate::error::ContractViolation;

fn valid_continue_response() -> String {
    "Looked into the failing test.\n\nEVIDENCE:\nRan the test suite; key result: 3 tests now pass.\n\nkanban-workflow continue --text \"Fixed the flaky test.\""
        .to_string()
}

#[test]
fn parses_a_valid_continue_command() {
    let result = validate_worker_response_contract(&valid_continue_response());
    assert!(result.ok, "violations: {:?}", result.violations);
    let command = result.command.expect("command present");
    assert_eq!(command.kind, WorkerCommandKind::Continue);
    assert_eq!(command.text, "Fixed the flaky test.");
    assert!(result.evidence.present);
    assert!(result.evidence.has_concrete_execution);
}

#[test]
fn parses_blocked_command_with_escaped_quotes_and_newline() {
    let text = "EVIDENCE:\nAsked for credentials, no execution needed yet.\n\nkanban-workflow blocked --text \"Dependency says \\\"no\\\" for now.\\nNeed maintainer approval.\"";
    let result = validate_worker_response_contract(text);
    assert!(result.ok, "violations: {:?}", result.violations);
    let command = result.command.unwrap();
    assert_eq!(command.kind, WorkerCommandKind::Blocked);
    assert_eq!(command.text, "Dependency says \"no\" for now.\nNeed maintainer approval.");
}

#[test]
fn parses_completed_command() {
    let text = "EVIDENCE:\nShipped and verified end to end.\n\nkanban-workflow completed --result \"All good.\"";
    let result = validate_worker_response_contract(text);
    assert!(result.ok, "violations: {:?}", result.violations);
    assert_eq!(result.command.unwrap().kind, WorkerCommandKind::Completed);
}

#[test]
fn rejects_missing_terminal_command() {
    let result = validate_worker_response_contract("EVIDENCE:\nRan the tests.\n\nAll done, nothing more to say.");
    assert!(!result.ok);
    assert!(result.command.is_none());
    assert!(result.violations.contains(&ContractViolation::NoTerminalCommand));
}

#[test]
fn rejects_multiple_candidate_lines() {
    let text = "kanban-workflow continue --text \"first\"\nEVIDENCE:\nRan tests.\nkanban-workflow continue --text \"second\"";
    let result = validate_worker_response_contract(text);
    assert!(!result.ok);
    assert!(result.violations.contains(&ContractViolation::MultipleTerminalCandidates));
}

#[test]
fn rejects_terminal_command_not_on_last_line() {
    let text = "EVIDENCE:\nRan tests.\n\nkanban-workflow continue --text \"done\"\nOne more trailing thought.";
    let result = validate_worker_response_contract(text);
    assert!(!result.ok);
    assert!(result
        .violations
        .contains(&ContractViolation::TerminalCommandNotLastLine));
}

#[test]
fn rejects_unknown_verb() {
    let text = "EVIDENCE:\nRan tests.\n\nkanban-workflow pause --text \"why\"";
    let result = validate_worker_response_contract(text);
    assert!(!result.ok);
    assert!(matches!(
        result.violations.as_slice(),
        [ContractViolation::UnknownVerb { verb }] if verb == "pause"
    ));
}

#[test]
fn rejects_wrong_flag_for_verb() {
    let text = "EVIDENCE:\nRan tests.\n\nkanban-workflow continue --result \"done\"";
    let result = validate_worker_response_contract(text);
    assert!(!result.ok);
    assert!(result
        .violations
        .iter()
        .any(|v| matches!(v, ContractViolation::MissingRequiredFlag { flag, .. } if *flag == "--text")));
}

#[test]
fn rejects_missing_evidence_section() {
    let text = "kanban-workflow continue --text \"done\"";
    let result = validate_worker_response_contract(text);
    assert!(!result.ok);
    assert!(result
        .violations
        .contains(&ContractViolation::MissingEvidenceSection));
}

#[test]
fn rejects_empty_evidence_section() {
    let text = "EVIDENCE:\n\nkanban-workflow continue --text \"done\"";
    let result = validate_worker_response_contract(text);
    assert!(!result.ok);
    assert!(result.violations.contains(&ContractViolation::EmptyEvidenceSection));
}

#[test]
fn rejects_continue_evidence_without_concrete_execution() {
    let text = "EVIDENCE:\nI thought about it carefully.\n\nkanban-workflow continue --text \"done\"";
    let result = validate_worker_response_contract(text);
    assert!(!result.ok);
    assert!(result
        .violations
        .contains(&ContractViolation::EvidenceLacksConcreteExecution));
}

#[test]
fn rejects_continue_evidence_with_explicit_negation() {
    let text = "EVIDENCE:\nRan the suite. Changed files: none.\n\nkanban-workflow continue --text \"done\"";
    let result = validate_worker_response_contract(text);
    assert!(!result.ok);
    assert!(result
        .violations
        .contains(&ContractViolation::EvidenceNegatesExecution));
}

#[test]
fn blocked_does_not_require_concrete_execution_evidence() {
    let text = "EVIDENCE:\nStill waiting on credentials from the platform team.\n\nkanban-workflow blocked --text \"stuck\"";
    let result = validate_worker_response_contract(text);
    assert!(result.ok, "violations: {:?}", result.violations);
}

#[test]
fn rejects_empty_flag_value() {
    let text = "EVIDENCE:\nRan tests.\n\nkanban-workflow continue --text \"   \"";
    let result = validate_worker_response_contract(text);
    assert!(!result.ok);
    assert!(result
        .violations
        .iter()
        .any(|v| matches!(v, ContractViolation::EmptyFlagValue { .. })));
}

#[test]
fn soundness_ok_implies_command_present() {
    let result = validate_worker_response_contract(&valid_continue_response());
    if result.ok {
        assert!(extract_worker_terminal_command(&valid_continue_response()).is_some());
    }
}

#[test]
fn shell_terminators_cut_off_the_tail() {
    let tokens = tokenize_shell_words("kanban-workflow continue --text \"ok\" && rm -rf /");
    assert_eq!(tokens, vec!["kanban-workflow", "continue", "--text", "ok"]);
}

#[test]
fn excerpt_is_capped_at_280_chars() {
    let long_evidence = "ran ".to_string() + &"x".repeat(400);
    let text = format!("EVIDENCE:\n{long_evidence}\n\nkanban-workflow continue --text \"done\"");
    let result = validate_worker_response_contract(&text);
    assert!(result.ok, "violations: {:?}", result.violations);
    assert_eq!(result.evidence.excerpt.chars().count(), 280);
}
