// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Black-box CLI specs (§6): exercises the compiled `kanban-workflow`
//! binary's argument surface, exit codes, and config bootstrap errors
//! without reaching a real platform — every scenario here stays on the
//! error paths that don't require live adapter credentials.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("kanban-workflow").expect("binary built by cargo")
}

#[test]
fn help_exits_zero_and_lists_every_subcommand() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("setup"))
        .stdout(predicate::str::contains("autopilot-tick"))
        .stdout(predicate::str::contains("cron-dispatch"));
}

#[test]
fn unknown_subcommand_exits_with_code_two() {
    cmd().arg("not-a-real-command").assert().code(2);
}

#[test]
fn next_without_a_config_fails_with_a_setup_hint() {
    let root = tempfile::tempdir().expect("tempdir");
    cmd()
        .args(["--root", root.path().to_str().expect("utf8 path"), "next"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("run `kanban-workflow setup` first"));
}

#[test]
fn setup_without_the_adapter_specific_required_flag_fails() {
    let root = tempfile::tempdir().expect("tempdir");
    cmd()
        .args([
            "--root",
            root.path().to_str().expect("utf8 path"),
            "setup",
            "--kind",
            "github",
            "--stage-map-json",
            r#"{"Backlog":"todo","Blocked":"blocked","In Progress":"in-progress","In Review":"in-review"}"#,
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--repo"));
}

#[test]
fn setup_rejects_a_stage_map_missing_a_canonical_stage() {
    let root = tempfile::tempdir().expect("tempdir");
    cmd()
        .args([
            "--root",
            root.path().to_str().expect("utf8 path"),
            "setup",
            "--kind",
            "github",
            "--repo",
            "acme/widgets",
            "--stage-map-json",
            r#"{"Backlog":"todo"}"#,
        ])
        .assert()
        .code(1);
}

#[test]
fn setup_rejects_malformed_stage_map_json() {
    let root = tempfile::tempdir().expect("tempdir");
    cmd()
        .args([
            "--root",
            root.path().to_str().expect("utf8 path"),
            "setup",
            "--kind",
            "linear",
            "--team-id",
            "TEAM",
            "--stage-map-json",
            "not json",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--stage-map-json"));
}

#[test]
fn json_output_mode_is_accepted_alongside_the_default_human_mode() {
    let root = tempfile::tempdir().expect("tempdir");
    cmd()
        .args(["--root", root.path().to_str().expect("utf8 path"), "-o", "json", "next"])
        .assert()
        .code(1);
}
