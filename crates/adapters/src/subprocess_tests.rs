use super::*;

#[tokio::test]
async fn missing_binary_surfaces_not_found() {
    let cmd = Command::new("definitely-not-a-real-binary-kwf");
    let err = run_with_timeout(cmd, Duration::from_secs(5), "probe").await.unwrap_err();
    assert!(matches!(err, AdapterCliError::NotFound { .. }));
}

#[tokio::test]
async fn timeout_is_surfaced_distinctly() {
    let mut cmd = Command::new("sleep");
    cmd.arg("5");
    let err = run_with_timeout(cmd, Duration::from_millis(10), "sleep").await.unwrap_err();
    assert!(matches!(err, AdapterCliError::Timeout { .. }));
}

#[test]
fn require_success_passes_through_zero_exit() {
    let output = std::process::Command::new("true").output().unwrap();
    assert!(require_success(output, "true").is_ok());
}

#[test]
fn require_success_surfaces_stderr_on_nonzero_exit() {
    let output = std::process::Command::new("false").output().unwrap();
    let err = require_success(output, "false").unwrap_err();
    assert!(matches!(err, AdapterCliError::NonZeroExit { .. }));
}
