use super::*;
use kwf_core::test_support::fixed_instant;
use tempfile::tempdir;

#[test]
fn acquires_when_absent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("lock.json");
    let guard = try_acquire_lock(&path, fixed_instant(), DEFAULT_TTL_SECS, 100).unwrap();
    assert!(path.exists());
    guard.release();
    assert!(!path.exists());
}

#[test]
fn second_acquire_without_release_fails_held() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lock.json");
    let _guard = try_acquire_lock(&path, fixed_instant(), DEFAULT_TTL_SECS, 100).unwrap();

    let err = try_acquire_lock(&path, fixed_instant(), DEFAULT_TTL_SECS, 200).unwrap_err();
    match err {
        LockError::Held { holder_pid, .. } => assert_eq!(holder_pid, 100),
        other => panic!("expected Held, got {other:?}"),
    }
}

#[test]
fn stale_lock_is_reclaimed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lock.json");
    let first = try_acquire_lock(&path, fixed_instant(), DEFAULT_TTL_SECS, 100).unwrap();
    std::mem::forget(first); // simulate a crashed holder that never released

    let later = fixed_instant() + chrono::Duration::seconds(DEFAULT_TTL_SECS + 1);
    let guard = try_acquire_lock(&path, later, DEFAULT_TTL_SECS, 200).unwrap();
    guard.release();
}

#[test]
fn drop_releases_without_explicit_release_call() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lock.json");
    {
        let _guard = try_acquire_lock(&path, fixed_instant(), DEFAULT_TTL_SECS, 100).unwrap();
        assert!(path.exists());
    }
    assert!(!path.exists());
}
