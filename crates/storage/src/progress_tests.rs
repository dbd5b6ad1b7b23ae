use super::*;
use tempfile::tempdir;

fn instant(offset_secs: i64) -> DateTime<Utc> {
    "2026-07-27T12:00:00Z".parse::<DateTime<Utc>>().unwrap() + chrono::Duration::seconds(offset_secs)
}

#[test]
fn round_trips_through_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("progress.json");

    let mut state = ProgressPosterState::new();
    state.record("A", instant(0));
    state.save(&path).unwrap();

    let loaded = ProgressPosterState::load(&path).unwrap();
    assert_eq!(loaded.last_posted_at("A"), Some(instant(0)));
}

#[test]
fn missing_file_loads_as_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let state = ProgressPosterState::load(&path).unwrap();
    assert_eq!(state.last_posted_at("A"), None);
}

#[test]
fn retain_only_prunes_tickets_no_longer_in_progress() {
    let mut state = ProgressPosterState::new();
    state.record("A", instant(0));
    state.record("B", instant(0));

    state.retain_only(&["A".to_string()]);

    assert_eq!(state.last_posted_at("A"), Some(instant(0)));
    assert_eq!(state.last_posted_at("B"), None);
}
