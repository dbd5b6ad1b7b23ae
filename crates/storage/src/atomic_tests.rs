use super::*;
use serde::Deserialize;
use tempfile::tempdir;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Doc {
    value: u32,
}

#[test]
fn write_then_read_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.json");
    write_atomic(&path, &Doc { value: 7 }).unwrap();
    let loaded: Option<Doc> = read_atomic(&path).unwrap();
    assert_eq!(loaded, Some(Doc { value: 7 }));
}

#[test]
fn read_missing_file_returns_none() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let loaded: Option<Doc> = read_atomic(&path).unwrap();
    assert_eq!(loaded, None);
}

#[test]
fn read_corrupt_file_returns_none_instead_of_erroring() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.json");
    fs::write(&path, b"not json").unwrap();
    let loaded: Option<Doc> = read_atomic(&path).unwrap();
    assert_eq!(loaded, None);
}

#[test]
fn write_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested/dir/doc.json");
    write_atomic(&path, &Doc { value: 1 }).unwrap();
    assert!(path.exists());
}

#[test]
fn write_does_not_leave_a_tmp_file_behind() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("doc.json");
    write_atomic(&path, &Doc { value: 1 }).unwrap();
    assert!(!path.with_extension("tmp").exists());
}
