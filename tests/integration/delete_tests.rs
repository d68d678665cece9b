use clap::Parser;
use dupfind::actions::DeleteListError;
use dupfind::cli::Cli;
use dupfind::error::ExitCode;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn delete(list: &Path) -> anyhow::Result<ExitCode> {
    let argv = [OsStr::new("dupfind"), OsStr::new("delete"), list.as_os_str()];
    dupfind::run_app(Cli::try_parse_from(argv).unwrap())
}

fn write_list(dir: &TempDir, body: &serde_json::Value) -> PathBuf {
    let path = dir.path().join("remove.json");
    fs::write(&path, serde_json::to_string(body).unwrap()).unwrap();
    path
}

fn make_files(dir: &TempDir, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.path().join(name);
            fs::write(&path, name.as_bytes()).unwrap();
            path
        })
        .collect()
}

#[test]
fn test_delete_all_listed_files() {
    let dir = tempdir().unwrap();
    let files = make_files(&dir, &["a.txt", "b.txt", "keep.txt"]);
    let list = write_list(
        &dir,
        &serde_json::json!({ "items": [files[0], files[1]] }),
    );

    let code = delete(&list).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(!files[0].exists());
    assert!(!files[1].exists());
    assert!(files[2].exists());
}

#[test]
fn test_empty_list_is_success() {
    let dir = tempdir().unwrap();
    let list = write_list(&dir, &serde_json::json!({ "items": [] }));
    assert_eq!(delete(&list).unwrap(), ExitCode::Success);
}

#[test]
fn test_missing_item_is_partial_success() {
    let dir = tempdir().unwrap();
    let files = make_files(&dir, &["a.txt", "c.txt"]);
    let ghost = dir.path().join("ghost.txt");
    let list = write_list(
        &dir,
        &serde_json::json!({ "items": [files[0], ghost, files[1]] }),
    );

    let code = delete(&list).unwrap();

    // A failure in the middle does not stop later removals.
    assert_eq!(code, ExitCode::PartialSuccess);
    assert!(!files[0].exists());
    assert!(!files[1].exists());
}

#[test]
fn test_directory_item_is_not_removed() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    let list = write_list(&dir, &serde_json::json!({ "items": [sub] }));

    assert_eq!(delete(&list).unwrap(), ExitCode::PartialSuccess);
    assert!(sub.is_dir());
}

#[test]
fn test_non_string_item_removes_nothing() {
    let dir = tempdir().unwrap();
    let files = make_files(&dir, &["a.txt", "b.txt"]);
    let list = write_list(
        &dir,
        &serde_json::json!({ "items": [files[0], 17, files[1]] }),
    );

    let err = delete(&list).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DeleteListError>(),
        Some(DeleteListError::NotString { index: 1, .. })
    ));
    assert_eq!(ExitCode::for_error(&err), ExitCode::InvalidInput);
    assert!(files[0].exists());
    assert!(files[1].exists());
}

#[test]
fn test_missing_items_key_rejected() {
    let dir = tempdir().unwrap();
    let files = make_files(&dir, &["a.txt"]);
    let list = write_list(&dir, &serde_json::json!({ "paths": [files[0]] }));

    let err = delete(&list).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DeleteListError>(),
        Some(DeleteListError::MissingItems)
    ));
    assert!(files[0].exists());
}

#[test]
fn test_items_not_array_rejected() {
    let dir = tempdir().unwrap();
    let list = write_list(&dir, &serde_json::json!({ "items": "a.txt" }));

    let err = delete(&list).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DeleteListError>(),
        Some(DeleteListError::NotArray)
    ));
}

#[test]
fn test_invalid_json_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"items\": [").unwrap();

    let err = delete(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DeleteListError>(),
        Some(DeleteListError::Parse(_))
    ));
    assert_eq!(ExitCode::for_error(&err), ExitCode::InvalidInput);
}

#[test]
fn test_missing_list_file_rejected() {
    let dir = tempdir().unwrap();
    let err = delete(&dir.path().join("absent.json")).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DeleteListError>(),
        Some(DeleteListError::Read { .. })
    ));
    assert_eq!(ExitCode::for_error(&err), ExitCode::InvalidInput);
}

#[test]
fn test_scan_then_delete_round_trip() {
    let data = tempdir().unwrap();
    let out = tempdir().unwrap();
    let files = make_files(&data, &["one", "two"]);
    fs::write(&files[1], b"one").unwrap();

    let report_path = out.path().join("report.json");
    let scan = Cli::try_parse_from([
        OsStr::new("dupfind"),
        OsStr::new("scan"),
        data.path().as_os_str(),
        report_path.as_os_str(),
        OsStr::new("--no-progress"),
    ])
    .unwrap();
    assert_eq!(dupfind::run_app(scan).unwrap(), ExitCode::Success);

    // Keep the first member of each group, remove the rest.
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    let doomed: Vec<&str> = report["items"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|group| group.as_array().unwrap().iter().skip(1))
        .map(|entry| entry["real_path"].as_str().unwrap())
        .collect();
    assert_eq!(doomed.len(), 1);

    let list = write_list(&out, &serde_json::json!({ "items": doomed }));
    assert_eq!(delete(&list).unwrap(), ExitCode::Success);

    assert!(files[0].exists());
    assert!(!files[1].exists());
}
