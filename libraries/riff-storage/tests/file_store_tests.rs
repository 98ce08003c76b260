//! Integration tests for the file-backed store.

use riff_core::{keys, KeyValueStore, Storage};
use riff_storage::{FileStore, StorageError};
use std::sync::Arc;
use tempfile::TempDir;

fn open_store() -> (TempDir, FileStore) {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path().join("state")).unwrap();
    (dir, store)
}

#[test]
fn creates_missing_directory() {
    let (dir, store) = open_store();
    assert!(dir.path().join("state").is_dir());
    assert_eq!(store.dir(), dir.path().join("state"));
}

#[test]
fn values_survive_reopen() {
    let (dir, store) = open_store();
    store.set(keys::PLAYER_STATE, r#"{"volume":0.5}"#).unwrap();
    drop(store);

    let reopened = FileStore::open(dir.path().join("state")).unwrap();
    assert_eq!(
        reopened.get(keys::PLAYER_STATE).unwrap().as_deref(),
        Some(r#"{"volume":0.5}"#)
    );
}

#[test]
fn missing_key_reads_as_none() {
    let (_dir, store) = open_store();
    assert!(store.get("nothing_here").unwrap().is_none());
    store.remove("nothing_here").unwrap();
}

#[test]
fn overwrite_leaves_no_temp_files() {
    let (dir, store) = open_store();
    store.set("library_sort_by", "\"recents\"").unwrap();
    store.set("library_sort_by", "\"alphabetical\"").unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path().join("state"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["library_sort_by.json".to_string()]);
}

#[test]
fn rejects_path_like_keys() {
    let (_dir, store) = open_store();
    for key in ["", "../escape", "a/b", ".hidden"] {
        let err = store.set(key, "1").unwrap_err();
        assert!(
            err.to_string().contains("Invalid storage key"),
            "unexpected error for {key:?}: {err}"
        );
    }
}

#[test]
fn invalid_key_error_names_the_key() {
    let err = StorageError::InvalidKey("a/b".into());
    assert_eq!(err.to_string(), "Invalid storage key: \"a/b\"");
}

#[test]
fn works_behind_json_storage() {
    let (_dir, store) = open_store();
    let storage = Storage::new(Arc::new(store));

    storage.set(keys::PINNED_ITEMS, &vec!["p1", "p2"]);
    let pinned: Vec<String> = storage.get(keys::PINNED_ITEMS).unwrap();
    assert_eq!(pinned, vec!["p1", "p2"]);
}
