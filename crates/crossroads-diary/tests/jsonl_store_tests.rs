//! Integration tests for `JsonlDiaryStore`.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use crossroads_core::diary::{DiaryEntry, DiaryStore};
use crossroads_core::error::PersistenceError;
use crossroads_core::ids::{ScenarioId, TraitTag};
use crossroads_diary::jsonl_store::JsonlDiaryStore;
use uuid::Uuid;

/// Helper to build a `DiaryEntry` with sensible defaults.
fn make_entry(archetype: &str) -> DiaryEntry {
    DiaryEntry {
        id: Uuid::new_v4(),
        date: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        scenario_id: ScenarioId::new("hanoi_easy_1"),
        archetype_id: TraitTag::new(archetype),
    }
}

// --- load_all ---

#[tokio::test]
async fn test_load_all_of_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonlDiaryStore::new(dir.path().join("diary.jsonl"));

    let entries = store.load_all().await.unwrap();

    assert!(entries.is_empty());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_load_all_reports_corrupt_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diary.jsonl");
    let store = JsonlDiaryStore::new(&path);
    store.append(&make_entry("brave")).await.unwrap();
    let mut contents = std::fs::read_to_string(&path).unwrap();
    contents.push_str("not json\n");
    std::fs::write(&path, contents).unwrap();

    let result = store.load_all().await;

    match result {
        Err(PersistenceError::Corrupt { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected Corrupt, got {other:?}"),
    }
}

// --- append + load_all ---

#[tokio::test]
async fn test_appended_entries_survive_a_new_store_instance() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diary.jsonl");
    let first = make_entry("brave");
    let second = make_entry("cautious");

    // Act
    {
        let store = JsonlDiaryStore::new(&path);
        store.append(&first).await.unwrap();
        store.append(&second).await.unwrap();
    }
    let reopened = JsonlDiaryStore::new(&path);
    let loaded = reopened.load_all().await.unwrap();

    // Assert
    assert_eq!(loaded, vec![first, second]);
    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(raw.lines().count(), 2);
}

#[tokio::test]
async fn test_entry_is_written_with_external_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diary.jsonl");
    let store = JsonlDiaryStore::new(&path);
    let entry = make_entry("brave");

    store.append(&entry).await.unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(raw.trim_end()).unwrap();
    assert_eq!(json["id"], entry.id.to_string());
    assert_eq!(json["date"], "2026-01-15T10:00:00Z");
    assert_eq!(json["scenario_id"], "hanoi_easy_1");
    assert_eq!(json["archetype_id"], "brave");
}

#[tokio::test]
async fn test_append_to_unwritable_location_fails_with_io() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonlDiaryStore::new(dir.path().join("missing").join("diary.jsonl"));

    let result = store.append(&make_entry("brave")).await;

    assert!(matches!(result, Err(PersistenceError::Io(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_lose_no_entry() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonlDiaryStore::new(dir.path().join("diary.jsonl")));

    // Act
    let tasks: Vec<_> = (0..24)
        .map(|i| {
            let store = Arc::clone(&store);
            let archetype = if i % 2 == 0 { "brave" } else { "cautious" };
            tokio::spawn(async move { store.append(&make_entry(archetype)).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    // Assert
    let loaded = store.load_all().await.unwrap();
    assert_eq!(loaded.len(), 24);
    assert_eq!(
        loaded
            .iter()
            .filter(|e| e.archetype_id.as_str() == "brave")
            .count(),
        12
    );
}
