//! Test stores — mock `DiaryStore` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use crossroads_core::diary::{DiaryEntry, DiaryStore};
use crossroads_core::error::PersistenceError;

/// A diary store that keeps every appended entry in memory and returns them
/// from `load_all`. Optionally seeded with entries that were "already there".
#[derive(Debug, Default)]
pub struct RecordingDiaryStore {
    entries: Mutex<Vec<DiaryEntry>>,
    appended: Mutex<Vec<DiaryEntry>>,
}

impl RecordingDiaryStore {
    /// Creates an empty recording store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose `load_all` starts with `existing`. Seeded
    /// entries are not reported by [`Self::appended`].
    #[must_use]
    pub fn seeded(existing: Vec<DiaryEntry>) -> Self {
        Self {
            entries: Mutex::new(existing),
            appended: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of the entries appended through the store.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended(&self) -> Vec<DiaryEntry> {
        self.appended.lock().unwrap().clone()
    }
}

#[async_trait]
impl DiaryStore for RecordingDiaryStore {
    async fn append(&self, entry: &DiaryEntry) -> Result<(), PersistenceError> {
        self.entries.lock().unwrap().push(entry.clone());
        self.appended.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<DiaryEntry>, PersistenceError> {
        Ok(self.entries.lock().unwrap().clone())
    }
}

/// A diary store that holds nothing and silently discards appends.
#[derive(Debug)]
pub struct EmptyDiaryStore;

#[async_trait]
impl DiaryStore for EmptyDiaryStore {
    async fn append(&self, _entry: &DiaryEntry) -> Result<(), PersistenceError> {
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<DiaryEntry>, PersistenceError> {
        Ok(vec![])
    }
}

/// A diary store whose storage is always unavailable. Useful for testing
/// that a failed write never loses the completed run.
#[derive(Debug)]
pub struct FailingDiaryStore;

#[async_trait]
impl DiaryStore for FailingDiaryStore {
    async fn append(&self, _entry: &DiaryEntry) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("connection refused".into()))
    }

    async fn load_all(&self) -> Result<Vec<DiaryEntry>, PersistenceError> {
        Err(PersistenceError::Unavailable("connection refused".into()))
    }
}
