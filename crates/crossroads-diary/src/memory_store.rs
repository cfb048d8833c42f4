//! In-process diary store.

use async_trait::async_trait;
use crossroads_core::diary::{DiaryEntry, DiaryStore};
use crossroads_core::error::PersistenceError;
use tokio::sync::Mutex;

/// Keeps the diary in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryDiaryStore {
    entries: Mutex<Vec<DiaryEntry>>,
}

impl InMemoryDiaryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DiaryStore for InMemoryDiaryStore {
    async fn append(&self, entry: &DiaryEntry) -> Result<(), PersistenceError> {
        self.entries.lock().await.push(entry.clone());
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<DiaryEntry>, PersistenceError> {
        Ok(self.entries.lock().await.clone())
    }
}
