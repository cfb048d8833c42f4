//! JSON Lines file diary store.
//!
//! One serialized [`DiaryEntry`] per line, appended in record order. The file
//! is created on first append; a missing file reads as an empty diary.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use crossroads_core::diary::{DiaryEntry, DiaryStore};
use crossroads_core::error::PersistenceError;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

/// File-backed, append-only diary store.
#[derive(Debug)]
pub struct JsonlDiaryStore {
    path: PathBuf,
    // Held across every read and write of the file.
    lock: Mutex<()>,
}

impl JsonlDiaryStore {
    /// Creates a store over the file at `path`. Nothing is touched until the
    /// first append or load.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn decode(contents: &str) -> Result<Vec<DiaryEntry>, PersistenceError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| PersistenceError::Corrupt {
                line: index + 1,
                detail: e.to_string(),
            })
        })
        .collect()
}

#[async_trait]
impl DiaryStore for JsonlDiaryStore {
    async fn append(&self, entry: &DiaryEntry) -> Result<(), PersistenceError> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let _guard = self.lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(path = %self.path.display(), entry_id = %entry.id, "diary entry appended");
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<DiaryEntry>, PersistenceError> {
        let _guard = self.lock.lock().await;
        match fs::read_to_string(&self.path).await {
            Ok(contents) => decode(&contents),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}
