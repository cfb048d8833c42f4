//! Diary storage abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::ids::{ScenarioId, TraitTag};

/// Durable record of one completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryEntry {
    /// Unique entry identifier.
    pub id: Uuid,
    /// When the entry was recorded.
    pub date: DateTime<Utc>,
    /// The scenario that was played.
    pub scenario_id: ScenarioId,
    /// The archetype the run resolved to.
    pub archetype_id: TraitTag,
}

/// Append-only store for diary entries.
///
/// Implementations must serialize individual appends so that concurrent
/// writers never lose an entry. Entries are never updated or deleted.
#[async_trait]
pub trait DiaryStore: Send + Sync {
    /// Appends one entry.
    async fn append(&self, entry: &DiaryEntry) -> Result<(), PersistenceError>;

    /// Loads every stored entry in append order.
    async fn load_all(&self) -> Result<Vec<DiaryEntry>, PersistenceError>;
}
