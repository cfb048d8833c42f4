//! Records completed runs into the diary.

use std::sync::Arc;

use crossroads_core::clock::SharedClock;
use crossroads_core::diary::{DiaryEntry, DiaryStore};
use crossroads_core::error::PersistenceError;
use crossroads_engine::domain::engine::RunOutcome;
use tracing::{info, instrument};
use uuid::Uuid;

/// Writes one diary entry per completed run and reads the history back.
#[derive(Clone)]
pub struct DiaryRecorder {
    store: Arc<dyn DiaryStore>,
    clock: SharedClock,
}

impl std::fmt::Debug for DiaryRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiaryRecorder").finish_non_exhaustive()
    }
}

impl DiaryRecorder {
    /// Creates a recorder over `store`, stamping entries with `clock`.
    #[must_use]
    pub fn new(store: Arc<dyn DiaryStore>, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    /// Appends an entry for `outcome` and returns it.
    ///
    /// The entry gets a fresh id and the clock's current time. A failed
    /// append is returned as is; it is neither retried nor rolled back.
    ///
    /// # Errors
    ///
    /// Returns the store's `PersistenceError` if the append fails.
    #[instrument(
        skip(self, outcome),
        fields(
            run_id = %outcome.run_id,
            scenario_id = %outcome.scenario_id,
            archetype_id = %outcome.archetype_id
        )
    )]
    pub async fn record(&self, outcome: &RunOutcome) -> Result<DiaryEntry, PersistenceError> {
        let entry = DiaryEntry {
            id: Uuid::new_v4(),
            date: self.clock.now(),
            scenario_id: outcome.scenario_id.clone(),
            archetype_id: outcome.archetype_id.clone(),
        };

        self.store.append(&entry).await?;

        info!(entry_id = %entry.id, "diary entry recorded");
        Ok(entry)
    }

    /// Every entry, most recent first. Entries with equal dates keep the
    /// later-appended one first.
    ///
    /// # Errors
    ///
    /// Returns the store's `PersistenceError` if the history cannot be read.
    #[instrument(skip(self))]
    pub async fn all_entries(&self) -> Result<Vec<DiaryEntry>, PersistenceError> {
        let mut entries = self.store.load_all().await?;
        entries.reverse();
        // Stable, so equal dates stay in reverse append order.
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use crossroads_core::ids::{ScenarioId, TraitTag};
    use crossroads_engine::domain::tally::TallySnapshot;
    use crossroads_test_support::{
        FailingDiaryStore, FixedClock, RecordingDiaryStore, SteppingClock,
    };

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn outcome(scenario: &str, archetype: &str) -> RunOutcome {
        RunOutcome {
            run_id: Uuid::new_v4(),
            scenario_id: ScenarioId::new(scenario),
            archetype_id: TraitTag::new(archetype),
            completed_at: fixed_now(),
            tally: TallySnapshot::default(),
        }
    }

    fn entry(id: u128, date: DateTime<Utc>) -> DiaryEntry {
        DiaryEntry {
            id: Uuid::from_u128(id),
            date,
            scenario_id: ScenarioId::new("hanoi_easy_1"),
            archetype_id: TraitTag::new("brave"),
        }
    }

    #[tokio::test]
    async fn test_record_appends_entry_stamped_by_clock() {
        // Arrange
        let store = Arc::new(RecordingDiaryStore::new());
        let recorder = DiaryRecorder::new(store.clone(), Arc::new(FixedClock(fixed_now())));

        // Act
        let entry = recorder
            .record(&outcome("hanoi_easy_1", "brave"))
            .await
            .unwrap();

        // Assert
        assert_eq!(entry.date, fixed_now());
        assert_eq!(entry.scenario_id.as_str(), "hanoi_easy_1");
        assert_eq!(entry.archetype_id.as_str(), "brave");
        assert_eq!(store.appended(), vec![entry]);
    }

    #[tokio::test]
    async fn test_record_gives_each_entry_a_fresh_id() {
        let store = Arc::new(RecordingDiaryStore::new());
        let recorder = DiaryRecorder::new(store.clone(), Arc::new(FixedClock(fixed_now())));
        let same = outcome("hanoi_easy_1", "brave");

        let first = recorder.record(&same).await.unwrap();
        let second = recorder.record(&same).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.appended().len(), 2);
    }

    #[tokio::test]
    async fn test_record_returns_store_failure() {
        let recorder = DiaryRecorder::new(
            Arc::new(FailingDiaryStore),
            Arc::new(FixedClock(fixed_now())),
        );

        let result = recorder.record(&outcome("hanoi_easy_1", "brave")).await;

        match result {
            Err(PersistenceError::Unavailable(msg)) => assert_eq!(msg, "connection refused"),
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_all_entries_lists_most_recent_first() {
        // Arrange
        let clock = SteppingClock::new(fixed_now(), Duration::minutes(5));
        let store = Arc::new(RecordingDiaryStore::new());
        let recorder = DiaryRecorder::new(store, Arc::new(clock));
        for archetype in ["brave", "cautious", "calm"] {
            recorder
                .record(&outcome("hanoi_easy_1", archetype))
                .await
                .unwrap();
        }

        // Act
        let entries = recorder.all_entries().await.unwrap();

        // Assert
        let order: Vec<&str> = entries.iter().map(|e| e.archetype_id.as_str()).collect();
        assert_eq!(order, ["calm", "cautious", "brave"]);
        assert!(entries[0].date > entries[1].date);
    }

    #[tokio::test]
    async fn test_all_entries_puts_later_append_first_on_equal_dates() {
        let early = fixed_now() - Duration::days(1);
        let store = Arc::new(RecordingDiaryStore::seeded(vec![
            entry(1, fixed_now()),
            entry(2, early),
            entry(3, fixed_now()),
        ]));
        let recorder = DiaryRecorder::new(store, Arc::new(FixedClock(fixed_now())));

        let entries = recorder.all_entries().await.unwrap();

        let ids: Vec<u128> = entries.iter().map(|e| e.id.as_u128()).collect();
        assert_eq!(ids, [3, 1, 2]);
    }

    #[tokio::test]
    async fn test_all_entries_of_empty_history_is_empty() {
        let recorder = DiaryRecorder::new(
            Arc::new(RecordingDiaryStore::new()),
            Arc::new(FixedClock(fixed_now())),
        );

        assert!(recorder.all_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_entries_returns_store_failure() {
        let recorder = DiaryRecorder::new(
            Arc::new(FailingDiaryStore),
            Arc::new(FixedClock(fixed_now())),
        );

        assert!(matches!(
            recorder.all_entries().await,
            Err(PersistenceError::Unavailable(_))
        ));
    }
}
