//! Shared player state.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crossroads_content::application::catalog::ScenarioCatalog;
use crossroads_content::application::decode::{Format, load_archetypes};
use crossroads_content::domain::archetype::ArchetypeRegistry;
use crossroads_core::clock::{SharedClock, SystemClock};
use crossroads_core::diary::DiaryStore;
use crossroads_core::error::{ContentError, PersistenceError};
use crossroads_diary::application::aggregator::{CollectionSummary, summarize};
use crossroads_diary::application::recorder::DiaryRecorder;
use crossroads_diary::jsonl_store::JsonlDiaryStore;
use crossroads_engine::domain::engine::{ScenarioEngine, TimeoutPolicy};
use tracing::info;

use crate::config::PlayerConfig;
use crate::error::AppError;
use crate::session::PlaySession;

/// Loaded content plus the diary, shared by every session of the process.
#[derive(Clone)]
pub struct AppState {
    /// Scenarios by key.
    pub catalog: Arc<ScenarioCatalog>,
    /// Every known archetype.
    pub archetypes: Arc<ArchetypeRegistry>,
    /// Writes and reads the diary.
    pub recorder: DiaryRecorder,
    /// Timestamps completions and diary entries.
    pub clock: SharedClock,
    /// Applied to every new session.
    pub timeout_policy: TimeoutPolicy,
    /// Countdown period for every new session.
    pub tick_period: Duration,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("scenarios", &self.catalog.len())
            .field("archetypes", &self.archetypes.len())
            .field("timeout_policy", &self.timeout_policy)
            .field("tick_period", &self.tick_period)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new player state.
    #[must_use]
    pub fn new(
        catalog: ScenarioCatalog,
        archetypes: ArchetypeRegistry,
        store: Arc<dyn DiaryStore>,
        clock: SharedClock,
        config: &PlayerConfig,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            archetypes: Arc::new(archetypes),
            recorder: DiaryRecorder::new(store, Arc::clone(&clock)),
            clock,
            timeout_policy: config.timeout_policy,
            tick_period: config.tick_period,
        }
    }

    /// Loads content and opens the diary named by `config`, using the system
    /// clock.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Content` if the archetypes or any scenario fail to
    /// load, and `AppError::Config` if the archetype document's extension is
    /// neither JSON nor YAML.
    pub async fn load(config: &PlayerConfig) -> Result<Self, AppError> {
        let archetypes = read_archetypes(&config.archetypes_path).await?;
        let catalog = ScenarioCatalog::load_dir(&config.scenario_dir)?;
        let store = Arc::new(JsonlDiaryStore::new(&config.diary_path));

        info!(
            scenarios = catalog.len(),
            archetypes = archetypes.len(),
            diary = %config.diary_path.display(),
            "player state loaded"
        );

        Ok(Self::new(
            catalog,
            archetypes,
            store,
            Arc::new(SystemClock),
            config,
        ))
    }

    /// Opens a session on the scenario stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::UnknownScenario` if no scenario has that key.
    pub fn session(&self, key: &str) -> Result<PlaySession, AppError> {
        let graph = self
            .catalog
            .get(key)
            .ok_or_else(|| AppError::UnknownScenario(key.to_owned()))?;
        let engine = ScenarioEngine::new(
            graph,
            Arc::clone(&self.archetypes),
            Arc::clone(&self.clock),
        )
        .with_timeout_policy(self.timeout_policy);
        Ok(PlaySession::new(
            engine,
            self.recorder.clone(),
            self.tick_period,
        ))
    }

    /// Summarizes the whole diary over the known archetypes.
    ///
    /// # Errors
    ///
    /// Returns the diary's `PersistenceError` if the history cannot be read.
    pub async fn collection_summary(&self) -> Result<CollectionSummary, PersistenceError> {
        let entries = self.recorder.all_entries().await?;
        Ok(summarize(&entries, &self.archetypes))
    }
}

async fn read_archetypes(path: &Path) -> Result<ArchetypeRegistry, AppError> {
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(Format::from_extension)
        .ok_or_else(|| {
            AppError::Config(format!(
                "archetype document {} must be .json, .yaml or .yml",
                path.display()
            ))
        })?;
    let source = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(load_archetypes(&source, format)?)
}
