//! One player's pass through one scenario.
//!
//! A `PlaySession` owns the engine, keeps its countdown running while a
//! question is open, and records the outcome once the run completes.
//! Recording never gates completion: a diary failure is reported alongside
//! the finished run.

use std::sync::Arc;
use std::time::Duration;

use crossroads_core::diary::DiaryEntry;
use crossroads_core::error::{EngineError, PersistenceError};
use crossroads_core::ids::{OptionId, QuestionId};
use crossroads_diary::application::recorder::DiaryRecorder;
use crossroads_engine::application::countdown::{CountdownHandle, SharedEngine, spawn_countdown};
use crossroads_engine::domain::engine::{Completion, RunTicket, ScenarioEngine, Transition};
use crossroads_engine::domain::events::RunEvent;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// What happened to the diary when a run completed.
#[derive(Debug)]
pub enum DiaryStatus {
    /// The outcome was written.
    Recorded(DiaryEntry),
    /// The run resolved to no archetype, so there was nothing to write.
    NotRecorded,
    /// The write failed. The run is still complete.
    Failed(PersistenceError),
}

/// A completed run together with its diary status.
#[derive(Debug)]
pub struct CompletionReport {
    /// How the run ended.
    pub completion: Completion,
    /// What happened to the diary.
    pub diary: DiaryStatus,
}

/// Result of a selection made through the session.
#[derive(Debug)]
pub enum SessionStep {
    /// The next question is open.
    Advanced {
        /// The new question.
        question_id: QuestionId,
        /// Its time limit.
        remaining: u32,
    },
    /// The run ended.
    Completed(CompletionReport),
}

/// Drives one engine on behalf of a presentation layer.
pub struct PlaySession {
    engine: SharedEngine,
    recorder: DiaryRecorder,
    tick_period: Duration,
    countdown: Option<CountdownHandle>,
    reported_run: Option<Uuid>,
}

impl std::fmt::Debug for PlaySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaySession")
            .field("tick_period", &self.tick_period)
            .field("countdown_running", &self.countdown.is_some())
            .field("reported_run", &self.reported_run)
            .finish_non_exhaustive()
    }
}

impl PlaySession {
    /// Wraps `engine`. No countdown runs until [`Self::start`].
    #[must_use]
    pub fn new(engine: ScenarioEngine, recorder: DiaryRecorder, tick_period: Duration) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            recorder,
            tick_period,
            countdown: None,
            reported_run: None,
        }
    }

    /// The shared engine, for rendering its state.
    #[must_use]
    pub fn engine(&self) -> SharedEngine {
        Arc::clone(&self.engine)
    }

    /// Shows the scenario intro.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidTransition` while a run is in progress or
    /// finished.
    pub async fn brief(&self) -> Result<(), EngineError> {
        self.engine.lock().await.brief()
    }

    /// Starts a run and its countdown.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidTransition` unless the engine is idle or
    /// briefing.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<RunTicket, EngineError> {
        let ticket = self.engine.lock().await.start()?;
        self.restart_countdown(ticket);
        Ok(ticket)
    }

    /// Answers the current question. On completion the outcome is recorded
    /// before returning.
    ///
    /// # Errors
    ///
    /// Returns the engine's error when the selection is rejected. Nothing
    /// changes in that case.
    #[instrument(skip(self, option_id), fields(option_id = %option_id))]
    pub async fn select(&mut self, option_id: &OptionId) -> Result<SessionStep, EngineError> {
        let (transition, ticket) = {
            let mut engine = self.engine.lock().await;
            let transition = engine.select_option(option_id)?;
            (transition, engine.ticket())
        };

        match transition {
            Transition::Advanced {
                question_id,
                remaining,
            } => {
                // Give the new question full periods from now.
                self.restart_countdown(ticket);
                Ok(SessionStep::Advanced {
                    question_id,
                    remaining,
                })
            }
            Transition::Completed(completion) => {
                Ok(SessionStep::Completed(self.report(completion).await))
            }
        }
    }

    /// Reports a run the countdown completed on the player's behalf.
    ///
    /// Returns `None` while the run is still going, and for a run that was
    /// already reported.
    pub async fn poll_completion(&mut self) -> Option<CompletionReport> {
        let completion = self.engine.lock().await.completion().cloned()?;
        if self.reported_run == Some(completion.run_id()) {
            return None;
        }
        Some(self.report(completion).await)
    }

    /// Abandons the run (the player retreats) and stops its countdown.
    ///
    /// A run the countdown already completed but nobody polled is recorded
    /// first, and its report is returned.
    #[instrument(skip(self))]
    pub async fn retreat(&mut self) -> Option<CompletionReport> {
        self.countdown = None;
        let pending = self.poll_completion().await;
        self.engine.lock().await.abandon();
        pending
    }

    /// Hands off the run journal accumulated so far.
    pub async fn take_journal(&self) -> Vec<RunEvent> {
        self.engine.lock().await.take_uncommitted_events()
    }

    fn restart_countdown(&mut self, ticket: RunTicket) {
        // Dropping the old handle stops its task.
        self.countdown = Some(spawn_countdown(
            Arc::clone(&self.engine),
            ticket,
            self.tick_period,
        ));
    }

    async fn report(&mut self, completion: Completion) -> CompletionReport {
        self.countdown = None;
        self.reported_run = Some(completion.run_id());

        let diary = match completion.outcome() {
            Some(outcome) => match self.recorder.record(outcome).await {
                Ok(entry) => DiaryStatus::Recorded(entry),
                Err(error) => {
                    warn!(
                        run_id = %outcome.run_id,
                        error = %error,
                        "run completed but could not be recorded"
                    );
                    DiaryStatus::Failed(error)
                }
            },
            None => {
                info!(run_id = %completion.run_id(), "run completed without an archetype");
                DiaryStatus::NotRecorded
            }
        };

        CompletionReport { completion, diary }
    }
}
