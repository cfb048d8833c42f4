//! The scenario engine: one run's state machine.
//!
//! ```text
//! Idle ─brief─▶ Briefing ─start─▶ Active(q, t) ─select─▶ Active(q', t')
//! Idle ─start─▶ Active(q, t)
//! Active(q, t) ─select (terminal option)─▶ Completed
//! any state ─abandon─▶ Idle
//! ```
//!
//! Every transition is atomic: an operation either fully applies (state,
//! tally and journal) or returns an error and changes nothing.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use crossroads_content::domain::archetype::ArchetypeRegistry;
use crossroads_content::domain::graph::ScenarioGraph;
use crossroads_content::domain::scenario::{AnswerOption, Question};
use crossroads_core::clock::SharedClock;
use crossroads_core::error::{EngineError, ResolutionError};
use crossroads_core::event::EventMetadata;
use crossroads_core::ids::{OptionId, QuestionId, ScenarioId, TraitTag};
use tracing::{debug, info};
use uuid::Uuid;

use super::events::{
    OptionSelected, QuestionExpired, RunAbandoned, RunCompleted, RunEvent, RunEventKind,
    RunStarted,
};
use super::resolver::resolve_dominant;
use super::tally::{TallySnapshot, TraitTally};

/// What happens when a question's countdown reaches zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// The question stays open and the timer stays at zero until the player
    /// answers. The countdown is informational.
    #[default]
    AwaitSelection,
    /// The question's first option is chosen on the player's behalf.
    SelectFirstOption,
}

impl FromStr for TimeoutPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "await" | "await-selection" => Ok(Self::AwaitSelection),
            "first-option" | "select-first-option" => Ok(Self::SelectFirstOption),
            other => Err(format!(
                "unknown timeout policy {other:?}, expected \"await\" or \"first-option\""
            )),
        }
    }
}

/// Identifies one run. Ticks carrying the ticket of an earlier run are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunTicket(u64);

/// Result of a run that resolved to an archetype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// The run that produced this outcome.
    pub run_id: Uuid,
    /// The scenario that was played.
    pub scenario_id: ScenarioId,
    /// The resolved archetype.
    pub archetype_id: TraitTag,
    /// When the run reached its terminal option.
    pub completed_at: DateTime<Utc>,
    /// The final tally.
    pub tally: TallySnapshot,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The run resolved to a registered archetype.
    Resolved(RunOutcome),
    /// The run finished but no archetype could be determined. Presentation
    /// decides what to show instead.
    Unresolved {
        /// The run that finished.
        run_id: Uuid,
        /// The scenario that was played.
        scenario_id: ScenarioId,
        /// When the run reached its terminal option.
        completed_at: DateTime<Utc>,
        /// The final tally.
        tally: TallySnapshot,
        /// Why resolution failed.
        error: ResolutionError,
    },
}

impl Completion {
    /// The outcome, if the run resolved.
    #[must_use]
    pub fn outcome(&self) -> Option<&RunOutcome> {
        match self {
            Self::Resolved(outcome) => Some(outcome),
            Self::Unresolved { .. } => None,
        }
    }

    /// The run that finished.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        match self {
            Self::Resolved(outcome) => outcome.run_id,
            Self::Unresolved { run_id, .. } => *run_id,
        }
    }

    /// The final tally.
    #[must_use]
    pub fn tally(&self) -> &TallySnapshot {
        match self {
            Self::Resolved(outcome) => &outcome.tally,
            Self::Unresolved { tally, .. } => tally,
        }
    }
}

/// Where the engine is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    /// No run in progress.
    Idle,
    /// The scenario intro is being shown.
    Briefing,
    /// A question is being asked.
    Active {
        /// The question being asked.
        question_id: QuestionId,
        /// Ticks left before the question expires.
        remaining: u32,
    },
    /// The run has ended.
    Completed(Completion),
}

impl EngineState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Briefing => "briefing",
            Self::Active { .. } => "active",
            Self::Completed(_) => "completed",
        }
    }
}

/// Result of an accepted selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The run moved on to another question.
    Advanced {
        /// The new question.
        question_id: QuestionId,
        /// Its time limit.
        remaining: u32,
    },
    /// The run ended.
    Completed(Completion),
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Time was taken off the current question.
    Counting {
        /// Ticks left.
        remaining: u32,
    },
    /// The current question is out of time and waiting for an answer.
    Expired,
    /// The question ran out of time and the timeout policy answered it.
    TimedOut(Transition),
    /// The engine is not asking a question; nothing changed.
    Ignored,
    /// The ticket belongs to an earlier run; nothing changed.
    Stale,
}

/// Owns one run through one scenario.
///
/// The engine is single-threaded by construction: every mutating operation
/// takes `&mut self`. Share it behind a mutex when a timer task and an input
/// source both drive it.
pub struct ScenarioEngine {
    graph: Arc<ScenarioGraph>,
    archetypes: Arc<ArchetypeRegistry>,
    clock: SharedClock,
    policy: TimeoutPolicy,
    state: EngineState,
    tally: TraitTally,
    generation: u64,
    run_id: Uuid,
    next_sequence: i64,
    uncommitted_events: Vec<RunEvent>,
}

impl std::fmt::Debug for ScenarioEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioEngine")
            .field("scenario_id", self.graph.id())
            .field("policy", &self.policy)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("run_id", &self.run_id)
            .finish_non_exhaustive()
    }
}

impl ScenarioEngine {
    /// Creates an idle engine for `graph`, using the default timeout policy.
    #[must_use]
    pub fn new(
        graph: Arc<ScenarioGraph>,
        archetypes: Arc<ArchetypeRegistry>,
        clock: SharedClock,
    ) -> Self {
        Self {
            graph,
            archetypes,
            clock,
            policy: TimeoutPolicy::default(),
            state: EngineState::Idle,
            tally: TraitTally::new(),
            generation: 0,
            run_id: Uuid::nil(),
            next_sequence: 1,
            uncommitted_events: Vec::new(),
        }
    }

    /// Replaces the timeout policy.
    #[must_use]
    pub fn with_timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn invalid(&self, operation: &'static str) -> EngineError {
        EngineError::InvalidTransition {
            operation,
            state: self.state.name(),
        }
    }

    fn record(&mut self, kind: RunEventKind) {
        let metadata = EventMetadata::caused_by(
            kind.event_type(),
            self.run_id,
            self.next_sequence,
            self.run_id,
            self.clock.now(),
        );
        self.next_sequence += 1;
        self.uncommitted_events.push(RunEvent { metadata, kind });
    }

    /// Shows the scenario intro before the run starts.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidTransition` while a run is active or
    /// completed. Calling it again while briefing does nothing.
    pub fn brief(&mut self) -> Result<(), EngineError> {
        match self.state {
            EngineState::Idle => {
                self.state = EngineState::Briefing;
                debug!(scenario_id = %self.graph.id(), "briefing");
                Ok(())
            }
            EngineState::Briefing => Ok(()),
            _ => Err(self.invalid("brief")),
        }
    }

    /// Starts a run at the scenario's start question with an empty tally.
    ///
    /// Any ticket handed out before is invalidated.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidTransition` unless the engine is idle or
    /// briefing.
    pub fn start(&mut self) -> Result<RunTicket, EngineError> {
        if !matches!(self.state, EngineState::Idle | EngineState::Briefing) {
            return Err(self.invalid("start"));
        }

        let graph = Arc::clone(&self.graph);
        let first = graph.start_question();

        self.generation += 1;
        self.run_id = Uuid::new_v4();
        self.next_sequence = 1;
        self.tally = TraitTally::new();
        self.state = EngineState::Active {
            question_id: first.id.clone(),
            remaining: first.time_limit,
        };
        self.record(RunEventKind::RunStarted(RunStarted {
            scenario_id: graph.id().clone(),
            question_id: first.id.clone(),
        }));

        info!(
            scenario_id = %graph.id(),
            run_id = %self.run_id,
            question_id = %first.id,
            "run started"
        );
        Ok(self.ticket())
    }

    /// Answers the current question.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidTransition` when no question is being
    /// asked, and `EngineError::UnknownOption` when `option_id` is not one of
    /// the current question's options. Neither changes the tally or state.
    pub fn select_option(&mut self, option_id: &OptionId) -> Result<Transition, EngineError> {
        let graph = Arc::clone(&self.graph);
        let question = self
            .current_question_in(&graph)
            .ok_or_else(|| self.invalid("select an option"))?;
        let option = question
            .option(option_id)
            .ok_or_else(|| EngineError::UnknownOption {
                option_id: option_id.clone(),
                question_id: question.id.clone(),
            })?;

        Ok(self.apply_selection(&graph, question, option, false))
    }

    /// Advances the countdown of the current question by one unit.
    ///
    /// When the countdown reaches zero the timeout policy decides what
    /// happens; see [`TimeoutPolicy`]. Ticks for an earlier run are `Stale`,
    /// ticks while no question is asked are `Ignored`; neither changes
    /// anything.
    pub fn tick(&mut self, ticket: RunTicket) -> TickOutcome {
        if ticket != self.ticket() {
            return TickOutcome::Stale;
        }
        let EngineState::Active {
            question_id,
            remaining,
        } = &mut self.state
        else {
            return TickOutcome::Ignored;
        };
        if *remaining == 0 {
            return TickOutcome::Expired;
        }

        *remaining -= 1;
        if *remaining > 0 {
            return TickOutcome::Counting {
                remaining: *remaining,
            };
        }

        let question_id = question_id.clone();
        debug!(question_id = %question_id, policy = ?self.policy, "question expired");
        self.record(RunEventKind::QuestionExpired(QuestionExpired {
            question_id: question_id.clone(),
        }));

        match self.policy {
            TimeoutPolicy::AwaitSelection => TickOutcome::Expired,
            TimeoutPolicy::SelectFirstOption => {
                let graph = Arc::clone(&self.graph);
                let Some(question) = graph.question_by_id(&question_id) else {
                    return TickOutcome::Expired;
                };
                let Some(option) = question.options.first() else {
                    return TickOutcome::Expired;
                };
                TickOutcome::TimedOut(self.apply_selection(&graph, question, option, true))
            }
        }
    }

    /// Abandons the current run (the player retreats) and returns to idle.
    /// The tally is discarded and the current ticket invalidated. Does
    /// nothing when already idle.
    pub fn abandon(&mut self) {
        match self.state {
            EngineState::Idle => return,
            EngineState::Active { .. } => {
                self.record(RunEventKind::RunAbandoned(RunAbandoned {
                    scenario_id: self.graph.id().clone(),
                }));
                info!(scenario_id = %self.graph.id(), run_id = %self.run_id, "run abandoned");
            }
            EngineState::Briefing | EngineState::Completed(_) => {}
        }
        self.generation += 1;
        self.tally = TraitTally::new();
        self.state = EngineState::Idle;
    }

    fn apply_selection(
        &mut self,
        graph: &ScenarioGraph,
        question: &Question,
        option: &AnswerOption,
        forced_by_timeout: bool,
    ) -> Transition {
        self.tally.increment(option.trait_tag.clone());
        self.record(RunEventKind::OptionSelected(OptionSelected {
            question_id: question.id.clone(),
            option_id: option.id.clone(),
            trait_tag: option.trait_tag.clone(),
            forced_by_timeout,
        }));
        debug!(
            question_id = %question.id,
            option_id = %option.id,
            trait_tag = %option.trait_tag,
            forced_by_timeout,
            "option selected"
        );

        if let Some(next) = graph.next_question(option) {
            self.state = EngineState::Active {
                question_id: next.id.clone(),
                remaining: next.time_limit,
            };
            return Transition::Advanced {
                question_id: next.id.clone(),
                remaining: next.time_limit,
            };
        }

        let completion = self.complete(graph);
        Transition::Completed(completion)
    }

    fn complete(&mut self, graph: &ScenarioGraph) -> Completion {
        let tally = self.tally.snapshot();
        let completed_at = self.clock.now();
        let resolved = resolve_dominant(&tally)
            .and_then(|tag| self.archetypes.lookup(&tag).map(|archetype| archetype.id.clone()));

        let completion = match resolved {
            Ok(archetype_id) => Completion::Resolved(RunOutcome {
                run_id: self.run_id,
                scenario_id: graph.id().clone(),
                archetype_id,
                completed_at,
                tally,
            }),
            Err(error) => Completion::Unresolved {
                run_id: self.run_id,
                scenario_id: graph.id().clone(),
                completed_at,
                tally,
                error,
            },
        };

        self.record(RunEventKind::RunCompleted(RunCompleted {
            scenario_id: graph.id().clone(),
            archetype_id: completion.outcome().map(|o| o.archetype_id.clone()),
            selections: completion.tally().total(),
        }));
        match &completion {
            Completion::Resolved(outcome) => info!(
                scenario_id = %outcome.scenario_id,
                run_id = %outcome.run_id,
                archetype_id = %outcome.archetype_id,
                "run completed"
            ),
            Completion::Unresolved { error, .. } => info!(
                scenario_id = %graph.id(),
                run_id = %self.run_id,
                error = %error,
                "run completed without an archetype"
            ),
        }

        self.state = EngineState::Completed(completion.clone());
        completion
    }

    fn current_question_in<'g>(&self, graph: &'g ScenarioGraph) -> Option<&'g Question> {
        match &self.state {
            EngineState::Active { question_id, .. } => graph.question_by_id(question_id),
            _ => None,
        }
    }

    /// The question being asked, if any.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current_question_in(&self.graph)
    }

    /// Ticks left on the current question, if any.
    #[must_use]
    pub fn remaining_time(&self) -> Option<u32> {
        match &self.state {
            EngineState::Active { remaining, .. } => Some(*remaining),
            _ => None,
        }
    }

    /// Whether the run has ended.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.state, EngineState::Completed(_))
    }

    /// How the run ended, once it has.
    #[must_use]
    pub fn completion(&self) -> Option<&Completion> {
        match &self.state {
            EngineState::Completed(completion) => Some(completion),
            _ => None,
        }
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// A copy of the current tally. Empty when idle or briefing.
    #[must_use]
    pub fn tally_snapshot(&self) -> TallySnapshot {
        self.tally.snapshot()
    }

    /// The ticket of the current run.
    #[must_use]
    pub fn ticket(&self) -> RunTicket {
        RunTicket(self.generation)
    }

    /// The id of the current or most recent run; nil before the first start.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// The scenario this engine plays.
    #[must_use]
    pub fn graph(&self) -> &ScenarioGraph {
        &self.graph
    }

    /// The active timeout policy.
    #[must_use]
    pub fn timeout_policy(&self) -> TimeoutPolicy {
        self.policy
    }

    /// Journal events not yet handed off.
    #[must_use]
    pub fn uncommitted_events(&self) -> &[RunEvent] {
        &self.uncommitted_events
    }

    /// Drops every journal event not yet handed off.
    pub fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }

    /// Hands off and clears the journal.
    pub fn take_uncommitted_events(&mut self) -> Vec<RunEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }
}
