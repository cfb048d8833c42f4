//! Run journal events.

use crossroads_core::event::{DomainEvent, EventMetadata};
use crossroads_core::ids::{OptionId, QuestionId, ScenarioId, TraitTag};
use serde::{Deserialize, Serialize};

/// Event type for [`RunStarted`].
pub const RUN_STARTED_EVENT_TYPE: &str = "run.started";
/// Event type for [`OptionSelected`].
pub const OPTION_SELECTED_EVENT_TYPE: &str = "run.option_selected";
/// Event type for [`QuestionExpired`].
pub const QUESTION_EXPIRED_EVENT_TYPE: &str = "run.question_expired";
/// Event type for [`RunCompleted`].
pub const RUN_COMPLETED_EVENT_TYPE: &str = "run.completed";
/// Event type for [`RunAbandoned`].
pub const RUN_ABANDONED_EVENT_TYPE: &str = "run.abandoned";

/// Emitted when a run enters its first question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStarted {
    /// The scenario being played.
    pub scenario_id: ScenarioId,
    /// The first question.
    pub question_id: QuestionId,
}

/// Emitted when an option is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSelected {
    /// The question that was answered.
    pub question_id: QuestionId,
    /// The chosen option.
    pub option_id: OptionId,
    /// The trait that was tallied.
    pub trait_tag: TraitTag,
    /// Whether the timeout policy made the choice.
    pub forced_by_timeout: bool,
}

/// Emitted when a question's countdown reaches zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionExpired {
    /// The question whose time ran out.
    pub question_id: QuestionId,
}

/// Emitted when a run reaches a terminal option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCompleted {
    /// The scenario that was played.
    pub scenario_id: ScenarioId,
    /// The resolved archetype, or `None` if resolution failed.
    pub archetype_id: Option<TraitTag>,
    /// Number of accepted selections.
    pub selections: usize,
}

/// Emitted when a run is abandoned before completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunAbandoned {
    /// The scenario that was being played.
    pub scenario_id: ScenarioId,
}

/// Event payload variants for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEventKind {
    /// The run has started.
    RunStarted(RunStarted),
    /// An option has been selected.
    OptionSelected(OptionSelected),
    /// A question's time has run out.
    QuestionExpired(QuestionExpired),
    /// The run has completed.
    RunCompleted(RunCompleted),
    /// The run has been abandoned.
    RunAbandoned(RunAbandoned),
}

impl RunEventKind {
    /// The event type name of this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RunStarted(_) => RUN_STARTED_EVENT_TYPE,
            Self::OptionSelected(_) => OPTION_SELECTED_EVENT_TYPE,
            Self::QuestionExpired(_) => QUESTION_EXPIRED_EVENT_TYPE,
            Self::RunCompleted(_) => RUN_COMPLETED_EVENT_TYPE,
            Self::RunAbandoned(_) => RUN_ABANDONED_EVENT_TYPE,
        }
    }
}

/// Journal event envelope for a run.
#[derive(Debug, Clone)]
pub struct RunEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: RunEventKind,
}

impl DomainEvent for RunEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("RunEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
