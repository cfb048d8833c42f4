//! Domain error types.
//!
//! Each failure class has its own enum so callers can tell a broken scenario
//! apart from a misused engine, an unresolvable run or a storage failure.

use std::path::PathBuf;

use thiserror::Error;

use crate::ids::{OptionId, QuestionId, ScenarioId, TraitTag};

/// A scenario or archetype set whose references do not hold together.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// The scenario defines no questions at all.
    #[error("scenario {0} has no questions")]
    NoQuestions(ScenarioId),

    /// A question offers no options.
    #[error("question {0} has no options")]
    NoOptions(QuestionId),

    /// A question's time limit is zero.
    #[error("question {0} must have a positive timer")]
    NonPositiveTimer(QuestionId),

    /// Two questions share an identifier.
    #[error("duplicate question id: {0}")]
    DuplicateQuestion(QuestionId),

    /// Two options of one question share an identifier.
    #[error("duplicate option id {option_id} in question {question_id}")]
    DuplicateOption {
        /// The question holding both options.
        question_id: QuestionId,
        /// The repeated option id.
        option_id: OptionId,
    },

    /// The start question does not exist.
    #[error("start question {0} does not exist")]
    UnknownStartQuestion(QuestionId),

    /// An option points at a question that does not exist.
    #[error("option {option_id} of question {question_id} leads to missing question {target}")]
    DanglingNextQuestion {
        /// The question holding the option.
        question_id: QuestionId,
        /// The offending option.
        option_id: OptionId,
        /// The unresolved target.
        target: QuestionId,
    },

    /// Two archetypes share an identifier.
    #[error("duplicate archetype id: {0}")]
    DuplicateArchetype(TraitTag),
}

/// Failure to turn a scenario or archetype document into validated content.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The document is not syntactically valid for its format.
    #[error("malformed {format} document: {detail}")]
    Malformed {
        /// `"json"` or `"yaml"`.
        format: &'static str,
        /// Parser message.
        detail: String,
    },

    /// A required field is absent.
    #[error("missing required field `{path}`")]
    MissingField {
        /// Location of the field, e.g. `questions[1].options[0].trait_tag`.
        path: String,
    },

    /// A field is present with the wrong type.
    #[error("type mismatch: {detail}")]
    TypeMismatch {
        /// Description of the offending value.
        detail: String,
    },

    /// The decoded content violates a structural invariant.
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// A content file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A catalog entry failed to load.
    #[error("scenario {key}: {source}")]
    Scenario {
        /// Catalog key of the scenario.
        key: String,
        /// The failure for that scenario.
        #[source]
        source: Box<ContentError>,
    },
}

/// Misuse of the scenario engine by its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The operation is not valid in the engine's current state.
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        /// The rejected operation.
        operation: &'static str,
        /// The state the engine was in.
        state: &'static str,
    },

    /// The option does not belong to the question being asked.
    #[error("option {option_id} is not offered by question {question_id}")]
    UnknownOption {
        /// The rejected option id.
        option_id: OptionId,
        /// The current question.
        question_id: QuestionId,
    },
}

/// A finished run whose archetype could not be determined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No trait was ever tallied.
    #[error("no trait data to resolve")]
    NoTraitData,

    /// The dominant trait has no registered archetype.
    #[error("no archetype registered for trait {0}")]
    ArchetypeUnavailable(TraitTag),
}

/// Failure of the durable diary store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Reading or writing the backing file failed.
    #[error("diary storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// An entry could not be encoded or decoded.
    #[error("diary entry serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored record could not be understood.
    #[error("corrupt diary record at line {line}: {detail}")]
    Corrupt {
        /// 1-based line number in the backing file.
        line: usize,
        /// Decoder message.
        detail: String,
    },

    /// The store cannot be reached.
    #[error("diary store unavailable: {0}")]
    Unavailable(String),
}
