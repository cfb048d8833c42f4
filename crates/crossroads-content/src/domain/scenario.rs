//! Scenario, question and option values.

use crossroads_core::ids::{OptionId, QuestionId, ScenarioId, TraitTag};
use serde::{Deserialize, Serialize};

/// A piece of text in both supported locales. Picking one is up to the
/// presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bilingual {
    /// English text.
    pub en: String,
    /// Vietnamese text.
    pub vi: String,
}

impl Bilingual {
    /// Creates a text pair.
    #[must_use]
    pub fn new(en: impl Into<String>, vi: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            vi: vi.into(),
        }
    }
}

/// How dangerous a scenario is, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DangerLevel(u8);

impl DangerLevel {
    /// Lowest danger level.
    pub const MIN: u8 = 1;
    /// Highest danger level.
    pub const MAX: u8 = 5;

    /// Clamps an authored value into the valid range.
    #[must_use]
    pub fn clamped(raw: i64) -> Self {
        let bounded = raw.clamp(i64::from(Self::MIN), i64::from(Self::MAX));
        Self(u8::try_from(bounded).unwrap_or(Self::MAX))
    }

    /// Returns the level as a number.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

/// One answer choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Identifier, unique within its question.
    pub id: OptionId,
    /// Label shown to the player.
    pub text: Bilingual,
    /// Trait tallied when this option is chosen.
    pub trait_tag: TraitTag,
    /// The question that follows, or `None` if choosing this ends the run.
    pub next_question: Option<QuestionId>,
}

impl AnswerOption {
    /// Whether choosing this option ends the run.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.next_question.is_none()
    }
}

/// One timed decision point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique within its scenario.
    pub id: QuestionId,
    /// Prompt shown to the player.
    pub text: Bilingual,
    /// Seconds the player has to answer.
    pub time_limit: u32,
    /// Answer choices in display order.
    pub options: Vec<AnswerOption>,
}

impl Question {
    /// Finds one of this question's options.
    #[must_use]
    pub fn option(&self, id: &OptionId) -> Option<&AnswerOption> {
        self.options.iter().find(|option| &option.id == id)
    }
}

/// A playable branching incident as authored. Use
/// [`ScenarioGraph`](crate::domain::graph::ScenarioGraph) to validate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario identifier.
    pub id: ScenarioId,
    /// Region tag used to group scenarios.
    pub region: String,
    /// Danger level.
    pub danger: DangerLevel,
    /// Title.
    pub title: Bilingual,
    /// Briefing text shown before the run starts.
    pub intro: Bilingual,
    /// Takeaway shown after the run. Empty when not authored.
    pub insight: Bilingual,
    /// Where every run begins.
    pub start_question: QuestionId,
    /// Questions in authored order.
    pub questions: Vec<Question>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_danger_level_clamps_out_of_range_values() {
        assert_eq!(DangerLevel::clamped(-3).get(), 1);
        assert_eq!(DangerLevel::clamped(0).get(), 1);
        assert_eq!(DangerLevel::clamped(3).get(), 3);
        assert_eq!(DangerLevel::clamped(9).get(), 5);
        assert_eq!(DangerLevel::clamped(i64::MAX).get(), 5);
    }

    #[test]
    fn test_question_option_lookup() {
        let question = Question {
            id: QuestionId::new("q1"),
            text: Bilingual::new("Fire!", "Cháy!"),
            time_limit: 10,
            options: vec![AnswerOption {
                id: OptionId::new("run"),
                text: Bilingual::new("Run", "Chạy"),
                trait_tag: TraitTag::new("cautious"),
                next_question: None,
            }],
        };

        let found = question.option(&OptionId::new("run")).unwrap();

        assert!(found.is_terminal());
        assert!(question.option(&OptionId::new("stay")).is_none());
    }
}
