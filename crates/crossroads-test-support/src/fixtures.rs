//! Content fixtures shared across crates.

use crossroads_content::domain::archetype::{Archetype, ArchetypeRegistry};
use crossroads_content::domain::graph::ScenarioGraph;
use crossroads_content::domain::scenario::{
    AnswerOption, Bilingual, DangerLevel, Question, Scenario,
};
use crossroads_core::ids::{OptionId, QuestionId, ScenarioId, TraitTag};

fn option(id: &str, tag: &str, next: Option<&str>) -> AnswerOption {
    AnswerOption {
        id: OptionId::new(id),
        text: Bilingual::new(format!("option {id}"), format!("lựa chọn {id}")),
        trait_tag: TraitTag::new(tag),
        next_question: next.map(QuestionId::new),
    }
}

/// Two questions, `q1` then `q2`, each with 30 ticks.
///
/// `q1` offers `a` (brave) and `b` (cautious), both leading to `q2`. `q2`
/// offers the terminal options `c` (brave) and `d` (cautious).
#[must_use]
pub fn two_step_scenario() -> ScenarioGraph {
    two_step_scenario_with_timer(30)
}

/// [`two_step_scenario`] with every question's time limit set to
/// `time_limit`.
///
/// # Panics
///
/// Panics if `time_limit` is zero.
#[must_use]
pub fn two_step_scenario_with_timer(time_limit: u32) -> ScenarioGraph {
    let scenario = Scenario {
        id: ScenarioId::new("two_step"),
        region: "hanoi".to_owned(),
        danger: DangerLevel::clamped(2),
        title: Bilingual::new("Two Steps", "Hai bước"),
        intro: Bilingual::new("A short walk.", "Một đoạn đường ngắn."),
        insight: Bilingual::new("Every step counts.", "Mỗi bước đều có ý nghĩa."),
        start_question: QuestionId::new("q1"),
        questions: vec![
            Question {
                id: QuestionId::new("q1"),
                text: Bilingual::new("First?", "Đầu tiên?"),
                time_limit,
                options: vec![
                    option("a", "brave", Some("q2")),
                    option("b", "cautious", Some("q2")),
                ],
            },
            Question {
                id: QuestionId::new("q2"),
                text: Bilingual::new("Then?", "Sau đó?"),
                time_limit,
                options: vec![option("c", "brave", None), option("d", "cautious", None)],
            },
        ],
    };
    ScenarioGraph::new(scenario).expect("two-step fixture is structurally valid")
}

/// A registry with one archetype per tag, in the given order.
///
/// # Panics
///
/// Panics if `tags` repeats a tag.
#[must_use]
pub fn archetypes(tags: &[&str]) -> ArchetypeRegistry {
    let archetypes = tags
        .iter()
        .map(|tag| Archetype {
            id: TraitTag::new(*tag),
            name: Bilingual::new(format!("The {tag}"), format!("Người {tag}")),
            description: Bilingual::default(),
        })
        .collect();
    ArchetypeRegistry::new(archetypes).expect("archetype tags are unique")
}
