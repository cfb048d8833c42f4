//! Validated, indexed scenario graph.

use std::collections::{HashMap, HashSet};

use crossroads_core::error::StructuralError;
use crossroads_core::ids::{QuestionId, ScenarioId};
use tracing::warn;

use super::scenario::{AnswerOption, Question, Scenario};

/// A scenario whose question references are known to resolve.
///
/// Construction is the only place validation happens. Once built, the graph
/// is read-only for the lifetime of the runs that use it.
#[derive(Debug, Clone)]
pub struct ScenarioGraph {
    scenario: Scenario,
    index: HashMap<QuestionId, usize>,
    start: usize,
}

impl ScenarioGraph {
    /// Validates `scenario` and indexes its questions by id.
    ///
    /// # Errors
    ///
    /// Returns a [`StructuralError`] when the scenario has no questions, a
    /// question has no options or a zero timer, an id is repeated within its
    /// scope, or the start question or any option's next question does not
    /// exist. Nothing is dropped or repaired.
    pub fn new(scenario: Scenario) -> Result<Self, StructuralError> {
        if scenario.questions.is_empty() {
            return Err(StructuralError::NoQuestions(scenario.id.clone()));
        }

        let mut index = HashMap::with_capacity(scenario.questions.len());
        for (position, question) in scenario.questions.iter().enumerate() {
            if question.options.is_empty() {
                return Err(StructuralError::NoOptions(question.id.clone()));
            }
            if question.time_limit == 0 {
                return Err(StructuralError::NonPositiveTimer(question.id.clone()));
            }
            if index.insert(question.id.clone(), position).is_some() {
                return Err(StructuralError::DuplicateQuestion(question.id.clone()));
            }
            let mut seen = HashSet::with_capacity(question.options.len());
            for option in &question.options {
                if !seen.insert(&option.id) {
                    return Err(StructuralError::DuplicateOption {
                        question_id: question.id.clone(),
                        option_id: option.id.clone(),
                    });
                }
            }
        }

        let Some(&start) = index.get(&scenario.start_question) else {
            return Err(StructuralError::UnknownStartQuestion(
                scenario.start_question.clone(),
            ));
        };

        for question in &scenario.questions {
            for option in &question.options {
                if let Some(target) = &option.next_question {
                    if !index.contains_key(target) {
                        return Err(StructuralError::DanglingNextQuestion {
                            question_id: question.id.clone(),
                            option_id: option.id.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
        }

        let graph = Self {
            scenario,
            index,
            start,
        };

        let reachable = graph.reachable_question_ids();
        for question in &graph.scenario.questions {
            if !reachable.contains(&question.id) {
                warn!(
                    scenario_id = %graph.scenario.id,
                    question_id = %question.id,
                    "question is unreachable from the start question"
                );
            }
        }

        Ok(graph)
    }

    /// The validated scenario.
    #[must_use]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// The scenario identifier.
    #[must_use]
    pub fn id(&self) -> &ScenarioId {
        &self.scenario.id
    }

    /// Where every run begins.
    #[must_use]
    pub fn start_question_id(&self) -> &QuestionId {
        &self.scenario.questions[self.start].id
    }

    /// The question every run begins with.
    #[must_use]
    pub fn start_question(&self) -> &Question {
        &self.scenario.questions[self.start]
    }

    /// Looks up a question by id.
    #[must_use]
    pub fn question_by_id(&self, id: &QuestionId) -> Option<&Question> {
        self.index
            .get(id)
            .map(|&position| &self.scenario.questions[position])
    }

    /// The question that follows `option`, or `None` if it is terminal.
    #[must_use]
    pub fn next_question(&self, option: &AnswerOption) -> Option<&Question> {
        option
            .next_question
            .as_ref()
            .and_then(|id| self.question_by_id(id))
    }

    /// Number of questions, reachable or not.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.scenario.questions.len()
    }

    /// Ids of every question a run can visit.
    #[must_use]
    pub fn reachable_question_ids(&self) -> HashSet<&QuestionId> {
        let mut reachable = HashSet::new();
        let mut pending = vec![self.start_question()];
        while let Some(question) = pending.pop() {
            if !reachable.insert(&question.id) {
                continue;
            }
            pending.extend(
                question
                    .options
                    .iter()
                    .filter_map(|option| option.next_question.as_ref())
                    .filter_map(|next| self.question_by_id(next)),
            );
        }
        reachable
    }

    /// Whether every run is guaranteed to end, i.e. no cycle is reachable
    /// from the start question.
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unvisited,
            InProgress,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.scenario.questions.len()];
        // (question position, index of the next option to follow)
        let mut stack = vec![(self.start, 0_usize)];
        marks[self.start] = Mark::InProgress;

        while let Some((position, next_option)) = stack.pop() {
            let question = &self.scenario.questions[position];
            let Some(option) = question.options.get(next_option) else {
                marks[position] = Mark::Done;
                continue;
            };
            stack.push((position, next_option + 1));

            let Some(target) = option
                .next_question
                .as_ref()
                .and_then(|next| self.index.get(next).copied())
            else {
                continue;
            };
            match marks[target] {
                Mark::InProgress => return false,
                Mark::Unvisited => {
                    marks[target] = Mark::InProgress;
                    stack.push((target, 0));
                }
                Mark::Done => {}
            }
        }
        true
    }
}
