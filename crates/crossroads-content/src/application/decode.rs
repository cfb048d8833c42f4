//! Decoding scenario and archetype documents.
//!
//! Documents are parsed in two steps: first into a generic value (so syntax
//! errors surface as `Malformed`), then into raw structs whose fields are all
//! optional (so type errors surface as `TypeMismatch` and absent fields can be
//! reported with their path as `MissingField`).

use crossroads_core::error::ContentError;
use crossroads_core::ids::{OptionId, QuestionId, ScenarioId, TraitTag};
use std::fmt;

use serde::de::{self, DeserializeOwned, Unexpected, Visitor};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::domain::archetype::{Archetype, ArchetypeRegistry};
use crate::domain::graph::ScenarioGraph;
use crate::domain::scenario::{AnswerOption, Bilingual, DangerLevel, Question, Scenario};

/// Document syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JSON.
    Json,
    /// YAML.
    Yaml,
}

impl Format {
    /// Picks a format from a file extension.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// A danger rating as written: an integer or a numeric string, saturated
/// into `i64` so oversized values still clamp.
#[derive(Debug)]
struct RawDanger(i64);

impl<'de> Deserialize<'de> for RawDanger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DangerVisitor)
    }
}

struct DangerVisitor;

impl Visitor<'_> for DangerVisitor {
    type Value = RawDanger;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or numeric string for `danger`")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<RawDanger, E> {
        Ok(RawDanger(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<RawDanger, E> {
        Ok(RawDanger(i64::try_from(value).unwrap_or(i64::MAX)))
    }

    fn visit_i128<E: de::Error>(self, value: i128) -> Result<RawDanger, E> {
        Ok(RawDanger(saturate(value)))
    }

    fn visit_u128<E: de::Error>(self, value: u128) -> Result<RawDanger, E> {
        Ok(RawDanger(i64::try_from(value).unwrap_or(i64::MAX)))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<RawDanger, E> {
        parse_integer(value.trim())
            .map(RawDanger)
            .ok_or_else(|| E::invalid_value(Unexpected::Str(value), &self))
    }
}

fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

/// Parses a decimal integer of any length, saturating at the `i64` bounds.
fn parse_integer(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(match digits.parse::<i128>() {
        Ok(magnitude) => saturate(if negative { -magnitude } else { magnitude }),
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    })
}

#[derive(Debug, Deserialize)]
struct RawScenario {
    id: Option<String>,
    region: Option<String>,
    danger: Option<RawDanger>,
    title_en: Option<String>,
    title_vi: Option<String>,
    intro_en: Option<String>,
    intro_vi: Option<String>,
    insight_en: Option<String>,
    insight_vi: Option<String>,
    start_question: Option<String>,
    questions: Option<Vec<RawQuestion>>,
}

#[derive(Debug, Deserialize)]
struct RawQuestion {
    id: Option<String>,
    text_en: Option<String>,
    text_vi: Option<String>,
    timer: Option<u32>,
    options: Option<Vec<RawOption>>,
}

#[derive(Debug, Deserialize)]
struct RawOption {
    id: Option<String>,
    text_en: Option<String>,
    text_vi: Option<String>,
    trait_tag: Option<String>,
    next_question: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawArchetype {
    id: Option<String>,
    name_en: Option<String>,
    name_vi: Option<String>,
    description_en: Option<String>,
    description_vi: Option<String>,
}

fn required<T>(value: Option<T>, path: impl FnOnce() -> String) -> Result<T, ContentError> {
    value.ok_or_else(|| ContentError::MissingField { path: path() })
}

fn parse<T: DeserializeOwned>(source: &str, format: Format) -> Result<T, ContentError> {
    let malformed = |detail: String| ContentError::Malformed {
        format: format.name(),
        detail,
    };
    let mismatch = |detail: String| ContentError::TypeMismatch { detail };

    match format {
        Format::Json => {
            let value: serde_json::Value =
                serde_json::from_str(source).map_err(|e| malformed(e.to_string()))?;
            serde_json::from_value(value).map_err(|e| mismatch(e.to_string()))
        }
        Format::Yaml => {
            let value: serde_yaml::Value =
                serde_yaml::from_str(source).map_err(|e| malformed(e.to_string()))?;
            serde_yaml::from_value(value).map_err(|e| mismatch(e.to_string()))
        }
    }
}

impl RawDanger {
    fn into_level(self) -> DangerLevel {
        DangerLevel::clamped(self.0)
    }
}

impl RawOption {
    fn into_option(self, at: &str) -> Result<AnswerOption, ContentError> {
        Ok(AnswerOption {
            id: OptionId::new(required(self.id, || format!("{at}.id"))?),
            text: Bilingual::new(
                required(self.text_en, || format!("{at}.text_en"))?,
                required(self.text_vi, || format!("{at}.text_vi"))?,
            ),
            trait_tag: TraitTag::new(required(self.trait_tag, || format!("{at}.trait_tag"))?),
            next_question: self.next_question.map(QuestionId::new),
        })
    }
}

impl RawQuestion {
    fn into_question(self, at: &str) -> Result<Question, ContentError> {
        let id = required(self.id, || format!("{at}.id"))?;
        let text = Bilingual::new(
            required(self.text_en, || format!("{at}.text_en"))?,
            required(self.text_vi, || format!("{at}.text_vi"))?,
        );
        let time_limit = required(self.timer, || format!("{at}.timer"))?;
        let options = required(self.options, || format!("{at}.options"))?
            .into_iter()
            .enumerate()
            .map(|(i, option)| option.into_option(&format!("{at}.options[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Question {
            id: QuestionId::new(id),
            text,
            time_limit,
            options,
        })
    }
}

impl RawScenario {
    fn into_scenario(self) -> Result<Scenario, ContentError> {
        let id = required(self.id, || "id".to_owned())?;
        let region = required(self.region, || "region".to_owned())?;
        let danger = required(self.danger, || "danger".to_owned())?.into_level();
        let title = Bilingual::new(
            required(self.title_en, || "title_en".to_owned())?,
            required(self.title_vi, || "title_vi".to_owned())?,
        );
        let intro = Bilingual::new(
            required(self.intro_en, || "intro_en".to_owned())?,
            required(self.intro_vi, || "intro_vi".to_owned())?,
        );
        let insight = Bilingual::new(
            self.insight_en.unwrap_or_default(),
            self.insight_vi.unwrap_or_default(),
        );
        let start_question = required(self.start_question, || "start_question".to_owned())?;
        let questions = required(self.questions, || "questions".to_owned())?
            .into_iter()
            .enumerate()
            .map(|(i, question)| question.into_question(&format!("questions[{i}]")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Scenario {
            id: ScenarioId::new(id),
            region,
            danger,
            title,
            intro,
            insight,
            start_question: QuestionId::new(start_question),
            questions,
        })
    }
}

/// Decodes a scenario document without validating its graph.
///
/// # Errors
///
/// Returns `ContentError::Malformed`, `MissingField` or `TypeMismatch`
/// depending on how the document is broken.
pub fn decode_scenario(source: &str, format: Format) -> Result<Scenario, ContentError> {
    let raw: RawScenario = parse(source, format)?;
    raw.into_scenario()
}

/// Decodes and validates a scenario document.
///
/// # Errors
///
/// Returns any decoding error from [`decode_scenario`], or
/// `ContentError::Structural` if the question graph does not hold together.
pub fn load_scenario(source: &str, format: Format) -> Result<ScenarioGraph, ContentError> {
    let scenario = decode_scenario(source, format)?;
    let graph = ScenarioGraph::new(scenario)?;
    debug!(
        scenario_id = %graph.id(),
        questions = graph.question_count(),
        "scenario loaded"
    );
    Ok(graph)
}

/// Decodes an archetype document: a list of archetypes in registration order.
///
/// # Errors
///
/// Returns a decoding error, or `ContentError::Structural` if an id repeats.
pub fn load_archetypes(source: &str, format: Format) -> Result<ArchetypeRegistry, ContentError> {
    let raw: Vec<RawArchetype> = parse(source, format)?;
    let archetypes = raw
        .into_iter()
        .enumerate()
        .map(|(i, archetype)| -> Result<Archetype, ContentError> {
            Ok(Archetype {
                id: TraitTag::new(required(archetype.id, || format!("[{i}].id"))?),
                name: Bilingual::new(
                    required(archetype.name_en, || format!("[{i}].name_en"))?,
                    required(archetype.name_vi, || format!("[{i}].name_vi"))?,
                ),
                description: Bilingual::new(
                    archetype.description_en.unwrap_or_default(),
                    archetype.description_vi.unwrap_or_default(),
                ),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ArchetypeRegistry::new(archetypes)?)
}
