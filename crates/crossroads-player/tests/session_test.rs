//! Integration tests for a full play session against the JSON Lines diary.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crossroads_core::ids::{OptionId, TraitTag};
use crossroads_player::config::{
    ARCHETYPES_VAR, DIARY_PATH_VAR, PlayerConfig, SCENARIO_DIR_VAR, TIMEOUT_POLICY_VAR,
    TICK_MILLIS_VAR,
};
use crossroads_player::error::AppError;
use crossroads_player::session::{DiaryStatus, SessionStep};
use crossroads_player::state::AppState;
use tempfile::TempDir;

const SCENARIO: &str = r#"{
  "id": "hanoi_easy_1",
  "region": "hanoi",
  "danger": 2,
  "title_en": "Flooded Street",
  "title_vi": "Phố ngập",
  "intro_en": "The water is rising.",
  "intro_vi": "Nước đang lên.",
  "insight_en": "Stay calm.",
  "insight_vi": "Hãy bình tĩnh.",
  "start_question": "q1",
  "questions": [
    {
      "id": "q1",
      "text_en": "The road ahead is under water.",
      "text_vi": "Con đường phía trước bị ngập.",
      "timer": 3,
      "options": [
        { "id": "a", "text_en": "Wade through", "text_vi": "Lội qua", "trait_tag": "brave", "next_question": "q2" },
        { "id": "b", "text_en": "Find another way", "text_vi": "Tìm đường khác", "trait_tag": "cautious", "next_question": "q2" }
      ]
    },
    {
      "id": "q2",
      "text_en": "A stranger needs help.",
      "text_vi": "Một người lạ cần giúp đỡ.",
      "timer": 3,
      "options": [
        { "id": "c", "text_en": "Help them", "text_vi": "Giúp họ", "trait_tag": "brave", "next_question": null },
        { "id": "d", "text_en": "Call for help", "text_vi": "Gọi trợ giúp", "trait_tag": "cautious" }
      ]
    }
  ]
}"#;

const ARCHETYPES: &str = r#"[
  { "id": "cautious", "name_en": "The Sentinel", "name_vi": "Người canh gác", "description_en": "Plans first.", "description_vi": "Lên kế hoạch trước." },
  { "id": "brave", "name_en": "The Vanguard", "name_vi": "Người tiên phong", "description_en": "Acts first.", "description_vi": "Hành động trước." }
]"#;

/// Lays out content in a temp directory and returns a config pointing at it.
fn setup(extra: &[(&str, &str)]) -> (TempDir, PlayerConfig) {
    let dir = tempfile::tempdir().unwrap();
    let scenarios = dir.path().join("scenarios");
    fs::create_dir(&scenarios).unwrap();
    fs::write(scenarios.join("hanoi_easy_1.json"), SCENARIO).unwrap();
    fs::write(dir.path().join("archetypes.json"), ARCHETYPES).unwrap();

    let config = config_for(dir.path(), extra).unwrap();
    (dir, config)
}

fn config_for(root: &Path, extra: &[(&str, &str)]) -> Result<PlayerConfig, AppError> {
    let mut vars: HashMap<&str, String> = HashMap::from([
        (
            SCENARIO_DIR_VAR,
            root.join("scenarios").display().to_string(),
        ),
        (
            ARCHETYPES_VAR,
            root.join("archetypes.json").display().to_string(),
        ),
        (DIARY_PATH_VAR, root.join("diary.jsonl").display().to_string()),
    ]);
    for (key, value) in extra {
        vars.insert(*key, (*value).to_owned());
    }
    PlayerConfig::from_lookup(|key| vars.get(key).cloned())
}

async fn play(state: &AppState, options: &[&str]) -> SessionStep {
    let mut session = state.session("hanoi_easy_1").unwrap();
    session.brief().await.unwrap();
    session.start().await.unwrap();
    let mut last = None;
    for option in options {
        last = Some(session.select(&OptionId::new(*option)).await.unwrap());
    }
    last.unwrap()
}

// --- full runs ---

#[tokio::test]
async fn test_completed_runs_are_recorded_and_summarized() {
    // Arrange
    let (dir, config) = setup(&[]);
    let state = AppState::load(&config).await.unwrap();

    // Act
    let brave = play(&state, &["a", "c"]).await;
    play(&state, &["b", "d"]).await;
    play(&state, &["a", "d"]).await;

    // Assert
    let SessionStep::Completed(report) = brave else {
        panic!("expected completion, got {brave:?}");
    };
    let outcome = report.completion.outcome().unwrap();
    assert_eq!(outcome.archetype_id.as_str(), "brave");
    assert_eq!(outcome.tally.count(&TraitTag::new("brave")), 2);
    assert!(matches!(report.diary, DiaryStatus::Recorded(_)));

    let summary = state.collection_summary().await.unwrap();
    let ranking: Vec<(&str, usize)> = summary
        .entries
        .iter()
        .map(|c| (c.archetype_id.as_str(), c.count))
        .collect();
    assert_eq!(ranking, [("brave", 2), ("cautious", 1)]);
    assert_eq!(summary.total, 3);

    let raw = fs::read_to_string(dir.path().join("diary.jsonl")).unwrap();
    assert_eq!(raw.lines().count(), 3);
}

#[tokio::test]
async fn test_diary_survives_reloading_the_player() {
    let (_dir, config) = setup(&[]);
    {
        let state = AppState::load(&config).await.unwrap();
        play(&state, &["b", "d"]).await;
    }

    let reloaded = AppState::load(&config).await.unwrap();
    let entries = reloaded.recorder.all_entries().await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].archetype_id.as_str(), "cautious");
    assert_eq!(entries[0].scenario_id.as_str(), "hanoi_easy_1");
}

#[tokio::test(start_paused = true)]
async fn test_unattended_run_completes_under_first_option_policy() {
    // Arrange
    let (_dir, config) = setup(&[(TIMEOUT_POLICY_VAR, "first-option"), (TICK_MILLIS_VAR, "100")]);
    let state = AppState::load(&config).await.unwrap();
    let mut session = state.session("hanoi_easy_1").unwrap();
    session.start().await.unwrap();

    // Act
    tokio::time::sleep(std::time::Duration::from_millis(650)).await;
    let report = session.poll_completion().await;

    // Assert
    let report = report.unwrap();
    assert_eq!(
        report.completion.outcome().unwrap().archetype_id.as_str(),
        "brave"
    );
    let summary = state.collection_summary().await.unwrap();
    assert_eq!(summary.count_of(&TraitTag::new("brave")), 1);
}

// --- failures ---

#[tokio::test]
async fn test_unknown_scenario_key_is_reported() {
    let (_dir, config) = setup(&[]);
    let state = AppState::load(&config).await.unwrap();

    match state.session("hue_easy_9") {
        Err(AppError::UnknownScenario(key)) => assert_eq!(key, "hue_easy_9"),
        other => panic!("expected UnknownScenario, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_archetype_document_fails_to_load() {
    let (dir, config) = setup(&[]);
    fs::remove_file(dir.path().join("archetypes.json")).unwrap();

    let result = AppState::load(&config).await;

    assert!(matches!(result, Err(AppError::Content(_))));
}

#[tokio::test]
async fn test_archetype_document_needs_a_known_extension() {
    let (dir, _) = setup(&[]);
    fs::copy(
        dir.path().join("archetypes.json"),
        dir.path().join("archetypes.txt"),
    )
    .unwrap();
    let config = config_for(
        dir.path(),
        &[(
            ARCHETYPES_VAR,
            &dir.path().join("archetypes.txt").display().to_string(),
        )],
    )
    .unwrap();

    let result = AppState::load(&config).await;

    assert!(matches!(result, Err(AppError::Config(_))));
}

#[tokio::test]
async fn test_empty_diary_summarizes_to_nothing() {
    let (_dir, config) = setup(&[]);
    let state = AppState::load(&config).await.unwrap();

    let summary = state.collection_summary().await.unwrap();

    assert!(summary.entries.is_empty());
    assert_eq!(summary.total, 0);
    assert_eq!(summary.unrecognized, 0);
}
