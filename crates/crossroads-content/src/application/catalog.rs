//! Directory-backed scenario catalog.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossroads_core::error::ContentError;
use tracing::{info, warn};

use super::decode::{Format, load_scenario};
use crate::domain::graph::ScenarioGraph;

/// Formats the catalog key of the `n`th easy scenario of a region.
#[must_use]
pub fn scenario_key(region: &str, n: u32) -> String {
    format!("{region}_easy_{n}")
}

/// Validated scenarios keyed by catalog key.
#[derive(Debug, Clone, Default)]
pub struct ScenarioCatalog {
    scenarios: BTreeMap<String, Arc<ScenarioGraph>>,
}

impl ScenarioCatalog {
    /// Loads every `.json`, `.yaml` and `.yml` file in `dir`, keyed by file
    /// stem. Other files are skipped. When two files share a stem, the first
    /// in path order wins.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Io` if the directory or a file cannot be read,
    /// and `ContentError::Scenario` wrapping the cause if any scenario fails
    /// to load. One broken scenario fails the whole catalog.
    pub fn load_dir(dir: &Path) -> Result<Self, ContentError> {
        let io_error = |path: &Path| {
            let path = path.to_path_buf();
            move |source| ContentError::Io { path, source }
        };

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(io_error(dir))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()
            .map_err(io_error(dir))?;
        paths.sort();

        let mut catalog = Self::default();
        for path in paths {
            let Some(format) = path
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(Format::from_extension)
            else {
                continue;
            };
            let Some(key) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if catalog.scenarios.contains_key(key) {
                warn!(key, path = %path.display(), "duplicate scenario key, file ignored");
                continue;
            }

            let source = std::fs::read_to_string(&path).map_err(io_error(&path))?;
            let graph = load_scenario(&source, format).map_err(|e| ContentError::Scenario {
                key: key.to_owned(),
                source: Box::new(e),
            })?;
            catalog.insert(key, graph);
        }

        info!(dir = %dir.display(), scenarios = catalog.len(), "scenario catalog loaded");
        Ok(catalog)
    }

    /// Adds or replaces a scenario.
    pub fn insert(&mut self, key: impl Into<String>, graph: ScenarioGraph) {
        self.scenarios.insert(key.into(), Arc::new(graph));
    }

    /// Looks up a scenario by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Arc<ScenarioGraph>> {
        self.scenarios.get(key).cloned()
    }

    /// Catalog keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    /// Scenarios tagged with `region`, in key order.
    pub fn in_region<'a>(
        &'a self,
        region: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Arc<ScenarioGraph>)> + 'a {
        self.scenarios
            .iter()
            .filter(move |(_, graph)| graph.scenario().region == region)
            .map(|(key, graph)| (key.as_str(), graph))
    }

    /// Number of scenarios.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Whether the catalog holds no scenarios.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn scenario_json(id: &str, region: &str) -> String {
        serde_json::json!({
            "id": id,
            "region": region,
            "danger": 1,
            "title_en": "t", "title_vi": "t",
            "intro_en": "i", "intro_vi": "i",
            "start_question": "q1",
            "questions": [{
                "id": "q1", "text_en": "?", "text_vi": "?", "timer": 5,
                "options": [{"id": "a", "text_en": "a", "text_vi": "a", "trait_tag": "calm"}]
            }]
        })
        .to_string()
    }

    #[test]
    fn test_scenario_key_format() {
        assert_eq!(scenario_key("hanoi", 3), "hanoi_easy_3");
    }

    #[test]
    fn test_load_dir_reads_json_and_yaml_and_skips_other_files() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("hanoi_easy_1.json"),
            scenario_json("hanoi_easy_1", "hanoi"),
        )
        .unwrap();
        // JSON is valid YAML, so the same body works for the .yaml file.
        fs::write(
            dir.path().join("hue_easy_1.yaml"),
            scenario_json("hue_easy_1", "hue"),
        )
        .unwrap();
        fs::write(dir.path().join("README.md"), "not a scenario").unwrap();

        // Act
        let catalog = ScenarioCatalog::load_dir(dir.path()).unwrap();

        // Assert
        assert_eq!(catalog.keys().collect::<Vec<_>>(), ["hanoi_easy_1", "hue_easy_1"]);
        let hue: Vec<&str> = catalog.in_region("hue").map(|(key, _)| key).collect();
        assert_eq!(hue, ["hue_easy_1"]);
        assert_eq!(
            catalog.get("hanoi_easy_1").unwrap().id().as_str(),
            "hanoi_easy_1"
        );
    }

    #[test]
    fn test_load_dir_names_the_broken_scenario() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{\"id\": \"broken\"}").unwrap();

        let result = ScenarioCatalog::load_dir(dir.path());

        match result.unwrap_err() {
            ContentError::Scenario { key, source } => {
                assert_eq!(key, "broken");
                assert!(matches!(*source, ContentError::MissingField { .. }));
            }
            other => panic!("expected Scenario, got {other:?}"),
        }
    }

    #[test]
    fn test_load_dir_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        assert!(matches!(
            ScenarioCatalog::load_dir(&missing),
            Err(ContentError::Io { .. })
        ));
    }
}
