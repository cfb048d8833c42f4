//! Player configuration from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crossroads_engine::domain::engine::TimeoutPolicy;

use crate::error::AppError;

/// Directory scanned for scenario definitions.
pub const SCENARIO_DIR_VAR: &str = "CROSSROADS_SCENARIO_DIR";
/// Archetype registry document.
pub const ARCHETYPES_VAR: &str = "CROSSROADS_ARCHETYPES";
/// JSON Lines diary file.
pub const DIARY_PATH_VAR: &str = "CROSSROADS_DIARY_PATH";
/// `await` or `first-option`.
pub const TIMEOUT_POLICY_VAR: &str = "CROSSROADS_TIMEOUT_POLICY";
/// Countdown period in milliseconds.
pub const TICK_MILLIS_VAR: &str = "CROSSROADS_TICK_MILLIS";

/// Everything the player needs to wire itself up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Directory scanned for scenario definitions.
    pub scenario_dir: PathBuf,
    /// Archetype registry document (JSON or YAML by extension).
    pub archetypes_path: PathBuf,
    /// JSON Lines diary file.
    pub diary_path: PathBuf,
    /// What happens when a question's countdown runs out.
    pub timeout_policy: TimeoutPolicy,
    /// Time between two countdown ticks.
    pub tick_period: Duration,
}

impl PlayerConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults for
    /// unset variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let path = |key: &str, default: &str| {
            PathBuf::from(lookup(key).unwrap_or_else(|| default.to_owned()))
        };

        let timeout_policy = match lookup(TIMEOUT_POLICY_VAR) {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("{TIMEOUT_POLICY_VAR}: {e}")))?,
            None => TimeoutPolicy::default(),
        };

        let tick_millis: u64 = lookup(TICK_MILLIS_VAR)
            .unwrap_or_else(|| "1000".to_owned())
            .parse()
            .map_err(|e| AppError::Config(format!("{TICK_MILLIS_VAR} must be a valid u64: {e}")))?;
        if tick_millis == 0 {
            return Err(AppError::Config(format!(
                "{TICK_MILLIS_VAR} must be positive"
            )));
        }

        Ok(Self {
            scenario_dir: path(SCENARIO_DIR_VAR, "scenarios"),
            archetypes_path: path(ARCHETYPES_VAR, "archetypes.json"),
            diary_path: path(DIARY_PATH_VAR, "diary.jsonl"),
            timeout_policy,
            tick_period: Duration::from_millis(tick_millis),
        })
    }
}
