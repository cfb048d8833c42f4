//! Crossroads — player error types.

use crossroads_core::error::{ContentError, PersistenceError};
use thiserror::Error;

/// Startup and wiring errors for the player.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Scenario or archetype content could not be loaded.
    #[error("content error: {0}")]
    Content(#[from] ContentError),

    /// The diary could not be read or written.
    #[error("diary error: {0}")]
    Persistence(#[from] PersistenceError),

    /// No scenario is registered under the requested key.
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),
}
