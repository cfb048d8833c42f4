//! Shared test mocks, fixtures and utilities for Crossroads.

mod clock;
mod fixtures;
mod store;

pub use clock::{FixedClock, SteppingClock};
pub use fixtures::{archetypes, two_step_scenario, two_step_scenario_with_timer};
pub use store::{EmptyDiaryStore, FailingDiaryStore, RecordingDiaryStore};
