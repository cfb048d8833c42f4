//! Scenario content domain model.

pub mod archetype;
pub mod graph;
pub mod scenario;
