//! Crossroads — scenario traversal.
//!
//! Responsible for walking one run through a scenario graph, tallying the
//! traits of chosen answers, resolving the dominant archetype, and driving
//! per-question countdowns.

pub mod application;
pub mod domain;
