//! Crossroads — scenario content.
//!
//! Responsible for the scenario data model, decoding scenario and archetype
//! documents, structural validation of the question graph, and the
//! directory-backed scenario catalog.

pub mod application;
pub mod domain;
