//! Crossroads — the run diary.
//!
//! Responsible for recording completed runs, storing diary entries in memory
//! or in a JSON Lines file, and summarizing the history per archetype.

pub mod application;
pub mod jsonl_store;
pub mod memory_store;
