//! Run state machine, tally and resolution.

pub mod engine;
pub mod events;
pub mod resolver;
pub mod tally;
