//! Drivers that feed the engine from outside.

pub mod countdown;
