//! Recording runs and summarizing the diary.

pub mod aggregator;
pub mod recorder;
