//! Per-run trait tally.

use std::collections::BTreeMap;

use crossroads_core::ids::TraitTag;
use serde::{Deserialize, Serialize};

/// Read-only copy of a tally at one point in a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallySnapshot {
    counts: BTreeMap<TraitTag, u32>,
    selections: Vec<TraitTag>,
}

impl TallySnapshot {
    /// How many times `tag` was selected.
    #[must_use]
    pub fn count(&self, tag: &TraitTag) -> u32 {
        self.counts.get(tag).copied().unwrap_or(0)
    }

    /// Counts per tag. Tags never selected are absent.
    #[must_use]
    pub fn counts(&self) -> &BTreeMap<TraitTag, u32> {
        &self.counts
    }

    /// Every selected tag, in the order the selections happened.
    #[must_use]
    pub fn selections(&self) -> &[TraitTag] {
        &self.selections
    }

    /// Total number of selections.
    #[must_use]
    pub fn total(&self) -> usize {
        self.selections.len()
    }

    /// Whether nothing has been selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

/// Accumulates trait selections over one run. Counts only ever grow by one;
/// a new run gets a new tally.
#[derive(Debug, Default)]
pub struct TraitTally {
    state: TallySnapshot,
}

impl TraitTally {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one selection of `tag`.
    pub fn increment(&mut self, tag: TraitTag) {
        *self.state.counts.entry(tag.clone()).or_insert(0) += 1;
        self.state.selections.push(tag);
    }

    /// Copies the current state.
    #[must_use]
    pub fn snapshot(&self) -> TallySnapshot {
        self.state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_counts_each_tag_and_keeps_order() {
        // Arrange
        let mut tally = TraitTally::new();
        let brave = TraitTag::new("brave");
        let cautious = TraitTag::new("cautious");

        // Act
        tally.increment(cautious.clone());
        tally.increment(brave.clone());
        tally.increment(cautious.clone());

        // Assert
        let snapshot = tally.snapshot();
        assert_eq!(snapshot.count(&cautious), 2);
        assert_eq!(snapshot.count(&brave), 1);
        assert_eq!(snapshot.count(&TraitTag::new("calm")), 0);
        assert_eq!(snapshot.total(), 3);
        assert_eq!(snapshot.selections(), [cautious.clone(), brave, cautious]);
    }

    #[test]
    fn test_snapshot_is_detached_from_later_increments() {
        let mut tally = TraitTally::new();
        tally.increment(TraitTag::new("brave"));

        let before = tally.snapshot();
        tally.increment(TraitTag::new("brave"));

        assert_eq!(before.count(&TraitTag::new("brave")), 1);
        assert_eq!(tally.snapshot().count(&TraitTag::new("brave")), 2);
    }

    #[test]
    fn test_counts_sum_to_selections() {
        let mut tally = TraitTally::new();
        for tag in ["a", "b", "a", "c", "a", "b"] {
            tally.increment(TraitTag::new(tag));
        }

        let snapshot = tally.snapshot();
        let sum: u32 = snapshot.counts().values().sum();

        assert_eq!(sum as usize, snapshot.total());
        assert!(TraitTally::new().snapshot().is_empty());
    }
}
