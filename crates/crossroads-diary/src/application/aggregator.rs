//! Collection summary over the diary history.

use crossroads_content::domain::archetype::ArchetypeRegistry;
use crossroads_core::diary::DiaryEntry;
use crossroads_core::ids::TraitTag;
use serde::Serialize;

/// How many diary entries resolved to one archetype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchetypeCount {
    /// The archetype.
    pub archetype_id: TraitTag,
    /// Number of entries. Always positive.
    pub count: usize,
}

/// Aggregate counts per archetype across the whole diary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    /// Archetypes with at least one entry, most frequent first. Ties keep the
    /// registry's order.
    pub entries: Vec<ArchetypeCount>,
    /// Number of entries summarized, recognized or not.
    pub total: usize,
    /// Entries whose archetype is not in the registry. They are counted here
    /// and nowhere else.
    pub unrecognized: usize,
}

impl CollectionSummary {
    /// Count for `archetype_id`, zero if it never appears.
    #[must_use]
    pub fn count_of(&self, archetype_id: &TraitTag) -> usize {
        self.entries
            .iter()
            .find(|c| &c.archetype_id == archetype_id)
            .map_or(0, |c| c.count)
    }
}

/// Summarizes `entries` over the archetypes in `registry`.
///
/// Pure: the same history and registry always give the same summary.
#[must_use]
pub fn summarize(entries: &[DiaryEntry], registry: &ArchetypeRegistry) -> CollectionSummary {
    let mut counts = vec![0_usize; registry.len()];
    let mut unrecognized = 0;
    for entry in entries {
        match registry.position(&entry.archetype_id) {
            Some(position) => counts[position] += 1,
            None => unrecognized += 1,
        }
    }

    let mut ranked: Vec<ArchetypeCount> = registry
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(archetype, count)| ArchetypeCount {
            archetype_id: archetype.id.clone(),
            count,
        })
        .collect();
    // Stable, so equal counts stay in registry order.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));

    CollectionSummary {
        entries: ranked,
        total: entries.len(),
        unrecognized,
    }
}
