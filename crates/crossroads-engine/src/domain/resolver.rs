//! Dominant-trait resolution.

use std::collections::HashMap;

use crossroads_content::domain::archetype::{Archetype, ArchetypeRegistry};
use crossroads_core::error::ResolutionError;
use crossroads_core::ids::TraitTag;

use super::tally::TallySnapshot;

/// Returns the trait with the highest count.
///
/// Selections are replayed in the order they happened while tracking a
/// running leader. A trait only takes the lead by strictly exceeding the
/// leader's count, so on a tie the trait that reached the leading count first
/// wins. The result depends only on the selection sequence.
///
/// # Errors
///
/// Returns `ResolutionError::NoTraitData` if nothing was selected.
pub fn resolve_dominant(snapshot: &TallySnapshot) -> Result<TraitTag, ResolutionError> {
    let mut running: HashMap<&TraitTag, u32> = HashMap::new();
    let mut leader: Option<(&TraitTag, u32)> = None;

    for tag in snapshot.selections() {
        let count = running.entry(tag).or_insert(0);
        *count += 1;
        match leader {
            Some((_, best)) if *count <= best => {}
            _ => leader = Some((tag, *count)),
        }
    }

    leader
        .map(|(tag, _)| tag.clone())
        .ok_or(ResolutionError::NoTraitData)
}

/// Resolves the dominant trait and looks up its archetype.
///
/// # Errors
///
/// Returns `NoTraitData` for an empty tally and `ArchetypeUnavailable` when
/// the dominant trait has no registered archetype.
pub fn resolve_archetype<'a>(
    snapshot: &TallySnapshot,
    registry: &'a ArchetypeRegistry,
) -> Result<&'a Archetype, ResolutionError> {
    let dominant = resolve_dominant(snapshot)?;
    registry.lookup(&dominant)
}

#[cfg(test)]
mod tests {
    use crossroads_content::domain::scenario::Bilingual;

    use super::*;
    use crate::domain::tally::TraitTally;

    fn snapshot_of(tags: &[&str]) -> TallySnapshot {
        let mut tally = TraitTally::new();
        for tag in tags {
            tally.increment(TraitTag::new(*tag));
        }
        tally.snapshot()
    }

    #[test]
    fn test_resolve_dominant_picks_highest_count() {
        let snapshot = snapshot_of(&["cautious", "brave", "brave"]);

        assert_eq!(resolve_dominant(&snapshot).unwrap().as_str(), "brave");
    }

    #[test]
    fn test_tie_goes_to_first_trait_to_reach_the_lead() {
        assert_eq!(
            resolve_dominant(&snapshot_of(&["brave", "cautious"]))
                .unwrap()
                .as_str(),
            "brave"
        );
        assert_eq!(
            resolve_dominant(&snapshot_of(&["cautious", "brave"]))
                .unwrap()
                .as_str(),
            "cautious"
        );
        // calm reaches 2 before brave does.
        assert_eq!(
            resolve_dominant(&snapshot_of(&["brave", "calm", "calm", "brave"]))
                .unwrap()
                .as_str(),
            "calm"
        );
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let sequence = ["x", "y", "z", "z", "y", "x"];

        let first = resolve_dominant(&snapshot_of(&sequence)).unwrap();
        for _ in 0..20 {
            assert_eq!(resolve_dominant(&snapshot_of(&sequence)).unwrap(), first);
        }
        assert_eq!(first.as_str(), "z");
    }

    #[test]
    fn test_empty_tally_has_no_trait_data() {
        let result = resolve_dominant(&TallySnapshot::default());

        assert_eq!(result.unwrap_err(), ResolutionError::NoTraitData);
    }

    #[test]
    fn test_resolve_archetype_reports_unregistered_trait() {
        let registry = ArchetypeRegistry::new(vec![Archetype {
            id: TraitTag::new("brave"),
            name: Bilingual::new("The Vanguard", "Người tiên phong"),
            description: Bilingual::default(),
        }])
        .unwrap();

        assert_eq!(
            resolve_archetype(&snapshot_of(&["brave"]), &registry)
                .unwrap()
                .name
                .en,
            "The Vanguard"
        );
        assert_eq!(
            resolve_archetype(&snapshot_of(&["reckless"]), &registry).unwrap_err(),
            ResolutionError::ArchetypeUnavailable(TraitTag::new("reckless"))
        );
    }
}
