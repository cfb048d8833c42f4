//! Archetypes and the registry that defines the known trait universe.

use std::collections::HashMap;

use crossroads_core::error::{ResolutionError, StructuralError};
use crossroads_core::ids::TraitTag;
use serde::{Deserialize, Serialize};

use super::scenario::Bilingual;

/// Descriptive record shown when a run resolves to a trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archetype {
    /// The trait this archetype describes.
    pub id: TraitTag,
    /// Display name.
    pub name: Bilingual,
    /// Explanation shown on the completion screen.
    pub description: Bilingual,
}

/// The set of defined archetypes, in registration order.
///
/// Registration order is the canonical ordering used to break ties in
/// collection summaries.
#[derive(Debug, Clone, Default)]
pub struct ArchetypeRegistry {
    archetypes: Vec<Archetype>,
    index: HashMap<TraitTag, usize>,
}

impl ArchetypeRegistry {
    /// Builds a registry, keeping the given order.
    ///
    /// # Errors
    ///
    /// Returns `StructuralError::DuplicateArchetype` if two archetypes share
    /// an id.
    pub fn new(archetypes: Vec<Archetype>) -> Result<Self, StructuralError> {
        let mut index = HashMap::with_capacity(archetypes.len());
        for (position, archetype) in archetypes.iter().enumerate() {
            if index.insert(archetype.id.clone(), position).is_some() {
                return Err(StructuralError::DuplicateArchetype(archetype.id.clone()));
            }
        }
        Ok(Self { archetypes, index })
    }

    /// Finds the archetype for a trait.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::ArchetypeUnavailable` if no archetype is
    /// registered for `tag`. No fallback is substituted.
    pub fn lookup(&self, tag: &TraitTag) -> Result<&Archetype, ResolutionError> {
        self.index
            .get(tag)
            .map(|&position| &self.archetypes[position])
            .ok_or_else(|| ResolutionError::ArchetypeUnavailable(tag.clone()))
    }

    /// Whether `tag` has an archetype.
    #[must_use]
    pub fn contains(&self, tag: &TraitTag) -> bool {
        self.index.contains_key(tag)
    }

    /// Registration position of `tag`.
    #[must_use]
    pub fn position(&self, tag: &TraitTag) -> Option<usize> {
        self.index.get(tag).copied()
    }

    /// Archetypes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Archetype> {
        self.archetypes.iter()
    }

    /// Number of registered archetypes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    /// Whether no archetype is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}
