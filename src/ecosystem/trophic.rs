//! Predator-prey links
//!
//! Links are derived from the species set every tick and never stored as
//! state of their own.

use serde::{Deserialize, Serialize};

use crate::core::types::SpeciesId;
use crate::ecosystem::species::{Species, SpeciesSet, TrophicRole};
use crate::ecosystem::traits::TraitKind;

/// Predators only take other predators this much smaller than themselves
const PREDATOR_SIZE_MARGIN: f32 = 1.2;

/// Habitat overlap below which two species never meet
const MIN_OVERLAP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrophicLink {
    pub predator: SpeciesId,
    pub prey: SpeciesId,
    /// Hunting pressure (0-1)
    pub pressure: f32,
}

/// How well `predator` is built to catch `prey` (0-1)
pub fn compatibility(predator: &Species, prey: &Species) -> f32 {
    let speed = predator.trait_value(TraitKind::Speed) - prey.trait_value(TraitKind::Speed);
    let size = predator.trait_value(TraitKind::Size) - prey.trait_value(TraitKind::Size);
    let hidden = prey.trait_value(TraitKind::Camouflage);
    (0.5 + 0.5 * speed + 0.3 * size - 0.3 * hidden).clamp(0.0, 1.0)
}

pub fn can_hunt(predator: &Species, prey: &Species) -> bool {
    if !predator.is_alive() || !prey.is_alive() || predator.id == prey.id {
        return false;
    }
    if predator.trophic_role != TrophicRole::Predator {
        return false;
    }
    match prey.trophic_role {
        TrophicRole::Herbivore => true,
        TrophicRole::Predator => {
            prey.trait_value(TraitKind::Size) * PREDATOR_SIZE_MARGIN < predator.trait_value(TraitKind::Size)
        }
        TrophicRole::Decomposer => false,
    }
}

/// All links among live species, ordered by (predator, prey)
pub fn compute_links(species: &SpeciesSet, min_compatibility: f32) -> Vec<TrophicLink> {
    let mut links = Vec::new();
    for predator in species.live().filter(|s| s.trophic_role == TrophicRole::Predator) {
        for prey in species.live() {
            if !can_hunt(predator, prey) {
                continue;
            }
            let compat = compatibility(predator, prey);
            let overlap = predator.habitat.overlap(&prey.habitat);
            if compat >= min_compatibility && overlap >= MIN_OVERLAP {
                links.push(TrophicLink {
                    predator: predator.id,
                    prey: prey.id,
                    pressure: compat * overlap,
                });
            }
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecosystem::species::HabitatAffinity;
    use crate::ecosystem::traits::TraitVector;

    fn make(id: u32, role: TrophicRole, size: f32, speed: f32) -> Species {
        let traits = TraitVector::with(&[
            (TraitKind::Size, size),
            (TraitKind::Speed, speed),
            (TraitKind::Camouflage, 0.1),
        ])
        .unwrap();
        Species::new(SpeciesId(id), format!("S{id}"), role, traits, HabitatAffinity::uniform(0.6), 1000)
    }

    #[test]
    fn test_predator_links_to_herbivore() {
        let set = SpeciesSet::from_species(vec![
            make(0, TrophicRole::Herbivore, 0.3, 0.3),
            make(1, TrophicRole::Predator, 0.6, 0.7),
        ]);
        let links = compute_links(&set, 0.3);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].predator, SpeciesId(1));
        assert_eq!(links[0].prey, SpeciesId(0));
        assert!(links[0].pressure > 0.0 && links[0].pressure <= 1.0);
    }

    #[test]
    fn test_tombstoned_prey_breaks_link() {
        let mut set = SpeciesSet::from_species(vec![
            make(0, TrophicRole::Herbivore, 0.3, 0.3),
            make(1, TrophicRole::Predator, 0.6, 0.7),
        ]);
        set.get_mut(SpeciesId(0)).unwrap().tombstone(5, "test");
        assert!(compute_links(&set, 0.3).is_empty());
    }

    #[test]
    fn test_decomposers_are_not_prey() {
        let set = SpeciesSet::from_species(vec![
            make(0, TrophicRole::Decomposer, 0.1, 0.1),
            make(1, TrophicRole::Predator, 0.9, 0.9),
        ]);
        assert!(compute_links(&set, 0.0).is_empty());
    }

    #[test]
    fn test_predators_eat_only_smaller_predators() {
        let big = make(0, TrophicRole::Predator, 0.9, 0.8);
        let small = make(1, TrophicRole::Predator, 0.4, 0.4);
        assert!(can_hunt(&big, &small));
        assert!(!can_hunt(&small, &big));
    }
}
