//! Speciation and trait drift

use rand::Rng;

use crate::core::config::EcosystemConfig;
use crate::core::types::{SpeciesId, Tick};
use crate::ecosystem::species::Species;
use crate::ecosystem::traits::{TraitKind, TraitVector};

/// Chance per tick that a population of this size branches off a new species
pub fn speciation_chance(population: u64, cfg: &EcosystemConfig) -> f32 {
    if population < cfg.min_speciation_population {
        return 0.0;
    }
    let n = population as f32;
    cfg.mutation_rate * n / (n + cfg.speciation_half_saturation)
}

/// Share of the parent population that leaves with the new species
pub fn transfer_fraction<R: Rng>(rng: &mut R) -> f32 {
    rng.gen_range(0.1..=0.3)
}

/// Build the descendant of `parent`
pub fn descendant<R: Rng>(
    parent: &Species,
    id: SpeciesId,
    population: u64,
    tick: Tick,
    cfg: &EcosystemConfig,
    rng: &mut R,
) -> Species {
    let traits = parent.traits.mutated(cfg.mutation_scale, rng);
    let habitat = parent.habitat.mutated(cfg.mutation_scale, rng);
    let intelligence = (parent.intelligence + rng.gen_range(-cfg.mutation_scale..=cfg.mutation_scale) * 0.5).clamp(0.0, 1.0);

    let mut role = parent.trophic_role;
    if rng.gen::<f32>() < cfg.role_shift_chance {
        let options = parent.trophic_role.adjacent();
        role = options[rng.gen_range(0..options.len())];
    }

    let genus = parent.name.split(' ').next().unwrap_or(&parent.name);
    let letter = (b'a' + rng.gen_range(0..26u8)) as char;

    let mut child = Species::new(id, format!("{genus} {letter}{}", id.0), role, traits, habitat, population);
    child.intelligence = intelligence;
    child.lineage = Some(parent.id);
    child.origin_tick = tick;
    child
}

/// Intelligence after one tick of selection and noise
///
/// Harsh habitats and complex bodies reward intelligence more.
pub fn drift_intelligence<R: Rng>(species: &Species, suitability: f32, cfg: &EcosystemConfig, rng: &mut R) -> f32 {
    let n = species.population as f32;
    let pressure = (species.trait_value(TraitKind::Complexity) + (1.0 - suitability)) / 2.0;
    let selection = cfg.intelligence_drift_rate * cfg.intelligence_fitness_bonus * pressure * n / (n + 1_000.0);
    let noise = rng.gen_range(-0.25..=0.25) * cfg.intelligence_drift_rate;
    (species.intelligence + selection + noise).clamp(0.0, 1.0)
}

/// Occasionally nudge one trait; more adaptable species change more often
pub fn drift_traits<R: Rng>(traits: &TraitVector, rng: &mut R) -> TraitVector {
    let mut next = *traits;
    let chance = 0.05 * traits.get(TraitKind::Adaptability);
    if rng.gen::<f32>() < chance {
        let kind = TraitKind::ALL[rng.gen_range(0..TraitKind::COUNT)];
        next.set(kind, traits.get(kind) + rng.gen_range(-0.05..=0.05));
    }
    next
}
