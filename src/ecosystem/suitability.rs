//! Habitat suitability
//!
//! Fitness of a species in one cell is a weighted sum of biome affinity,
//! thermal fit and moisture fit. With normalized weights it stays in [0, 1].

use ordered_float::OrderedFloat;

use crate::climate::{CellClimate, ClimateState};
use crate::core::config::SuitabilityWeights;
use crate::core::types::CellCoord;
use crate::ecosystem::species::Species;
use crate::ecosystem::traits::TraitKind;
use crate::geography::{Cell, Geography};

/// Summary of where a species can live this tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HabitatAssessment {
    /// Mean fitness over the habitat cells (0-1)
    pub suitability: f32,
    /// Cells at or above the habitat threshold
    pub habitat_area: usize,
}

fn preference_fit(value: f32, preferred: f32, tolerance: f32) -> f32 {
    (1.0 - (value - preferred).abs() / tolerance).clamp(0.0, 1.0)
}

/// Fitness of `species` in one cell. `weights` must already be normalized.
pub fn cell_fitness(species: &Species, cell: &Cell, climate: &CellClimate, weights: &SuitabilityWeights) -> f32 {
    let adaptability = species.trait_value(TraitKind::Adaptability);

    let biome = species.habitat.get(cell.biome);
    let thermal = preference_fit(
        climate.temperature,
        species.trait_value(TraitKind::ThermalPreference),
        0.15 + 0.35 * adaptability,
    );
    let moisture = preference_fit(
        climate.precipitation,
        species.trait_value(TraitKind::MoisturePreference),
        0.2 + 0.3 * adaptability,
    );

    let fitness = weights.biome * biome + weights.thermal * thermal + weights.moisture * moisture;
    fitness.clamp(0.0, 1.0)
}

pub fn assess(
    species: &Species,
    geography: &Geography,
    climate: &ClimateState,
    weights: &SuitabilityWeights,
    threshold: f32,
) -> HabitatAssessment {
    let mut total = 0.0;
    let mut area = 0;
    for (cell, cell_climate) in geography.cells().iter().zip(&climate.cells) {
        let fitness = cell_fitness(species, cell, cell_climate, weights);
        if fitness >= threshold {
            total += fitness;
            area += 1;
        }
    }
    HabitatAssessment {
        suitability: if area > 0 { total / area as f32 } else { 0.0 },
        habitat_area: area,
    }
}

/// Land cells ordered from most to least suitable, ties broken by position
pub fn ranked_land_cells(
    species: &Species,
    geography: &Geography,
    climate: &ClimateState,
    weights: &SuitabilityWeights,
) -> Vec<(CellCoord, f32)> {
    let mut ranked: Vec<(usize, f32)> = geography
        .cells()
        .iter()
        .zip(&climate.cells)
        .enumerate()
        .filter(|(_, (cell, _))| !cell.is_water)
        .map(|(i, (cell, cell_climate))| (i, cell_fitness(species, cell, cell_climate, weights)))
        .collect();
    ranked.sort_by_key(|&(i, fitness)| (std::cmp::Reverse(OrderedFloat(fitness)), i));
    ranked.into_iter().map(|(i, f)| (geography.coord(i), f)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::ClimateEngine;
    use crate::core::config::{ClimateConfig, GeographyConfig};
    use crate::core::types::SpeciesId;
    use crate::ecosystem::species::{HabitatAffinity, TrophicRole};
    use crate::ecosystem::traits::TraitVector;
    use crate::geography::{generate, BiomeKind};

    fn species(affinity: f32) -> Species {
        Species::new(
            SpeciesId(0),
            "Testus",
            TrophicRole::Herbivore,
            TraitVector::default(),
            HabitatAffinity::uniform(affinity),
            1000,
        )
    }

    #[test]
    fn test_fitness_in_unit_range() {
        let weights = SuitabilityWeights::default().normalized();
        let cell = Cell {
            elevation: 0.6,
            is_water: false,
            biome: BiomeKind::Forest,
            moisture: 0.5,
            base_temperature: 0.5,
        };
        let perfect = CellClimate { temperature: 0.5, precipitation: 0.5, wind: (0.0, 0.0) };
        let harsh = CellClimate { temperature: 0.0, precipitation: 1.0, wind: (0.0, 0.0) };

        let s = species(1.0);
        assert!((cell_fitness(&s, &cell, &perfect, &weights) - 1.0).abs() < 1e-6);
        let low = cell_fitness(&s, &cell, &harsh, &weights);
        assert!((0.0..1.0).contains(&low));
    }

    #[test]
    fn test_no_affinity_shrinks_habitat() {
        let geo = generate(4, 32, 24, &GeographyConfig::default()).unwrap();
        let climate = ClimateEngine::new(ClimateConfig::default(), 4).initial_state(&geo);
        let weights = SuitabilityWeights::default().normalized();

        let generalist = assess(&species(1.0), &geo, &climate, &weights, 0.4);
        let stranger = assess(&species(0.0), &geo, &climate, &weights, 0.6);
        assert!(generalist.habitat_area > 0);
        assert!(generalist.suitability >= 0.4);
        assert_eq!(stranger.habitat_area, 0);
        assert_eq!(stranger.suitability, 0.0);
    }

    #[test]
    fn test_ranked_cells_are_land_and_sorted() {
        let geo = generate(6, 32, 24, &GeographyConfig::default()).unwrap();
        let climate = ClimateEngine::new(ClimateConfig::default(), 6).initial_state(&geo);
        let weights = SuitabilityWeights::default().normalized();
        let ranked = ranked_land_cells(&species(0.7), &geo, &climate, &weights);
        assert_eq!(ranked.len(), geo.land_cell_count());
        for pair in ranked.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
        assert!(ranked.iter().all(|(c, _)| !geo.cell(*c).unwrap().is_water));
    }
}
