//! Cross-subsystem checks run before a tick commits

use std::collections::BTreeSet;

use crate::civilization::CivilizationSet;
use crate::climate::ClimateState;
use crate::core::error::{Result, SimError};
use crate::core::types::{CellCoord, Tick};
use crate::ecosystem::SpeciesSet;
use crate::geography::Geography;

fn violation(tick: Tick, subsystem: &'static str, detail: String) -> SimError {
    SimError::ConsistencyViolation { tick, subsystem, detail }
}

/// Verify the candidate state for `tick`. The first problem found is returned.
pub fn check(
    tick: Tick,
    geography: &Geography,
    climate: &ClimateState,
    species: &SpeciesSet,
    civilizations: &CivilizationSet,
) -> Result<()> {
    if climate.cells.len() != geography.cell_count() {
        return Err(violation(
            tick,
            "climate",
            format!("{} climate cells for {} geography cells", climate.cells.len(), geography.cell_count()),
        ));
    }
    if let Some(i) = climate
        .cells
        .iter()
        .position(|c| !(c.temperature.is_finite() && c.precipitation.is_finite()))
    {
        return Err(violation(tick, "climate", format!("non-finite climate at {}", geography.coord(i))));
    }

    for s in species.all() {
        if s.is_alive() && s.population == 0 {
            return Err(violation(tick, "ecosystem", format!("{} is alive with no population", s.id)));
        }
        if !s.is_alive() && s.population != 0 {
            return Err(violation(tick, "ecosystem", format!("{} is extinct with population {}", s.id, s.population)));
        }
        if !s.traits.is_valid() || !s.intelligence.is_finite() {
            return Err(violation(tick, "ecosystem", format!("{} has invalid traits", s.id)));
        }
    }

    let mut claimed: BTreeSet<CellCoord> = BTreeSet::new();
    for civ in civilizations.all() {
        if species.get(civ.founding_species).is_none() {
            return Err(violation(
                tick,
                "civilization",
                format!("{} founded by unknown {}", civ.id, civ.founding_species),
            ));
        }
        if !civ.is_alive() {
            continue;
        }
        for &cell in &civ.territory {
            let land = geography.cell(cell).is_some_and(|c| !c.is_water);
            if !land {
                return Err(violation(tick, "civilization", format!("{} holds non-land cell {cell}", civ.id)));
            }
            if !claimed.insert(cell) {
                return Err(violation(tick, "civilization", format!("cell {cell} held twice")));
            }
        }
    }

    let founders: Vec<_> = civilizations.all().iter().map(|c| c.founding_species).collect();
    let unique: BTreeSet<_> = founders.iter().collect();
    if unique.len() != founders.len() {
        return Err(violation(tick, "civilization", "a species founded two civilizations".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::civilization::Civilization;
    use crate::core::types::{CivilizationId, SpeciesId};
    use crate::ecosystem::{HabitatAffinity, Species, TraitVector, TrophicRole};
    use crate::geography::{BiomeKind, Cell, PlanetTraits};
    use crate::climate::CellClimate;
    use crate::climate::Season;

    fn tiny() -> (Geography, ClimateState) {
        let land = Cell { elevation: 0.6, is_water: false, biome: BiomeKind::Plains, moisture: 0.5, base_temperature: 0.5 };
        let planet = PlanetTraits { axial_tilt: 0.0, land_fraction: 1.0, tectonic_activity: 0.1, year_length_days: 300 };
        let geo = Geography::from_parts("Tiny".into(), 2, 2, 0.1, planet, vec![land; 4]);
        let climate = ClimateState {
            season: Season::default(),
            cells: vec![CellClimate { temperature: 0.5, precipitation: 0.5, wind: (0.0, 0.0) }; 4],
            ocean_currents: Vec::new(),
            global_warming: 0.0,
            fronts: Vec::new(),
            shocks: Vec::new(),
        };
        (geo, climate)
    }

    fn grazer(id: u32) -> Species {
        Species::new(SpeciesId(id), "Grazer", TrophicRole::Herbivore, TraitVector::default(), HabitatAffinity::uniform(0.5), 100)
    }

    #[test]
    fn test_healthy_state_passes() {
        let (geo, climate) = tiny();
        let species = SpeciesSet::from_species(vec![grazer(0)]);
        assert!(check(1, &geo, &climate, &species, &CivilizationSet::new()).is_ok());
    }

    #[test]
    fn test_living_species_without_population_fails() {
        let (geo, climate) = tiny();
        let mut s = grazer(0);
        s.population = 0;
        let species = SpeciesSet::from_species(vec![s]);
        let err = check(4, &geo, &climate, &species, &CivilizationSet::new()).unwrap_err();
        assert!(matches!(err, SimError::ConsistencyViolation { tick: 4, subsystem: "ecosystem", .. }));
    }

    #[test]
    fn test_orphan_civilization_fails() {
        let (geo, climate) = tiny();
        let species = SpeciesSet::from_species(vec![grazer(0)]);
        let civs = CivilizationSet::from_civilizations(vec![Civilization::new(
            CivilizationId(0),
            "Ghost",
            SpeciesId(5),
            0,
            BTreeSet::new(),
            10,
        )]);
        assert!(check(1, &geo, &climate, &species, &civs).is_err());
    }

    #[test]
    fn test_shared_cell_fails() {
        let (geo, climate) = tiny();
        let species = SpeciesSet::from_species(vec![grazer(0), grazer(1)]);
        let cell: BTreeSet<CellCoord> = [CellCoord::new(0, 0)].into_iter().collect();
        let civs = CivilizationSet::from_civilizations(vec![
            Civilization::new(CivilizationId(0), "A", SpeciesId(0), 0, cell.clone(), 10),
            Civilization::new(CivilizationId(1), "B", SpeciesId(1), 0, cell, 10),
        ]);
        assert!(check(1, &geo, &climate, &species, &civs).is_err());
    }
}
