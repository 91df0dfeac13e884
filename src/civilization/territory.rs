//! Territory: founding, expansion and the contested-cell rule
//!
//! All claims of a tick are gathered first and resolved together. A cell
//! claimed by several civilizations goes to the highest tech stage, then
//! the largest population, then the lowest id. A cell that already has an
//! owner only changes hands when the claimant's stage is strictly higher.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use ordered_float::OrderedFloat;

use crate::civilization::civilization::{Civilization, CivilizationSet, TechStage};
use crate::climate::{CellClimate, ClimateState};
use crate::core::types::{CellCoord, CivilizationId};
use crate::geography::{Cell, Geography};

/// How well a settled population can live in a cell (0-1)
pub fn habitability(cell: &Cell, climate: &CellClimate) -> f32 {
    if cell.is_water {
        return 0.0;
    }
    let quality = cell.biome.settlement_quality();
    let thermal = (1.0 - (climate.temperature - 0.55).abs() * 2.0).clamp(0.0, 1.0);
    let wet = 0.4 + 0.6 * climate.precipitation.clamp(0.0, 1.0);
    (quality * (0.5 + 0.5 * thermal) * wet).clamp(0.0, 1.0)
}

pub fn mean_habitability(territory: &BTreeSet<CellCoord>, geography: &Geography, climate: &ClimateState) -> f32 {
    if territory.is_empty() {
        return 0.0;
    }
    let total: f32 = territory
        .iter()
        .map(|&c| {
            let i = geography.index(c);
            habitability(&geography.cells()[i], &climate.cells[i])
        })
        .sum();
    total / territory.len() as f32
}

/// Owner of each cell, indexed like the geography grid
pub fn owner_map(civilizations: &CivilizationSet, geography: &Geography) -> Vec<Option<CivilizationId>> {
    let mut owners = vec![None; geography.cell_count()];
    for civ in civilizations.live() {
        for &cell in &civ.territory {
            if geography.contains(cell) {
                owners[geography.index(cell)] = Some(civ.id);
            }
        }
    }
    owners
}

/// Pick the founding territory: the best unclaimed land cell as root, plus
/// unclaimed land within `radius` of it
pub fn founding_territory(
    ranked: &[(CellCoord, f32)],
    geography: &Geography,
    owners: &[Option<CivilizationId>],
    radius: u32,
) -> Option<(CellCoord, BTreeSet<CellCoord>)> {
    let root = ranked.iter().map(|(c, _)| *c).find(|c| owners[geography.index(*c)].is_none())?;
    let territory = geography
        .land_within(root, radius)
        .into_iter()
        .filter(|c| owners[geography.index(*c)].is_none())
        .collect();
    Some((root, territory))
}

/// A civilization's bid for one cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Claim {
    pub claimant: CivilizationId,
    pub cell: CellCoord,
    pub stage: TechStage,
    pub population: u64,
}

/// Border cells `civ` could take, best first
pub fn expansion_candidates(
    civ: &Civilization,
    geography: &Geography,
    climate: &ClimateState,
    owners: &[Option<CivilizationId>],
    stages: &BTreeMap<CivilizationId, TechStage>,
    min_habitability: f32,
) -> Vec<CellCoord> {
    let mut seen = BTreeSet::new();
    let mut scored = Vec::new();
    for &cell in &civ.territory {
        for neighbor in geography.neighbors(cell) {
            if civ.territory.contains(&neighbor) || !seen.insert(neighbor) {
                continue;
            }
            let i = geography.index(neighbor);
            let score = habitability(&geography.cells()[i], &climate.cells[i]);
            if score < min_habitability {
                continue;
            }
            let open = match owners[i] {
                None => true,
                Some(owner) => stages.get(&owner).is_some_and(|s| civ.tech_stage > *s),
            };
            if open {
                scored.push((neighbor, score));
            }
        }
    }
    scored.sort_by_key(|&(c, s)| (Reverse(OrderedFloat(s)), c));
    scored.into_iter().map(|(c, _)| c).collect()
}

/// A resolved transfer of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub cell: CellCoord,
    pub to: CivilizationId,
    pub from: Option<CivilizationId>,
}

/// Resolve every claim of the tick at once
pub fn resolve_claims(
    claims: &[Claim],
    geography: &Geography,
    owners: &[Option<CivilizationId>],
    stages: &BTreeMap<CivilizationId, TechStage>,
) -> Vec<Transfer> {
    let mut by_cell: BTreeMap<CellCoord, Vec<&Claim>> = BTreeMap::new();
    for claim in claims {
        by_cell.entry(claim.cell).or_default().push(claim);
    }

    let mut transfers = Vec::new();
    for (cell, bids) in by_cell {
        let Some(winner) = bids
            .iter()
            .max_by_key(|c| (c.stage, c.population, Reverse(c.claimant)))
        else {
            continue;
        };
        let current = owners[geography.index(cell)];
        match current {
            Some(owner) if owner == winner.claimant => continue,
            Some(owner) => {
                let owner_stage = stages.get(&owner).copied().unwrap_or(TechStage::Primitive);
                if winner.stage <= owner_stage {
                    continue;
                }
            }
            None => {}
        }
        transfers.push(Transfer { cell, to: winner.claimant, from: current });
    }
    transfers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geography::{BiomeKind, PlanetTraits};

    fn plains(width: u32, height: u32) -> Geography {
        let cell = Cell {
            elevation: 0.6,
            is_water: false,
            biome: BiomeKind::Plains,
            moisture: 0.5,
            base_temperature: 0.55,
        };
        let planet = PlanetTraits { axial_tilt: 0.0, land_fraction: 1.0, tectonic_activity: 0.1, year_length_days: 300 };
        Geography::from_parts("Flat".into(), width, height, 0.1, planet, vec![cell; (width * height) as usize])
    }

    fn claim(id: u32, x: u32, stage: TechStage, population: u64) -> Claim {
        Claim { claimant: CivilizationId(id), cell: CellCoord::new(x, 0), stage, population }
    }

    #[test]
    fn test_higher_stage_wins_contest() {
        let geo = plains(5, 1);
        let owners = vec![None; 5];
        let claims = [
            claim(0, 2, TechStage::Primitive, 9_000),
            claim(1, 2, TechStage::Agricultural, 100),
        ];
        let transfers = resolve_claims(&claims, &geo, &owners, &BTreeMap::new());
        assert_eq!(transfers, vec![Transfer { cell: CellCoord::new(2, 0), to: CivilizationId(1), from: None }]);
    }

    #[test]
    fn test_ties_go_to_lower_id() {
        let geo = plains(5, 1);
        let owners = vec![None; 5];
        let claims = [
            claim(4, 1, TechStage::Medieval, 500),
            claim(2, 1, TechStage::Medieval, 500),
        ];
        let transfers = resolve_claims(&claims, &geo, &owners, &BTreeMap::new());
        assert_eq!(transfers[0].to, CivilizationId(2));

        // Order of submission does not matter
        let reversed = [claims[1], claims[0]];
        assert_eq!(resolve_claims(&reversed, &geo, &owners, &BTreeMap::new()), transfers);
    }

    #[test]
    fn test_owned_cell_needs_strictly_higher_stage() {
        let geo = plains(5, 1);
        let mut owners = vec![None; 5];
        owners[3] = Some(CivilizationId(9));
        let stages: BTreeMap<_, _> = [(CivilizationId(9), TechStage::Medieval)].into_iter().collect();

        let equal = [claim(1, 3, TechStage::Medieval, 1_000_000)];
        assert!(resolve_claims(&equal, &geo, &owners, &stages).is_empty());

        let higher = [claim(1, 3, TechStage::Industrial, 10)];
        let transfers = resolve_claims(&higher, &geo, &owners, &stages);
        assert_eq!(transfers[0].from, Some(CivilizationId(9)));
    }

    #[test]
    fn test_habitability_of_water_is_zero() {
        let water = Cell {
            elevation: 0.1,
            is_water: true,
            biome: BiomeKind::Ocean,
            moisture: 1.0,
            base_temperature: 0.5,
        };
        let climate = CellClimate { temperature: 0.55, precipitation: 0.5, wind: (0.0, 0.0) };
        assert_eq!(habitability(&water, &climate), 0.0);
    }

    #[test]
    fn test_founding_skips_owned_root() {
        let geo = plains(6, 6);
        let mut owners = vec![None; 36];
        owners[geo.index(CellCoord::new(2, 2))] = Some(CivilizationId(0));
        let ranked = vec![(CellCoord::new(2, 2), 0.9), (CellCoord::new(4, 4), 0.8)];
        let (root, territory) = founding_territory(&ranked, &geo, &owners, 1).unwrap();
        assert_eq!(root, CellCoord::new(4, 4));
        assert!(territory.contains(&root));
        assert!(!territory.contains(&CellCoord::new(2, 2)));
    }
}
