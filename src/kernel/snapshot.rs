//! Read-only views of the world published after each tick

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::civilization::{Civilization, CivilizationSet, TechStage};
use crate::climate::ClimateState;
use crate::core::types::Tick;
use crate::ecosystem::{Species, SpeciesSet};
use crate::geography::Geography;
use crate::kernel::Phase;

/// Complete world view at a tick boundary. Everything is a deep copy except
/// the geography, which never changes and is shared.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub tick: Tick,
    pub phase: Phase,
    pub geography: Arc<Geography>,
    pub climate: ClimateState,
    /// Live species only
    pub species: Vec<Species>,
    /// Live civilizations only
    pub civilizations: Vec<Civilization>,
    pub stats: WorldStats,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldStats {
    pub live_species: u32,
    pub extinct_species: u32,
    pub species_population: u64,
    pub live_civilizations: u32,
    pub collapsed_civilizations: u32,
    pub civilization_population: u64,
    pub highest_stage: Option<TechStage>,
    pub mean_temperature: f32,
    pub mean_precipitation: f32,
    pub global_warming: f32,
    pub events_this_tick: u32,
}

impl WorldSnapshot {
    pub fn capture(
        tick: Tick,
        phase: Phase,
        geography: &Arc<Geography>,
        climate: &ClimateState,
        species: &SpeciesSet,
        civilizations: &CivilizationSet,
        events_this_tick: u32,
    ) -> Self {
        let live_species = species.live_count() as u32;
        let live_civilizations = civilizations.live_count() as u32;
        let stats = WorldStats {
            live_species,
            extinct_species: species.len() as u32 - live_species,
            species_population: species.total_population(),
            live_civilizations,
            collapsed_civilizations: civilizations.len() as u32 - live_civilizations,
            civilization_population: civilizations.live().map(|c| c.population).sum(),
            highest_stage: civilizations.live().map(|c| c.tech_stage).max(),
            mean_temperature: climate.mean_temperature(),
            mean_precipitation: climate.mean_precipitation(),
            global_warming: climate.global_warming,
            events_this_tick,
        };

        Self {
            tick,
            phase,
            geography: Arc::clone(geography),
            climate: climate.clone(),
            species: species.live().cloned().collect(),
            civilizations: civilizations.live().cloned().collect(),
            stats,
        }
    }

    pub fn summary(&self) -> String {
        let stage = self.stats.highest_stage.map(|s| s.name()).unwrap_or("none");
        format!(
            "Year {}: {} species ({} extinct), {} civilizations (highest stage: {}), mean temperature {:.3}",
            self.tick,
            self.stats.live_species,
            self.stats.extinct_species,
            self.stats.live_civilizations,
            stage,
            self.stats.mean_temperature,
        )
    }
}
