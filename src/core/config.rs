//! Simulation configuration with documented constants
//!
//! All tunable numbers are collected here with explanations of their purpose
//! and how they interact with each other. Every section deserializes with
//! `serde(default)`, so a TOML file only needs the keys it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::WorldSeed;

/// Top-level configuration for a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub world: WorldConfig,
    pub geography: GeographyConfig,
    pub climate: ClimateConfig,
    pub ecosystem: EcosystemConfig,
    pub civilization: CivilizationConfig,
    pub kernel: KernelConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for every random stream of the run
    pub seed: WorldSeed,

    /// Planet name. Generated from the seed when absent.
    pub planet_name: Option<String>,

    /// Grid width in cells. The map wraps east-west.
    pub width: u32,

    /// Grid height in cells, pole to pole
    pub height: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            planet_name: None,
            width: 64,
            height: 48,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeographyConfig {
    /// Fraction of the surface above sea level
    ///
    /// When unset, each planet rolls a value between 0.25 and 0.75.
    pub land_fraction: Option<f32>,

    /// Octaves of the elevation and moisture noise
    ///
    /// More octaves add finer coastline detail at a linear cost.
    pub noise_octaves: usize,

    /// Number of noise features across the map width
    ///
    /// At 3.0 a 64-wide map holds two or three continents.
    pub noise_frequency: f64,

    /// Normalized land elevation above which cells become mountains
    pub mountain_level: f32,

    /// Radius (cells) over which open water raises land moisture
    pub moisture_radius: u32,

    /// How strongly altitude cools a cell's base temperature
    pub altitude_cooling: f32,
}

impl Default for GeographyConfig {
    fn default() -> Self {
        Self {
            land_fraction: None,
            noise_octaves: 6,
            noise_frequency: 3.0,
            mountain_level: 0.8,
            moisture_radius: 6,
            altitude_cooling: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateConfig {
    /// Length of the seasonal cycle in ticks
    ///
    /// Each season covers a quarter of the cycle. At 4, every tick is
    /// a different season.
    pub years_per_cycle: u32,

    /// Fraction of the gap to the neighbor mean closed each tick
    pub diffusion_rate: f32,

    /// Fraction of the upwind value carried into a cell each tick
    pub advection_rate: f32,

    /// Largest temperature change a cell may take in one tick
    ///
    /// Keeps the field stable regardless of how sharp the forcing is.
    pub max_temperature_delta: f32,

    /// Largest precipitation change a cell may take in one tick
    pub max_precipitation_delta: f32,

    /// Number of ocean currents
    pub ocean_currents: usize,

    /// Largest heading change of a current per tick (radians)
    pub current_drift: f32,

    /// Chance per tick that a regional weather front forms
    pub weather_front_chance: f32,

    /// Temperature added per unit of accumulated global warming
    pub warming_sensitivity: f32,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            years_per_cycle: 4,
            diffusion_rate: 0.1,
            advection_rate: 0.05,
            max_temperature_delta: 0.05,
            max_precipitation_delta: 0.08,
            ocean_currents: 6,
            current_drift: 0.05,
            weather_front_chance: 0.3,
            warming_sensitivity: 0.2,
        }
    }
}

/// Relative weight of each factor in habitat suitability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuitabilityWeights {
    pub biome: f32,
    pub thermal: f32,
    pub moisture: f32,
}

impl Default for SuitabilityWeights {
    fn default() -> Self {
        Self {
            biome: 0.5,
            thermal: 0.3,
            moisture: 0.2,
        }
    }
}

impl SuitabilityWeights {
    /// Weights scaled to sum to 1
    pub fn normalized(&self) -> Self {
        let total = self.biome + self.thermal + self.moisture;
        if total <= 0.0 {
            return Self::default();
        }
        Self {
            biome: self.biome / total,
            thermal: self.thermal / total,
            moisture: self.moisture / total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcosystemConfig {
    // === SEEDING ===
    pub initial_herbivores: u32,
    pub initial_predators: u32,
    pub initial_decomposers: u32,

    /// Population range for seeded species
    pub initial_population_min: u64,
    pub initial_population_max: u64,

    // === HABITAT ===
    pub suitability_weights: SuitabilityWeights,

    /// Cell fitness at or above which a cell counts as habitat
    pub habitat_threshold: f32,

    /// Individuals supported per fully suitable habitat cell
    ///
    /// Carrying capacity is this times suitability times habitat area,
    /// divided by a body-size factor.
    pub carrying_capacity_scale: f32,

    // === POPULATION DYNAMICS ===
    /// Maximum per-tick growth rate at full fecundity
    pub growth_rate: f32,

    /// Largest fraction of a population lost to overcrowding in one tick
    pub max_decline: f32,

    /// Fraction lost per tick when a species has no food or habitat
    ///
    /// At 0.25 a stranded population of 1,000 is gone in about 13 ticks.
    pub starvation_rate: f32,

    /// Scales how much prey a linked predator removes
    pub attack_rate: f32,

    /// Cap on the fraction of a prey population lost to predation per tick
    pub max_predation_loss: f32,

    /// Scales how much predators grow from successful hunting
    pub conversion_efficiency: f32,

    /// Prey individuals needed to fully feed one predator
    pub prey_per_predator: f32,

    /// Decomposer capacity as a fraction of the living biomass
    pub decomposer_biomass_fraction: f32,

    /// Minimum predator/prey compatibility for a trophic link
    pub min_link_compatibility: f32,

    /// Amplitude of the uniform noise added to growth rates
    pub population_noise: f32,

    /// Populations below this round to zero and go extinct
    pub min_viable_population: u64,

    // === EVOLUTION ===
    /// Base speciation chance per tick for a large population
    pub mutation_rate: f32,

    /// Largest trait perturbation applied to a new species
    pub mutation_scale: f32,

    /// Populations below this never speciate
    pub min_speciation_population: u64,

    /// Population at which speciation reaches half its base rate
    pub speciation_half_saturation: f32,

    /// Chance a new species shifts to an adjacent trophic role
    pub role_shift_chance: f32,

    /// Upper bound on the live species count. Speciation pauses at the cap.
    pub max_live_species: usize,

    /// Largest intelligence gain per tick under full selection pressure
    pub intelligence_drift_rate: f32,

    /// How much fitness intelligence confers
    ///
    /// Zero turns intelligence into a pure random walk.
    pub intelligence_fitness_bonus: f32,
}

impl Default for EcosystemConfig {
    fn default() -> Self {
        Self {
            initial_herbivores: 8,
            initial_predators: 4,
            initial_decomposers: 3,
            initial_population_min: 1_000,
            initial_population_max: 5_000,
            suitability_weights: SuitabilityWeights::default(),
            habitat_threshold: 0.4,
            carrying_capacity_scale: 50.0,
            growth_rate: 0.4,
            max_decline: 0.5,
            starvation_rate: 0.25,
            attack_rate: 0.3,
            max_predation_loss: 0.5,
            conversion_efficiency: 0.3,
            prey_per_predator: 5.0,
            decomposer_biomass_fraction: 0.2,
            min_link_compatibility: 0.3,
            population_noise: 0.02,
            min_viable_population: 10,
            mutation_rate: 0.05,
            mutation_scale: 0.1,
            min_speciation_population: 500,
            speciation_half_saturation: 1_000.0,
            role_shift_chance: 0.1,
            max_live_species: 128,
            intelligence_drift_rate: 0.004,
            intelligence_fitness_bonus: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CivilizationConfig {
    /// Intelligence a species needs to found a civilization (inclusive)
    pub intelligence_threshold: f32,

    /// Population a species needs to found a civilization (inclusive)
    pub population_threshold: u64,

    /// Share of the species population that founds the civilization
    pub founding_population_fraction: f32,

    /// Radius of the founding territory around the root cell
    pub founding_radius: u32,

    /// Multiplier on all tech progress
    pub tech_rate: f32,

    /// A declining civilization at or below this population collapses
    pub collapse_population: u64,

    /// Most border cells a civilization claims in one tick
    pub max_expansion_cells: usize,

    /// Cells below this habitability are never claimed
    pub min_habitability: f32,

    /// Territory distance (cells) at which civilizations meet
    pub contact_distance: u32,

    /// Relation score below which war can break out
    pub war_threshold: f32,

    /// Chance per tick of a random cultural, political or economic event
    pub event_chance: f32,
}

impl Default for CivilizationConfig {
    fn default() -> Self {
        Self {
            intelligence_threshold: 0.7,
            population_threshold: 5_000,
            founding_population_fraction: 0.1,
            founding_radius: 2,
            tech_rate: 1.0,
            collapse_population: 100,
            max_expansion_cells: 3,
            min_habitability: 0.2,
            contact_distance: 4,
            war_threshold: -0.7,
            event_chance: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Real-time cadence of the runner
    pub ticks_per_second: f32,

    /// Chance per tick of a global catastrophe
    pub catastrophe_chance: f32,

    /// Chance per tick of a breakthrough discovery for one civilization
    pub discovery_chance: f32,

    /// Tech progress granted by a discovery on the following tick
    pub discovery_bias: f32,

    /// Global warming added per industrial-or-later civilization per tick
    pub emissions_per_industrial: f32,

    /// Most recent events kept in the kernel's history log (0 keeps all).
    /// Older events still reach the event sink.
    pub history_limit: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 1.0,
            catastrophe_chance: 0.002,
            discovery_chance: 0.02,
            discovery_bias: 0.2,
            emissions_per_industrial: 0.0005,
            history_limit: 10_000,
        }
    }
}

fn check_unit(name: &str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SimError::Configuration(format!("{name} must be in [0, 1], got {value}")));
    }
    Ok(())
}

fn check_positive(name: &str, value: f32) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(SimError::Configuration(format!("{name} must be positive, got {value}")));
    }
    Ok(())
}

impl SimulationConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(text)?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SimError::Configuration(e.to_string()))
    }

    /// Validate that all values are consistent
    pub fn validate(&self) -> Result<()> {
        let w = &self.world;
        if w.width == 0 || w.height == 0 {
            return Err(SimError::Configuration(format!(
                "world dimensions must be positive, got {}x{}",
                w.width, w.height
            )));
        }

        let g = &self.geography;
        if let Some(fraction) = g.land_fraction {
            check_unit("geography.land_fraction", fraction)?;
        }
        if g.noise_octaves == 0 {
            return Err(SimError::Configuration("geography.noise_octaves must be at least 1".into()));
        }
        check_positive("geography.noise_frequency", g.noise_frequency as f32)?;
        check_unit("geography.mountain_level", g.mountain_level)?;
        check_unit("geography.altitude_cooling", g.altitude_cooling)?;

        let c = &self.climate;
        if c.years_per_cycle == 0 {
            return Err(SimError::Configuration("climate.years_per_cycle must be at least 1".into()));
        }
        check_unit("climate.diffusion_rate", c.diffusion_rate)?;
        check_unit("climate.advection_rate", c.advection_rate)?;
        check_positive("climate.max_temperature_delta", c.max_temperature_delta)?;
        check_positive("climate.max_precipitation_delta", c.max_precipitation_delta)?;
        check_unit("climate.weather_front_chance", c.weather_front_chance)?;

        let e = &self.ecosystem;
        if e.initial_population_min > e.initial_population_max {
            return Err(SimError::Configuration(format!(
                "ecosystem.initial_population_min ({}) exceeds initial_population_max ({})",
                e.initial_population_min, e.initial_population_max
            )));
        }
        if e.initial_population_min < e.min_viable_population {
            return Err(SimError::Configuration(
                "ecosystem.initial_population_min is below min_viable_population".into(),
            ));
        }
        let weights = e.suitability_weights;
        if weights.biome < 0.0 || weights.thermal < 0.0 || weights.moisture < 0.0 {
            return Err(SimError::Configuration("suitability weights must be non-negative".into()));
        }
        if weights.biome + weights.thermal + weights.moisture <= 0.0 {
            return Err(SimError::Configuration("suitability weights must not all be zero".into()));
        }
        check_unit("ecosystem.habitat_threshold", e.habitat_threshold)?;
        check_positive("ecosystem.carrying_capacity_scale", e.carrying_capacity_scale)?;
        check_unit("ecosystem.max_decline", e.max_decline)?;
        check_unit("ecosystem.starvation_rate", e.starvation_rate)?;
        check_unit("ecosystem.max_predation_loss", e.max_predation_loss)?;
        check_positive("ecosystem.prey_per_predator", e.prey_per_predator)?;
        check_unit("ecosystem.mutation_rate", e.mutation_rate)?;
        check_unit("ecosystem.mutation_scale", e.mutation_scale)?;
        check_unit("ecosystem.role_shift_chance", e.role_shift_chance)?;
        check_positive("ecosystem.speciation_half_saturation", e.speciation_half_saturation)?;
        if e.min_viable_population == 0 {
            return Err(SimError::Configuration("ecosystem.min_viable_population must be at least 1".into()));
        }

        let civ = &self.civilization;
        check_unit("civilization.intelligence_threshold", civ.intelligence_threshold)?;
        check_unit("civilization.founding_population_fraction", civ.founding_population_fraction)?;
        check_unit("civilization.min_habitability", civ.min_habitability)?;
        check_unit("civilization.event_chance", civ.event_chance)?;
        if civ.population_threshold == 0 {
            return Err(SimError::Configuration("civilization.population_threshold must be at least 1".into()));
        }

        let k = &self.kernel;
        check_positive("kernel.ticks_per_second", k.ticks_per_second)?;
        check_unit("kernel.catastrophe_chance", k.catastrophe_chance)?;
        check_unit("kernel.discovery_chance", k.discovery_chance)?;

        Ok(())
    }
}
