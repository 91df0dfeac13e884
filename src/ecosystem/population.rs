//! Population dynamics
//!
//! Logistic growth toward a carrying capacity derived from habitat, with
//! predation losses for prey, hunting gains for predators and starvation
//! when a species has nothing to live on.

use crate::core::config::EcosystemConfig;
use crate::ecosystem::species::{Species, TrophicRole};
use crate::ecosystem::suitability::HabitatAssessment;
use crate::ecosystem::traits::TraitKind;

/// Pre-tick inputs for one species' growth
#[derive(Debug, Clone, Copy, Default)]
pub struct GrowthContext {
    pub habitat: HabitatAssessment,
    /// Sum over linked prey of pressure times prey population
    pub food_supply: f32,
    /// Sum over links of (pressure, share of predators vs this prey) terms
    pub predation: f32,
    /// Sum over linked prey of pressure times how well they feed this predator
    pub hunting: f32,
    /// Living population of all non-decomposers
    pub biomass: f32,
}

/// What held a population back this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitingFactor {
    None,
    Crowding,
    Predation,
    Starvation,
    HabitatLoss,
}

impl LimitingFactor {
    pub fn extinction_cause(&self) -> &'static str {
        match self {
            Self::None | Self::Crowding => "population collapse",
            Self::Predation => "predation",
            Self::Starvation => "starvation",
            Self::HabitatLoss => "habitat loss",
        }
    }
}

pub fn carrying_capacity(species: &Species, ctx: &GrowthContext, cfg: &EcosystemConfig) -> f32 {
    let size_factor = 0.5 + species.trait_value(TraitKind::Size);
    let habitat_capacity =
        cfg.carrying_capacity_scale * ctx.habitat.suitability * ctx.habitat.habitat_area as f32 / size_factor;

    match species.trophic_role {
        TrophicRole::Herbivore => habitat_capacity,
        TrophicRole::Predator => {
            let needed = species.population.max(1) as f32 * cfg.prey_per_predator;
            let fed = (ctx.food_supply / needed).min(1.0);
            habitat_capacity * fed
        }
        TrophicRole::Decomposer => habitat_capacity.min(cfg.decomposer_biomass_fraction * ctx.biomass),
    }
}

/// Deterministic part of the per-tick growth rate (noise is added by the caller)
pub fn growth_rate(species: &Species, ctx: &GrowthContext, cfg: &EcosystemConfig) -> (f32, LimitingFactor) {
    let n = species.population as f32;
    let r = cfg.growth_rate * species.trait_value(TraitKind::Fecundity);
    let k = carrying_capacity(species, ctx, cfg);

    if k < 1.0 {
        let factor = match species.trophic_role {
            TrophicRole::Predator if ctx.habitat.habitat_area > 0 => LimitingFactor::Starvation,
            TrophicRole::Decomposer if ctx.habitat.habitat_area > 0 => LimitingFactor::Starvation,
            _ => LimitingFactor::HabitatLoss,
        };
        return (-cfg.starvation_rate, factor);
    }

    let mut rate = (r * (1.0 - n / k)).max(-cfg.max_decline);
    let mut factor = if rate < 0.0 { LimitingFactor::Crowding } else { LimitingFactor::None };

    if ctx.predation > 0.0 {
        let loss = (ctx.predation * cfg.attack_rate).min(cfg.max_predation_loss);
        rate -= loss;
        if rate < 0.0 {
            factor = LimitingFactor::Predation;
        }
    }
    if ctx.hunting > 0.0 {
        rate += cfg.conversion_efficiency * ctx.hunting;
    }

    (rate, factor)
}

/// Apply a rate. Anything under the viability floor rounds to zero.
pub fn project(population: u64, rate: f32, min_viable: u64) -> u64 {
    let next = (population as f64 * (1.0 + rate as f64)).round().max(0.0) as u64;
    if next < min_viable {
        0
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SpeciesId;
    use crate::ecosystem::species::HabitatAffinity;
    use crate::ecosystem::traits::TraitVector;

    fn species(role: TrophicRole, population: u64) -> Species {
        Species::new(SpeciesId(0), "Testa", role, TraitVector::default(), HabitatAffinity::uniform(0.5), population)
    }

    fn habitat(area: usize) -> HabitatAssessment {
        HabitatAssessment { suitability: 0.8, habitat_area: area }
    }

    #[test]
    fn test_logistic_growth_below_capacity() {
        let cfg = EcosystemConfig::default();
        let ctx = GrowthContext { habitat: habitat(200), ..Default::default() };
        let (rate, factor) = growth_rate(&species(TrophicRole::Herbivore, 100), &ctx, &cfg);
        assert!(rate > 0.0);
        assert_eq!(factor, LimitingFactor::None);
    }

    #[test]
    fn test_overcrowding_declines_but_bounded() {
        let cfg = EcosystemConfig::default();
        let ctx = GrowthContext { habitat: habitat(1), ..Default::default() };
        let (rate, factor) = growth_rate(&species(TrophicRole::Herbivore, 1_000_000), &ctx, &cfg);
        assert_eq!(rate, -cfg.max_decline);
        assert_eq!(factor, LimitingFactor::Crowding);
    }

    #[test]
    fn test_predator_without_prey_starves() {
        let cfg = EcosystemConfig::default();
        let ctx = GrowthContext { habitat: habitat(200), ..Default::default() };
        let (rate, factor) = growth_rate(&species(TrophicRole::Predator, 500), &ctx, &cfg);
        assert_eq!(rate, -cfg.starvation_rate);
        assert_eq!(factor, LimitingFactor::Starvation);
    }

    #[test]
    fn test_predation_reduces_growth() {
        let cfg = EcosystemConfig::default();
        let calm = GrowthContext { habitat: habitat(200), ..Default::default() };
        let hunted = GrowthContext { predation: 0.5, ..calm };
        let prey = species(TrophicRole::Herbivore, 1000);
        assert!(growth_rate(&prey, &hunted, &cfg).0 < growth_rate(&prey, &calm, &cfg).0);
    }

    #[test]
    fn test_project_rounds_to_zero_below_floor() {
        assert_eq!(project(1000, 0.1, 10), 1100);
        assert_eq!(project(12, -0.5, 10), 0);
        assert_eq!(project(100, -2.0, 10), 0);
    }
}
