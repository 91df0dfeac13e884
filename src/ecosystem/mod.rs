//! Ecosystem engine
//!
//! Each tick reads the whole species set once, computes every species'
//! update from that pre-tick view, then applies all updates as one batch.
//! Update order therefore never changes the outcome.

pub mod evolution;
pub mod population;
pub mod species;
pub mod suitability;
pub mod traits;
pub mod trophic;

use ahash::AHashMap;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::climate::ClimateState;
use crate::core::config::EcosystemConfig;
use crate::core::rng::{stream_rng, Stream};
use crate::core::types::{CatastropheKind, SpeciesId, Tick, WorldSeed};
use crate::events::EventKind;
use crate::geography::Geography;

pub use population::LimitingFactor;
pub use species::{HabitatAffinity, Species, SpeciesSet, TrophicRole};
pub use suitability::HabitatAssessment;
pub use traits::{TraitKind, TraitVector};
pub use trophic::TrophicLink;

/// Result of one ecosystem tick
#[derive(Debug, Clone)]
pub struct EcosystemStep {
    pub species: SpeciesSet,
    pub links: Vec<TrophicLink>,
    pub events: Vec<EventKind>,
    pub anomalies: u32,
}

/// Everything computed for one live species before the batch is applied
struct SpeciesUpdate {
    id: SpeciesId,
    population: u64,
    intelligence: f32,
    traits: TraitVector,
    cause: LimitingFactor,
}

pub struct EcosystemEngine {
    config: EcosystemConfig,
    rng: ChaCha8Rng,
}

impl EcosystemEngine {
    pub fn new(config: EcosystemConfig, seed: WorldSeed) -> Self {
        Self { config, rng: stream_rng(seed, Stream::Ecosystem) }
    }

    pub fn with_rng(config: EcosystemConfig, rng: ChaCha8Rng) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &EcosystemConfig {
        &self.config
    }

    pub fn rng(&self) -> &ChaCha8Rng {
        &self.rng
    }

    /// Create the starting herbivores, predators and decomposers
    pub fn seed_initial(&mut self) -> SpeciesSet {
        let cfg = &self.config;
        let rng = &mut self.rng;
        let mut set = SpeciesSet::new();

        let roles = std::iter::repeat(TrophicRole::Herbivore)
            .take(cfg.initial_herbivores as usize)
            .chain(std::iter::repeat(TrophicRole::Predator).take(cfg.initial_predators as usize))
            .chain(std::iter::repeat(TrophicRole::Decomposer).take(cfg.initial_decomposers as usize));

        for role in roles {
            let id = set.allocate_id();
            let mut traits = TraitVector::default();
            traits.set(TraitKind::Size, rng.gen_range(0.1..1.0));
            traits.set(TraitKind::Speed, rng.gen_range(0.1..0.9));
            traits.set(TraitKind::Complexity, rng.gen_range(0.1..0.5));
            traits.set(TraitKind::Adaptability, rng.gen_range(0.3..0.7));
            traits.set(TraitKind::Fecundity, rng.gen_range(0.3..0.8));
            traits.set(TraitKind::Lifespan, rng.gen_range(0.2..0.8));
            traits.set(TraitKind::ThermalPreference, rng.gen_range(0.3..0.7));
            traits.set(TraitKind::MoisturePreference, rng.gen_range(0.3..0.7));
            traits.set(TraitKind::Camouflage, rng.gen_range(0.0..0.5));
            if role == TrophicRole::Predator {
                // Hunters start bigger and faster than the average grazer
                traits.set(TraitKind::Size, traits.get(TraitKind::Size).max(0.5));
                traits.set(TraitKind::Speed, traits.get(TraitKind::Speed).max(0.5));
            }

            let population = rng.gen_range(cfg.initial_population_min..=cfg.initial_population_max);
            let habitat = HabitatAffinity::random(rng);
            let mut s = Species::new(id, species::random_species_name(rng), role, traits, habitat, population);
            s.intelligence = rng.gen_range(0.01..0.1);
            set.insert(s);
        }

        tracing::info!(species = set.len(), "Seeded initial life");
        set
    }

    /// Advance on the engine's own random stream
    pub fn advance(&mut self, species: &SpeciesSet, geography: &Geography, climate: &ClimateState, tick: Tick) -> EcosystemStep {
        let Self { config, rng } = self;
        run_tick(config, species, geography, climate, tick, rng)
    }

    /// Advance on a caller-supplied random stream
    pub fn advance_with<R: Rng>(
        &self,
        species: &SpeciesSet,
        geography: &Geography,
        climate: &ClimateState,
        tick: Tick,
        rng: &mut R,
    ) -> EcosystemStep {
        run_tick(&self.config, species, geography, climate, tick, rng)
    }

    /// Apply a catastrophe's toll. Returns extinction events.
    pub fn apply_catastrophe(
        &mut self,
        species: &mut SpeciesSet,
        kind: CatastropheKind,
        severity: f32,
        tick: Tick,
    ) -> Vec<EventKind> {
        let min_viable = self.config.min_viable_population;
        let mut events = Vec::new();

        for s in species.all_mut().iter_mut().filter(|s| s.is_alive()) {
            let mut vulnerability = 1.0 - s.trait_value(TraitKind::Adaptability);
            match kind {
                CatastropheKind::Meteorite => vulnerability *= 0.5 + 0.5 * s.trait_value(TraitKind::Size),
                CatastropheKind::Supervolcano | CatastropheKind::SolarFlare => {
                    if s.trophic_role == TrophicRole::Herbivore {
                        vulnerability *= 1.3;
                    }
                }
                CatastropheKind::Pandemic => {
                    vulnerability *= 0.5 + 0.5 * s.trait_value(TraitKind::Complexity);
                    if s.intelligence > 0.5 {
                        vulnerability *= 1.2;
                    }
                }
            }

            let impact = (severity * vulnerability).clamp(0.0, 1.0);
            let wiped_out = impact > 0.8 && self.rng.gen::<f32>() < impact - 0.8;
            let survivors = if wiped_out {
                0
            } else {
                let loss = if impact > 0.8 { impact * 0.9 } else { impact * 0.5 };
                population::project(s.population, -loss, min_viable)
            };

            if survivors == 0 {
                let cause = format!("catastrophe: {}", kind.name());
                s.tombstone(tick, cause.clone());
                events.push(EventKind::Extinction { species: s.id, name: s.name.clone(), cause });
            } else {
                s.population = survivors;
            }
        }
        events
    }
}

fn run_tick<R: Rng>(
    cfg: &EcosystemConfig,
    species: &SpeciesSet,
    geography: &Geography,
    climate: &ClimateState,
    tick: Tick,
    rng: &mut R,
) -> EcosystemStep {
    let weights = cfg.suitability_weights.normalized();
    let links = trophic::compute_links(species, cfg.min_link_compatibility);

    let populations: AHashMap<SpeciesId, f32> = species.live().map(|s| (s.id, s.population as f32)).collect();
    let biomass: f32 = species
        .live()
        .filter(|s| s.trophic_role != TrophicRole::Decomposer)
        .map(|s| s.population as f32)
        .sum();

    let mut updates = Vec::new();
    let mut anomalies = 0;

    for s in species.live() {
        let habitat = suitability::assess(s, geography, climate, &weights, cfg.habitat_threshold);
        let own = s.population.max(1) as f32;

        let mut ctx = population::GrowthContext { habitat, biomass, ..Default::default() };
        for link in &links {
            if link.predator == s.id {
                let prey = populations.get(&link.prey).copied().unwrap_or(0.0);
                ctx.food_supply += link.pressure * prey;
                ctx.hunting += link.pressure * (prey / (own * cfg.prey_per_predator)).min(1.0);
            } else if link.prey == s.id {
                let hunters = populations.get(&link.predator).copied().unwrap_or(0.0);
                ctx.predation += link.pressure * (hunters / own);
            }
        }

        let (mut rate, cause) = population::growth_rate(s, &ctx, cfg);
        if cfg.population_noise > 0.0 {
            rate += rng.gen_range(-cfg.population_noise..=cfg.population_noise);
        }
        if !rate.is_finite() {
            rate = 0.0;
            anomalies += 1;
        }

        let mut intelligence = evolution::drift_intelligence(s, habitat.suitability, cfg, rng);
        if !intelligence.is_finite() {
            intelligence = s.intelligence;
            anomalies += 1;
        }

        updates.push(SpeciesUpdate {
            id: s.id,
            population: population::project(s.population, rate, cfg.min_viable_population),
            intelligence,
            traits: evolution::drift_traits(&s.traits, rng),
            cause,
        });
    }

    // Speciation rolls use post-update populations of pre-tick parents
    let mut next = species.clone();
    let mut births = Vec::new();
    let mut live_after = updates.iter().filter(|u| u.population > 0).count();
    for update in &mut updates {
        if update.population == 0 || live_after >= cfg.max_live_species {
            continue;
        }
        let chance = evolution::speciation_chance(update.population, cfg);
        if chance <= 0.0 || rng.gen::<f32>() >= chance {
            continue;
        }
        let Some(parent) = species.get(update.id) else { continue };
        let share = (update.population as f32 * evolution::transfer_fraction(rng)).round() as u64;
        let moved = share.clamp(1, update.population.saturating_sub(1).max(1));
        if moved >= update.population {
            continue;
        }
        update.population -= moved;

        let id = next.allocate_id();
        let mut parent_view = parent.clone();
        parent_view.intelligence = update.intelligence;
        parent_view.traits = update.traits;
        births.push(evolution::descendant(&parent_view, id, moved, tick, cfg, rng));
        live_after += 1;
    }

    let mut events = Vec::new();
    for update in updates {
        let Some(s) = next.get_mut(update.id) else { continue };
        if update.population == 0 {
            let cause = update.cause.extinction_cause();
            s.tombstone(tick, cause);
            events.push(EventKind::Extinction { species: s.id, name: s.name.clone(), cause: cause.to_string() });
        } else {
            s.population = update.population;
            s.intelligence = update.intelligence;
            s.traits = update.traits;
        }
    }
    for child in births {
        if let Some(parent) = child.lineage {
            events.push(EventKind::Speciation { parent, child: child.id, name: child.name.clone() });
        }
        next.insert(child);
    }

    tracing::debug!(
        tick,
        live = next.live_count(),
        links = links.len(),
        events = events.len(),
        "Ecosystem advanced"
    );

    EcosystemStep { species: next, links, events, anomalies }
}
