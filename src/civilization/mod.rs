//! Civilization engine
//!
//! Species that cross the intelligence and population thresholds found
//! civilizations. Each tick every live civilization progresses, grows,
//! claims land and deals with its neighbors. Territory claims of a tick are
//! resolved together so the order civilizations are visited in does not
//! decide contested cells.

#[allow(clippy::module_inception)]
pub mod civilization;
pub mod diplomacy;
pub mod progression;
pub mod territory;

use std::collections::BTreeMap;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::climate::ClimateState;
use crate::core::config::{CivilizationConfig, SuitabilityWeights};
use crate::core::rng::{stream_rng, Stream};
use crate::core::types::{CatastropheKind, CivilizationId, Tick, WorldSeed};
use crate::ecosystem::{suitability, SpeciesSet};
use crate::events::EventKind;
use crate::geography::Geography;

pub use civilization::{Civilization, CivilizationSet, CultureTraits, Government, TechStage};
pub use territory::{Claim, Transfer};

/// Extra tech progress granted to a civilization for one tick
pub type DiscoveryBias = BTreeMap<CivilizationId, f32>;

/// Result of one civilization tick
#[derive(Debug, Clone)]
pub struct CivilizationStep {
    pub civilizations: CivilizationSet,
    pub events: Vec<EventKind>,
    /// Live civilizations at Industrial stage or later
    pub industrial_count: u32,
}

pub struct CivilizationEngine {
    config: CivilizationConfig,
    weights: SuitabilityWeights,
    rng: ChaCha8Rng,
}

impl CivilizationEngine {
    pub fn new(config: CivilizationConfig, seed: WorldSeed) -> Self {
        Self::with_rng(config, stream_rng(seed, Stream::Civilization))
    }

    pub fn with_rng(config: CivilizationConfig, rng: ChaCha8Rng) -> Self {
        Self { config, weights: SuitabilityWeights::default().normalized(), rng }
    }

    /// Use these weights when choosing where a new civilization settles
    pub fn with_suitability(mut self, weights: SuitabilityWeights) -> Self {
        self.weights = weights.normalized();
        self
    }

    pub fn config(&self) -> &CivilizationConfig {
        &self.config
    }

    pub fn rng(&self) -> &ChaCha8Rng {
        &self.rng
    }

    pub fn advance(
        &mut self,
        species: &SpeciesSet,
        civilizations: &CivilizationSet,
        geography: &Geography,
        climate: &ClimateState,
        bias: &DiscoveryBias,
        tick: Tick,
    ) -> CivilizationStep {
        let cfg = &self.config;
        let rng = &mut self.rng;
        let mut next = civilizations.clone();
        let mut events = Vec::new();

        events.extend(promote(species, &mut next, geography, climate, &self.weights, cfg, tick, rng));

        // Internal development, in id order
        let ids: Vec<CivilizationId> = next.live().map(|c| c.id).collect();
        for &id in &ids {
            let Some(civ) = next.get_mut(id) else { continue };
            let intelligence = species.get(civ.founding_species).map(|s| s.intelligence).unwrap_or(0.0);

            let gain = progression::tech_gain(civ, intelligence, cfg) + bias.get(&id).copied().unwrap_or(0.0);
            civ.tech_progress += gain;
            if let Some((from, to)) = progression::try_advance(civ, rng) {
                tracing::info!(civ = %civ.name, from = from.name(), to = to.name(), "Tech advance");
                events.push(EventKind::TechAdvance { civilization: id, from, to });
            }

            progression::drift_culture(civ, rng);
            if rng.gen::<f32>() < cfg.event_chance {
                events.push(progression::random_event(civ, rng));
            }

            let before = civ.population;
            let habitability = territory::mean_habitability(&civ.territory, geography, climate);
            civ.population = progression::grow(civ, habitability);
            civ.decline_streak = if civ.population < before { civ.decline_streak + 1 } else { 0 };
        }

        expand(&mut next, geography, climate, cfg, rng);
        events.extend(diplomacy::run(&mut next, geography, cfg, rng));

        for civ in next.all_mut().iter_mut().filter(|c| c.is_alive()) {
            let cause = if civ.population == 0 {
                Some("population lost")
            } else if civ.territory.is_empty() {
                Some("territory lost")
            } else if civ.decline_streak > 0 && civ.population <= cfg.collapse_population {
                Some("decline")
            } else {
                None
            };
            if let Some(cause) = cause {
                tracing::warn!(civ = %civ.name, cause, "Civilization collapsed");
                civ.collapse(tick);
                events.push(EventKind::Collapse { civilization: civ.id, name: civ.name.clone(), cause: cause.into() });
            }
        }

        let industrial_count = next.live().filter(|c| c.tech_stage.emits()).count() as u32;
        tracing::debug!(tick, live = next.live_count(), events = events.len(), "Civilizations advanced");

        CivilizationStep { civilizations: next, events, industrial_count }
    }

    /// Apply a catastrophe's toll. Returns collapse events.
    pub fn apply_catastrophe(
        &mut self,
        civilizations: &mut CivilizationSet,
        kind: CatastropheKind,
        severity: f32,
        tick: Tick,
    ) -> Vec<EventKind> {
        let mut events = Vec::new();
        for civ in civilizations.all_mut().iter_mut().filter(|c| c.is_alive()) {
            let loss = match kind {
                CatastropheKind::Meteorite => severity * 0.5,
                CatastropheKind::Supervolcano => severity * 0.4,
                // Power grids and satellites make advanced societies fragile
                CatastropheKind::SolarFlare => severity * 0.1 * (1.0 + civ.tech_stage.index() as f32 / 2.0),
                CatastropheKind::Pandemic => severity * (0.3 + self.rng.gen_range(0.0..0.2)),
            }
            .clamp(0.0, 1.0);

            civ.population = (civ.population as f64 * (1.0 - loss as f64)).round() as u64;
            civ.culture.stability -= 0.1 * severity;
            civ.culture.clamp();
            civ.decline_streak += 1;

            if civ.population <= self.config.collapse_population {
                let cause = format!("catastrophe: {}", kind.name());
                tracing::warn!(civ = %civ.name, cause = %cause, "Civilization collapsed");
                civ.collapse(tick);
                events.push(EventKind::Collapse { civilization: civ.id, name: civ.name.clone(), cause });
            }
        }
        events
    }
}

#[allow(clippy::too_many_arguments)]
fn promote<R: Rng>(
    species: &SpeciesSet,
    civilizations: &mut CivilizationSet,
    geography: &Geography,
    climate: &ClimateState,
    weights: &SuitabilityWeights,
    cfg: &CivilizationConfig,
    tick: Tick,
    rng: &mut R,
) -> Vec<EventKind> {
    let mut events = Vec::new();
    let founders = civilizations.founders();
    let candidates = species.live().filter(|s| {
        !founders.contains(&s.id)
            && s.intelligence >= cfg.intelligence_threshold
            && s.population >= cfg.population_threshold
    });

    for s in candidates {
        let owners = territory::owner_map(civilizations, geography);
        let ranked = suitability::ranked_land_cells(s, geography, climate, weights);
        let Some((root, land)) = territory::founding_territory(&ranked, geography, &owners, cfg.founding_radius) else {
            tracing::debug!(species = %s.name, "No free land to settle");
            continue;
        };

        let id = civilizations.allocate_id();
        let population = ((s.population as f64 * cfg.founding_population_fraction as f64).round() as u64).max(1);
        let mut civ = Civilization::new(id, civilization::random_civilization_name(rng), s.id, tick, land, population);
        civ.culture = CultureTraits::random(rng);

        tracing::info!(civ = %civ.name, species = %s.name, root = %root, "Civilization founded");
        events.push(EventKind::CivilizationFounded { civilization: id, species: s.id, name: civ.name.clone(), root });
        civilizations.insert(civ);
    }
    events
}

/// Gather every civilization's claims, then resolve and apply them together
fn expand<R: Rng>(
    civilizations: &mut CivilizationSet,
    geography: &Geography,
    climate: &ClimateState,
    cfg: &CivilizationConfig,
    rng: &mut R,
) {
    let owners = territory::owner_map(civilizations, geography);
    let stages: BTreeMap<CivilizationId, TechStage> = civilizations.live().map(|c| (c.id, c.tech_stage)).collect();

    let mut claims = Vec::new();
    for civ in civilizations.live() {
        let chance = 0.1 * (civ.tech_stage.index() + 1) as f32 * (civ.population as f32 / 10_000.0).min(1.0);
        if rng.gen::<f32>() >= chance {
            continue;
        }
        let candidates = territory::expansion_candidates(civ, geography, climate, &owners, &stages, cfg.min_habitability);
        claims.extend(candidates.into_iter().take(cfg.max_expansion_cells).map(|cell| Claim {
            claimant: civ.id,
            cell,
            stage: civ.tech_stage,
            population: civ.population,
        }));
    }

    for transfer in territory::resolve_claims(&claims, geography, &owners, &stages) {
        if let Some(from) = transfer.from {
            if let Some(loser) = civilizations.get_mut(from) {
                loser.territory.remove(&transfer.cell);
            }
        }
        if let Some(to) = civilizations.get_mut(transfer.to) {
            to.territory.insert(transfer.cell);
        }
    }
}
