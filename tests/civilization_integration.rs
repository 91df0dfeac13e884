//! Integration tests for civilization rules
//!
//! - Promotion happens exactly at the intelligence and population thresholds
//! - A species founds at most one civilization, even after collapse
//! - Tech stages only move up one step at a time while a civilization lives
//! - Territory stays on land and is never shared

use std::collections::{BTreeMap, BTreeSet};

use ecosphere::civilization::{CivilizationEngine, CivilizationSet, DiscoveryBias, TechStage};
use ecosphere::climate::{ClimateEngine, ClimateState};
use ecosphere::core::config::{CivilizationConfig, ClimateConfig, GeographyConfig, SimulationConfig};
use ecosphere::core::types::{CellCoord, CivilizationId, SpeciesId};
use ecosphere::ecosystem::{HabitatAffinity, Species, SpeciesSet, TraitVector, TrophicRole};
use ecosphere::events::EventCategory;
use ecosphere::geography::{generate, Geography};
use ecosphere::kernel::Simulation;

fn planet() -> (Geography, ClimateState) {
    let geo = generate(8, 32, 24, &GeographyConfig::default()).unwrap();
    let climate = ClimateEngine::new(ClimateConfig::default(), 8).initial_state(&geo);
    (geo, climate)
}

fn thinker(id: u32, population: u64, intelligence: f32) -> Species {
    let mut s = Species::new(
        SpeciesId(id),
        format!("Cogitans {id}"),
        TrophicRole::Herbivore,
        TraitVector::default(),
        HabitatAffinity::uniform(0.7),
        population,
    );
    s.intelligence = intelligence;
    s
}

fn founded(species: Species) -> CivilizationSet {
    let (geo, climate) = planet();
    let set = SpeciesSet::from_species(vec![species]);
    let mut engine = CivilizationEngine::new(CivilizationConfig::default(), 8);
    engine.advance(&set, &CivilizationSet::new(), &geo, &climate, &DiscoveryBias::new(), 1).civilizations
}

// ============================================================================
// Promotion thresholds
// ============================================================================

#[test]
fn test_promotion_exactly_at_thresholds() {
    let cfg = CivilizationConfig::default();
    let civs = founded(thinker(0, cfg.population_threshold, cfg.intelligence_threshold));
    assert_eq!(civs.len(), 1, "species at both thresholds should found a civilization");

    let civ = &civs.all()[0];
    assert_eq!(civ.founding_species, SpeciesId(0));
    assert_eq!(civ.founded_tick, 1);
    assert_eq!(civ.tech_stage, TechStage::Primitive);
    assert!(!civ.territory.is_empty());
}

#[test]
fn test_no_promotion_one_below_population() {
    let cfg = CivilizationConfig::default();
    let civs = founded(thinker(0, cfg.population_threshold - 1, cfg.intelligence_threshold));
    assert!(civs.is_empty());
}

#[test]
fn test_no_promotion_below_intelligence() {
    let cfg = CivilizationConfig::default();
    let civs = founded(thinker(0, cfg.population_threshold, cfg.intelligence_threshold - 0.01));
    assert!(civs.is_empty());
}

#[test]
fn test_collapsed_founder_cannot_refound() {
    let (geo, climate) = planet();
    let species = SpeciesSet::from_species(vec![thinker(0, 20_000, 0.9)]);
    let mut engine = CivilizationEngine::new(CivilizationConfig::default(), 3);
    let bias = DiscoveryBias::new();

    let mut civs = engine.advance(&species, &CivilizationSet::new(), &geo, &climate, &bias, 1).civilizations;
    assert_eq!(civs.live_count(), 1);

    // A catastrophe severe enough to wipe out the fledgling civilization
    for _ in 0..10 {
        engine.apply_catastrophe(&mut civs, ecosphere::core::types::CatastropheKind::Meteorite, 1.0, 2);
    }
    assert_eq!(civs.live_count(), 0);

    for tick in 3..10 {
        civs = engine.advance(&species, &civs, &geo, &climate, &bias, tick).civilizations;
    }
    assert_eq!(civs.len(), 1, "a species founds at most one civilization");
    assert!(civs.all()[0].collapsed_tick.is_some());
}

// ============================================================================
// Whole-world rules
// ============================================================================

fn busy_world(seed: u64) -> Simulation {
    let mut config = SimulationConfig::default();
    config.world.seed = seed;
    config.world.width = 40;
    config.world.height = 24;
    // Fast-track intelligence so civilizations appear in a short run
    config.ecosystem.intelligence_drift_rate = 0.05;
    config.civilization.intelligence_threshold = 0.3;
    config.civilization.population_threshold = 500;
    config.civilization.tech_rate = 10.0;
    Simulation::initialize(config).unwrap()
}

#[test]
fn test_stage_monotonic_while_alive() {
    let mut sim = busy_world(31);
    let mut last: BTreeMap<CivilizationId, TechStage> = BTreeMap::new();

    for _ in 0..150 {
        sim.step().unwrap();
        for civ in sim.civilizations().all() {
            if !civ.is_alive() {
                last.remove(&civ.id);
                continue;
            }
            if let Some(prev) = last.get(&civ.id) {
                assert!(civ.tech_stage >= *prev, "{} went backwards", civ.name);
                assert!(civ.tech_stage.index() - prev.index() <= 1, "{} skipped a stage", civ.name);
            }
            last.insert(civ.id, civ.tech_stage);
            assert!(civ.peak_stage >= civ.tech_stage);
        }
    }
    assert!(!sim.civilizations().is_empty(), "no civilization was founded");
    println!(
        "{} civilizations founded, {} tech advances",
        sim.civilizations().len(),
        sim.history().count(EventCategory::TechAdvance)
    );
}

#[test]
fn test_founders_unique_and_territory_disjoint() {
    let mut sim = busy_world(12);
    for year in 0..120 {
        sim.step().unwrap();

        let founders: Vec<SpeciesId> = sim.civilizations().all().iter().map(|c| c.founding_species).collect();
        let unique: BTreeSet<SpeciesId> = founders.iter().copied().collect();
        assert_eq!(unique.len(), founders.len(), "duplicate founder in year {}", year);

        let mut seen: BTreeSet<CellCoord> = BTreeSet::new();
        for civ in sim.civilizations().live() {
            assert!(sim.species().get(civ.founding_species).is_some());
            for cell in &civ.territory {
                assert!(!sim.geography().cell(*cell).unwrap().is_water, "{} settled water", civ.name);
                assert!(seen.insert(*cell), "cell {} held twice", cell);
            }
        }
    }
}
