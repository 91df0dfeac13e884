//! Integration tests for ecosystem scenarios
//!
//! These tests drive the ecosystem engine directly on a generated planet:
//! - Speciation of a large population under a fixed random stream
//! - Extinction cascade when a predator loses its only prey
//! - Non-negativity and tombstone rules over long runs

use ecosphere::climate::{ClimateEngine, ClimateState};
use ecosphere::core::config::{ClimateConfig, EcosystemConfig, GeographyConfig};
use ecosphere::core::types::SpeciesId;
use ecosphere::ecosystem::{EcosystemEngine, HabitatAffinity, Species, SpeciesSet, TraitVector, TrophicRole};
use ecosphere::events::{EventCategory, EventKind};
use ecosphere::geography::{generate, Geography};
use rand::rngs::mock::StepRng;

fn planet(seed: u64) -> (Geography, ClimateState) {
    let geo = generate(seed, 32, 24, &GeographyConfig::default()).unwrap();
    let climate = ClimateEngine::new(ClimateConfig::default(), seed).initial_state(&geo);
    (geo, climate)
}

fn creature(id: u32, name: &str, role: TrophicRole, population: u64) -> Species {
    Species::new(SpeciesId(id), name, role, TraitVector::default(), HabitatAffinity::uniform(1.0), population)
}

// ============================================================================
// Speciation
// ============================================================================

#[test]
fn test_large_population_speciates() {
    let (geo, climate) = planet(11);
    let config = EcosystemConfig {
        mutation_rate: 0.05,
        mutation_scale: 0.1,
        population_noise: 0.0,
        habitat_threshold: 0.0,
        carrying_capacity_scale: 1_000_000.0,
        ..Default::default()
    };
    let engine = EcosystemEngine::new(config, 11);
    let ancestor = creature(0, "Grazer prime", TrophicRole::Herbivore, 1_000);
    let species = SpeciesSet::from_species(vec![ancestor.clone()]);

    // An all-zero stream makes every chance roll succeed
    let mut rng = StepRng::new(0, 0);
    let step = engine.advance_with(&species, &geo, &climate, 1, &mut rng);

    assert_eq!(step.species.len(), 2, "expected exactly one new species");
    let child = &step.species.all()[1];
    assert_eq!(child.lineage, Some(SpeciesId(0)));
    assert_eq!(child.origin_tick, 1);
    assert!(child.is_alive());
    assert!(child.traits.is_valid());
    assert_ne!(child.traits, ancestor.traits, "child traits should be perturbed");
    assert_ne!(child.habitat, ancestor.habitat, "child habitat should be perturbed");

    let parent = step.species.get(SpeciesId(0)).unwrap();
    assert!(parent.is_alive());
    assert!(parent.population > child.population);

    let speciations: Vec<_> = step
        .events
        .iter()
        .filter(|e| e.category() == EventCategory::Speciation)
        .collect();
    assert_eq!(speciations.len(), 1);
    match speciations[0] {
        EventKind::Speciation { parent, child: c, .. } => {
            assert_eq!(*parent, SpeciesId(0));
            assert_eq!(*c, child.id);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn test_small_population_never_speciates() {
    let (geo, climate) = planet(11);
    let config = EcosystemConfig { population_noise: 0.0, habitat_threshold: 0.0, ..Default::default() };
    let engine = EcosystemEngine::new(config, 11);
    let species = SpeciesSet::from_species(vec![creature(0, "Grazer minor", TrophicRole::Herbivore, 200)]);

    let step = engine.advance_with(&species, &geo, &climate, 1, &mut StepRng::new(0, 0));
    assert_eq!(step.species.len(), 1);
}

// ============================================================================
// Extinction cascade
// ============================================================================

#[test]
fn test_predator_starves_after_prey_extinction() {
    let (geo, climate) = planet(5);
    let config = EcosystemConfig {
        mutation_rate: 0.0,
        population_noise: 0.0,
        habitat_threshold: 0.0,
        ..Default::default()
    };
    let mut engine = EcosystemEngine::new(config, 5);

    let mut prey = creature(0, "Grazer lost", TrophicRole::Herbivore, 0);
    prey.tombstone(0, "test setup");
    let hunter = creature(1, "Stalker alone", TrophicRole::Predator, 1_000);
    let mut species = SpeciesSet::from_species(vec![prey, hunter]);

    let mut last = 1_000;
    let mut extinct_at = None;
    for tick in 1..=40 {
        let step = engine.advance(&species, &geo, &climate, tick);
        assert!(step.links.is_empty(), "tombstoned prey must not be linked");
        species = step.species;

        let hunter = species.get(SpeciesId(1)).unwrap();
        if !hunter.is_alive() {
            assert_eq!(hunter.population, 0);
            assert_eq!(hunter.extinct_tick, Some(tick));
            assert!(step.events.iter().any(|e| matches!(e, EventKind::Extinction { species, .. } if *species == SpeciesId(1))));
            extinct_at = Some(tick);
            break;
        }
        assert!(hunter.population < last, "population should fall every year, {} -> {}", last, hunter.population);
        last = hunter.population;
    }

    let tick = extinct_at.expect("predator should die out without prey");
    println!("Predator died out after {} years", tick);
    assert_eq!(species.live_count(), 0);
    assert_eq!(species.len(), 2, "tombstones stay in the set");
}

// ============================================================================
// Long-run invariants
// ============================================================================

#[test]
fn test_seeded_ecosystem_keeps_invariants() {
    let (geo, climate) = planet(42);
    let mut engine = EcosystemEngine::new(EcosystemConfig::default(), 42);
    let mut species = engine.seed_initial();

    for tick in 1..=100 {
        let step = engine.advance(&species, &geo, &climate, tick);
        for s in step.species.all() {
            assert_eq!(s.is_alive(), s.population > 0, "{} breaks the tombstone rule", s.name);
            assert!(s.traits.is_valid());
            assert!((0.0..=1.0).contains(&s.intelligence));
        }
        for link in &step.links {
            assert!(step.species.get(link.prey).is_some());
            assert!(species.get(link.prey).unwrap().is_alive());
            assert!(species.get(link.predator).unwrap().is_alive());
        }
        assert!(step.species.live_count() <= engine.config().max_live_species);
        species = step.species;
    }
    println!("After 100 years: {} live of {} species", species.live_count(), species.len());
}
