//! Species records and the species set

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{SpeciesId, Tick};
use crate::ecosystem::traits::{TraitKind, TraitVector};
use crate::geography::BiomeKind;

const NAME_PREFIXES: &[&str] = &["Xeno", "Neo", "Mega", "Micro", "Poly", "Crypto", "Proto", "Meta", "Ortho", "Para"];
const NAME_ROOTS: &[&str] = &["morph", "pod", "derm", "saur", "phyll", "zoa", "theri", "cephal", "branch", "cyst"];
const NAME_ENDINGS: &[&str] = &["us", "a", "um", "is", "ae", "idae", "oides", "ella", "ium", "on"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrophicRole {
    Herbivore,
    Predator,
    Decomposer,
}

impl TrophicRole {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Herbivore => "herbivore",
            Self::Predator => "predator",
            Self::Decomposer => "decomposer",
        }
    }

    /// Roles a descendant may drift into
    pub fn adjacent(&self) -> &'static [TrophicRole] {
        match self {
            Self::Herbivore => &[TrophicRole::Predator, TrophicRole::Decomposer],
            Self::Predator => &[TrophicRole::Herbivore],
            Self::Decomposer => &[TrophicRole::Herbivore],
        }
    }
}

/// Preference (0-1) for each biome
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HabitatAffinity {
    values: [f32; BiomeKind::COUNT],
}

impl HabitatAffinity {
    pub fn uniform(value: f32) -> Self {
        Self { values: [value.clamp(0.0, 1.0); BiomeKind::COUNT] }
    }

    /// Low baseline everywhere with one to three strongly preferred land biomes
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let mut values = [0.0; BiomeKind::COUNT];
        for v in values.iter_mut() {
            *v = rng.gen_range(0.0..0.3);
        }
        let land: Vec<BiomeKind> = BiomeKind::ALL.iter().copied().filter(|b| !b.is_water()).collect();
        let preferred = rng.gen_range(1..=3);
        for _ in 0..preferred {
            let biome = land[rng.gen_range(0..land.len())];
            values[biome.index()] = rng.gen_range(0.7..1.0);
        }
        Self { values }
    }

    pub fn get(&self, biome: BiomeKind) -> f32 {
        self.values[biome.index()]
    }

    pub fn set(&mut self, biome: BiomeKind, value: f32) {
        self.values[biome.index()] = value.clamp(0.0, 1.0);
    }

    pub fn mutated<R: Rng>(&self, scale: f32, rng: &mut R) -> Self {
        let mut child = *self;
        for biome in BiomeKind::ALL {
            let shift = if scale > 0.0 { rng.gen_range(-scale..=scale) } else { 0.0 };
            child.set(biome, self.get(biome) + shift);
        }
        child
    }

    /// Shared habitat (0-1): how much two species compete for the same biomes
    pub fn overlap(&self, other: &HabitatAffinity) -> f32 {
        let shared: f32 = self.values.iter().zip(&other.values).map(|(a, b)| a.min(*b)).sum();
        let own: f32 = self.values.iter().sum();
        if own <= 0.0 {
            0.0
        } else {
            (shared / own).clamp(0.0, 1.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: SpeciesId,
    pub name: String,
    pub trophic_role: TrophicRole,
    pub traits: TraitVector,
    pub population: u64,
    pub habitat: HabitatAffinity,
    pub intelligence: f32,
    /// Parent species for anything born of speciation
    pub lineage: Option<SpeciesId>,
    pub origin_tick: Tick,
    /// Set once the species is gone; the record stays as a tombstone
    pub extinct_tick: Option<Tick>,
    pub extinction_cause: Option<String>,
}

impl Species {
    pub fn new(
        id: SpeciesId,
        name: impl Into<String>,
        trophic_role: TrophicRole,
        traits: TraitVector,
        habitat: HabitatAffinity,
        population: u64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            trophic_role,
            traits,
            population,
            habitat,
            intelligence: 0.05,
            lineage: None,
            origin_tick: 0,
            extinct_tick: None,
            extinction_cause: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.extinct_tick.is_none()
    }

    pub fn trait_value(&self, kind: TraitKind) -> f32 {
        self.traits.get(kind)
    }

    pub fn tombstone(&mut self, tick: Tick, cause: impl Into<String>) {
        self.population = 0;
        self.extinct_tick = Some(tick);
        self.extinction_cause = Some(cause.into());
    }
}

pub fn random_species_name<R: Rng>(rng: &mut R) -> String {
    format!(
        "{}{}{}",
        NAME_PREFIXES[rng.gen_range(0..NAME_PREFIXES.len())],
        NAME_ROOTS[rng.gen_range(0..NAME_ROOTS.len())],
        NAME_ENDINGS[rng.gen_range(0..NAME_ENDINGS.len())],
    )
}

/// Every species ever created, ordered by id. Tombstones are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSet {
    species: Vec<Species>,
    next_id: u32,
}

impl SpeciesSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from existing records. Ids continue after the largest one.
    pub fn from_species(mut species: Vec<Species>) -> Self {
        species.sort_by_key(|s| s.id);
        let next_id = species.last().map(|s| s.id.0 + 1).unwrap_or(0);
        Self { species, next_id }
    }

    pub fn allocate_id(&mut self) -> SpeciesId {
        let id = SpeciesId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a species created with an id from `allocate_id`
    pub fn insert(&mut self, species: Species) {
        self.next_id = self.next_id.max(species.id.0 + 1);
        match self.species.binary_search_by_key(&species.id, |s| s.id) {
            Ok(pos) => self.species[pos] = species,
            Err(pos) => self.species.insert(pos, species),
        }
    }

    pub fn get(&self, id: SpeciesId) -> Option<&Species> {
        self.species.binary_search_by_key(&id, |s| s.id).ok().map(|i| &self.species[i])
    }

    pub fn get_mut(&mut self, id: SpeciesId) -> Option<&mut Species> {
        match self.species.binary_search_by_key(&id, |s| s.id) {
            Ok(i) => Some(&mut self.species[i]),
            Err(_) => None,
        }
    }

    pub fn all(&self) -> &[Species] {
        &self.species
    }

    pub(crate) fn all_mut(&mut self) -> &mut [Species] {
        &mut self.species
    }

    pub fn live(&self) -> impl Iterator<Item = &Species> {
        self.species.iter().filter(|s| s.is_alive())
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn total_population(&self) -> u64 {
        self.live().map(|s| s.population).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: u32, population: u64) -> Species {
        Species::new(
            SpeciesId(id),
            format!("S{id}"),
            TrophicRole::Herbivore,
            TraitVector::default(),
            HabitatAffinity::uniform(0.5),
            population,
        )
    }

    #[test]
    fn test_tombstone_keeps_record() {
        let mut set = SpeciesSet::new();
        let id = set.allocate_id();
        set.insert(sample(id.0, 500));
        set.get_mut(id).unwrap().tombstone(12, "starvation");

        let dead = set.get(id).unwrap();
        assert!(!dead.is_alive());
        assert_eq!(dead.population, 0);
        assert_eq!(dead.extinct_tick, Some(12));
        assert_eq!(set.len(), 1);
        assert_eq!(set.live_count(), 0);
    }

    #[test]
    fn test_ids_continue_after_existing() {
        let mut set = SpeciesSet::from_species(vec![sample(4, 10), sample(1, 10)]);
        assert_eq!(set.all()[0].id, SpeciesId(1));
        assert_eq!(set.allocate_id(), SpeciesId(5));
    }

    #[test]
    fn test_overlap() {
        let a = HabitatAffinity::uniform(0.5);
        let mut b = HabitatAffinity::uniform(0.0);
        assert_eq!(a.overlap(&b), 0.0);
        b.set(BiomeKind::Forest, 1.0);
        assert!(a.overlap(&b) > 0.0);
        assert!((a.overlap(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_total_population_skips_tombstones() {
        let mut set = SpeciesSet::from_species(vec![sample(0, 100), sample(1, 250)]);
        set.get_mut(SpeciesId(0)).unwrap().tombstone(3, "test");
        assert_eq!(set.total_population(), 250);
    }
}
