//! Civilization records

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{CellCoord, CivilizationId, SpeciesId, Tick};

const NAME_PREFIXES: &[&str] = &[
    "Ar", "Bel", "Cyr", "Dor", "El", "Fal", "Gal", "Hy", "Il", "Jor", "Kal", "Lum", "Mer", "Neb", "Orb", "Sol",
];
const NAME_SUFFIXES: &[&str] = &["ia", "or", "an", "ium", "aria", "alis", "oria", "aris", "on", "eth"];

/// Technological stages, strictly ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TechStage {
    Primitive,
    Agricultural,
    Medieval,
    Industrial,
    Information,
    Space,
    Advanced,
    Stellar,
}

impl TechStage {
    pub fn index(&self) -> u32 {
        *self as u32
    }

    /// The following stage, or `None` at the top
    pub fn next(&self) -> Option<TechStage> {
        match self {
            Self::Primitive => Some(Self::Agricultural),
            Self::Agricultural => Some(Self::Medieval),
            Self::Medieval => Some(Self::Industrial),
            Self::Industrial => Some(Self::Information),
            Self::Information => Some(Self::Space),
            Self::Space => Some(Self::Advanced),
            Self::Advanced => Some(Self::Stellar),
            Self::Stellar => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Primitive => "primitive",
            Self::Agricultural => "agricultural",
            Self::Medieval => "medieval",
            Self::Industrial => "industrial",
            Self::Information => "information",
            Self::Space => "space",
            Self::Advanced => "advanced",
            Self::Stellar => "stellar",
        }
    }

    /// Population supported by 100 fully habitable cells
    pub fn base_capacity(&self) -> f64 {
        match self {
            Self::Primitive => 1e4,
            Self::Agricultural => 1e5,
            Self::Medieval => 1e6,
            Self::Industrial => 1e7,
            Self::Information => 1e8,
            Self::Space => 1e9,
            Self::Advanced => 1e10,
            Self::Stellar => 1e11,
        }
    }

    /// Extra yearly growth on top of the base rate
    pub fn growth_modifier(&self) -> f32 {
        match self {
            Self::Primitive => 0.005,
            Self::Agricultural => 0.015,
            Self::Medieval => 0.01,
            Self::Industrial => 0.02,
            Self::Information => 0.015,
            Self::Space => 0.01,
            Self::Advanced => 0.005,
            Self::Stellar => 0.003,
        }
    }

    /// Technologies unlocked on reaching this stage
    pub fn technologies(&self) -> &'static [&'static str] {
        match self {
            Self::Primitive => &["fire", "stone tools", "spoken language"],
            Self::Agricultural => &["agriculture", "pottery", "domestication", "bronze working"],
            Self::Medieval => &["architecture", "mathematics", "astronomy", "navigation"],
            Self::Industrial => &["steam power", "electricity", "chemistry", "railways"],
            Self::Information => &["computing", "telecommunications", "modern medicine", "nuclear power"],
            Self::Space => &["spaceflight", "robotics", "artificial intelligence", "biotechnology"],
            Self::Advanced => &["genetic engineering", "nanotechnology", "fusion power", "virtual reality"],
            Self::Stellar => &["faster-than-light travel", "terraforming", "digital minds", "quantum engineering"],
        }
    }

    /// Industrial and later stages burn enough to warm the planet
    pub fn emits(&self) -> bool {
        *self >= Self::Industrial
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Government {
    Tribal,
    Monarchy,
    Theocracy,
    Oligarchy,
    Republic,
    Democracy,
    Technocracy,
    AiGovernance,
}

impl Government {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tribal => "tribal council",
            Self::Monarchy => "monarchy",
            Self::Theocracy => "theocracy",
            Self::Oligarchy => "oligarchy",
            Self::Republic => "republic",
            Self::Democracy => "democracy",
            Self::Technocracy => "technocracy",
            Self::AiGovernance => "machine governance",
        }
    }

    /// Government a society tends toward on reaching `stage`
    pub fn after_advance<R: Rng>(&self, stage: TechStage, rng: &mut R) -> Government {
        match stage {
            TechStage::Agricultural if *self == Self::Tribal => Self::Monarchy,
            TechStage::Medieval if matches!(self, Self::Tribal | Self::Monarchy) => {
                if rng.gen_bool(0.5) {
                    Self::Oligarchy
                } else {
                    Self::Theocracy
                }
            }
            TechStage::Industrial => {
                if rng.gen_bool(0.5) {
                    Self::Republic
                } else {
                    Self::Oligarchy
                }
            }
            TechStage::Information => {
                if rng.gen_bool(0.5) {
                    Self::Democracy
                } else {
                    Self::Technocracy
                }
            }
            TechStage::Advanced => {
                if rng.gen_bool(0.5) {
                    Self::Technocracy
                } else {
                    Self::AiGovernance
                }
            }
            _ => *self,
        }
    }
}

/// Society-level temperament, each trait in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CultureTraits {
    pub stability: f32,
    pub aggression: f32,
    pub cooperation: f32,
    pub creativity: f32,
}

impl CultureTraits {
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            stability: rng.gen_range(0.3..0.7),
            aggression: rng.gen_range(0.2..0.8),
            cooperation: rng.gen_range(0.2..0.8),
            creativity: rng.gen_range(0.3..0.7),
        }
    }

    pub fn clamp(&mut self) {
        self.stability = self.stability.clamp(0.0, 1.0);
        self.aggression = self.aggression.clamp(0.0, 1.0);
        self.cooperation = self.cooperation.clamp(0.0, 1.0);
        self.creativity = self.creativity.clamp(0.0, 1.0);
    }
}

impl Default for CultureTraits {
    fn default() -> Self {
        Self { stability: 0.5, aggression: 0.5, cooperation: 0.5, creativity: 0.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Civilization {
    pub id: CivilizationId,
    pub name: String,
    pub founding_species: SpeciesId,
    pub founded_tick: Tick,
    pub territory: BTreeSet<CellCoord>,
    pub tech_stage: TechStage,
    /// Progress toward the next stage (0-1)
    pub tech_progress: f32,
    /// Highest stage ever reached, kept across collapse
    pub peak_stage: TechStage,
    pub culture: CultureTraits,
    pub government: Government,
    pub technologies: BTreeSet<String>,
    /// Opinion of other civilizations (-1 to 1), only after contact
    pub relations: BTreeMap<CivilizationId, f32>,
    pub population: u64,
    /// Consecutive ticks of shrinking population
    pub decline_streak: u32,
    pub collapsed_tick: Option<Tick>,
}

impl Civilization {
    pub fn new(
        id: CivilizationId,
        name: impl Into<String>,
        founding_species: SpeciesId,
        founded_tick: Tick,
        territory: BTreeSet<CellCoord>,
        population: u64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            founding_species,
            founded_tick,
            territory,
            tech_stage: TechStage::Primitive,
            tech_progress: 0.0,
            peak_stage: TechStage::Primitive,
            culture: CultureTraits::default(),
            government: Government::Tribal,
            technologies: TechStage::Primitive.technologies().iter().map(|t| t.to_string()).collect(),
            relations: BTreeMap::new(),
            population,
            decline_streak: 0,
            collapsed_tick: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.collapsed_tick.is_none()
    }

    /// Collapse: the record stays, the people and land do not
    pub fn collapse(&mut self, tick: Tick) {
        self.population = 0;
        self.territory.clear();
        self.tech_stage = TechStage::Primitive;
        self.tech_progress = 0.0;
        self.relations.clear();
        self.collapsed_tick = Some(tick);
    }
}

pub fn random_civilization_name<R: Rng>(rng: &mut R) -> String {
    format!(
        "{}{}",
        NAME_PREFIXES[rng.gen_range(0..NAME_PREFIXES.len())],
        NAME_SUFFIXES[rng.gen_range(0..NAME_SUFFIXES.len())]
    )
}

/// Every civilization ever founded, ordered by id. Collapsed ones are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CivilizationSet {
    civilizations: Vec<Civilization>,
    next_id: u32,
}

impl CivilizationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_civilizations(mut civilizations: Vec<Civilization>) -> Self {
        civilizations.sort_by_key(|c| c.id);
        let next_id = civilizations.last().map(|c| c.id.0 + 1).unwrap_or(0);
        Self { civilizations, next_id }
    }

    pub fn allocate_id(&mut self) -> CivilizationId {
        let id = CivilizationId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, civilization: Civilization) {
        self.next_id = self.next_id.max(civilization.id.0 + 1);
        match self.civilizations.binary_search_by_key(&civilization.id, |c| c.id) {
            Ok(pos) => self.civilizations[pos] = civilization,
            Err(pos) => self.civilizations.insert(pos, civilization),
        }
    }

    pub fn get(&self, id: CivilizationId) -> Option<&Civilization> {
        self.civilizations.binary_search_by_key(&id, |c| c.id).ok().map(|i| &self.civilizations[i])
    }

    pub fn get_mut(&mut self, id: CivilizationId) -> Option<&mut Civilization> {
        match self.civilizations.binary_search_by_key(&id, |c| c.id) {
            Ok(i) => Some(&mut self.civilizations[i]),
            Err(_) => None,
        }
    }

    pub fn all(&self) -> &[Civilization] {
        &self.civilizations
    }

    pub(crate) fn all_mut(&mut self) -> &mut [Civilization] {
        &mut self.civilizations
    }

    pub fn live(&self) -> impl Iterator<Item = &Civilization> {
        self.civilizations.iter().filter(|c| c.is_alive())
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    pub fn len(&self) -> usize {
        self.civilizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.civilizations.is_empty()
    }

    /// Species that have ever founded a civilization
    pub fn founders(&self) -> BTreeSet<SpeciesId> {
        self.civilizations.iter().map(|c| c.founding_species).collect()
    }
}
