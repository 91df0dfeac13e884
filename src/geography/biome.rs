//! Biome kinds and the classifier that assigns them

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BiomeKind {
    Ocean,
    ShallowWater,
    Beach,
    Plains,
    Forest,
    Jungle,
    Desert,
    Savanna,
    Tundra,
    Mountains,
    Ice,
    Volcanic,
    Swamp,
}

impl BiomeKind {
    pub const COUNT: usize = 13;

    pub const ALL: [BiomeKind; Self::COUNT] = [
        BiomeKind::Ocean,
        BiomeKind::ShallowWater,
        BiomeKind::Beach,
        BiomeKind::Plains,
        BiomeKind::Forest,
        BiomeKind::Jungle,
        BiomeKind::Desert,
        BiomeKind::Savanna,
        BiomeKind::Tundra,
        BiomeKind::Mountains,
        BiomeKind::Ice,
        BiomeKind::Volcanic,
        BiomeKind::Swamp,
    ];

    /// Position in `ALL`, used to index per-biome tables
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_water(self) -> bool {
        matches!(self, BiomeKind::Ocean | BiomeKind::ShallowWater)
    }

    pub fn name(self) -> &'static str {
        match self {
            BiomeKind::Ocean => "ocean",
            BiomeKind::ShallowWater => "shallow water",
            BiomeKind::Beach => "beach",
            BiomeKind::Plains => "plains",
            BiomeKind::Forest => "forest",
            BiomeKind::Jungle => "jungle",
            BiomeKind::Desert => "desert",
            BiomeKind::Savanna => "savanna",
            BiomeKind::Tundra => "tundra",
            BiomeKind::Mountains => "mountains",
            BiomeKind::Ice => "ice",
            BiomeKind::Volcanic => "volcanic",
            BiomeKind::Swamp => "swamp",
        }
    }

    /// How well a settled population can live here (0-1)
    pub fn settlement_quality(self) -> f32 {
        match self {
            BiomeKind::Plains | BiomeKind::Savanna => 1.0,
            BiomeKind::Forest => 0.8,
            BiomeKind::Beach => 0.7,
            BiomeKind::Jungle | BiomeKind::Swamp => 0.5,
            BiomeKind::Tundra | BiomeKind::Desert => 0.3,
            BiomeKind::Mountains | BiomeKind::Volcanic => 0.2,
            BiomeKind::Ice => 0.05,
            BiomeKind::Ocean | BiomeKind::ShallowWater => 0.0,
        }
    }
}

/// Inputs to the biome classifier, all normalized to [0, 1]
#[derive(Debug, Clone, Copy)]
pub struct BiomeInputs {
    pub elevation: f32,
    pub moisture: f32,
    pub temperature: f32,
    pub sea_level: f32,
    pub mountain_level: f32,
}

/// Classify a cell. `volcanic` decides whether a warm peak is a volcano.
pub fn classify(inputs: BiomeInputs, volcanic: bool) -> BiomeKind {
    let BiomeInputs { elevation, moisture, temperature, sea_level, mountain_level } = inputs;

    if elevation <= sea_level {
        return if elevation > sea_level - 0.1 {
            BiomeKind::ShallowWater
        } else {
            BiomeKind::Ocean
        };
    }

    if elevation <= sea_level + 0.02 {
        return BiomeKind::Beach;
    }

    if elevation >= mountain_level {
        if temperature < 0.2 {
            return BiomeKind::Ice;
        }
        return if volcanic { BiomeKind::Volcanic } else { BiomeKind::Mountains };
    }

    if temperature < 0.2 {
        BiomeKind::Tundra
    } else if temperature < 0.4 {
        if moisture < 0.3 {
            BiomeKind::Plains
        } else {
            BiomeKind::Forest
        }
    } else if moisture < 0.2 {
        BiomeKind::Desert
    } else if moisture < 0.5 {
        BiomeKind::Savanna
    } else if moisture < 0.8 {
        BiomeKind::Forest
    } else if temperature > 0.7 {
        BiomeKind::Jungle
    } else {
        BiomeKind::Swamp
    }
}
