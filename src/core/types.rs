//! Core type definitions used throughout the codebase

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Simulation tick counter. One tick is one simulated year.
pub type Tick = u64;

/// Seed every random stream of a run is derived from
pub type WorldSeed = u64;

/// Unique identifier for species
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[display(fmt = "species#{}", _0)]
pub struct SpeciesId(pub u32);

/// Unique identifier for civilizations
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[display(fmt = "civ#{}", _0)]
pub struct CivilizationId(pub u32);

/// Grid coordinate of a geography cell
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[display(fmt = "({}, {})", x, y)]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
}

impl CellCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Squared distance on a map that wraps horizontally
    pub fn wrapped_distance_sq(&self, other: &CellCoord, width: u32) -> u32 {
        let raw_dx = self.x.abs_diff(other.x);
        let dx = raw_dx.min(width.saturating_sub(raw_dx));
        let dy = self.y.abs_diff(other.y);
        dx * dx + dy * dy
    }
}

/// Planet-wide catastrophes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatastropheKind {
    Meteorite,
    Supervolcano,
    SolarFlare,
    Pandemic,
}

impl CatastropheKind {
    pub const ALL: [CatastropheKind; 4] = [
        CatastropheKind::Meteorite,
        CatastropheKind::Supervolcano,
        CatastropheKind::SolarFlare,
        CatastropheKind::Pandemic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Meteorite => "meteorite",
            Self::Supervolcano => "supervolcano",
            Self::SolarFlare => "solar flare",
            Self::Pandemic => "pandemic",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_order_by_value() {
        assert!(SpeciesId(1) < SpeciesId(2));
        assert!(CivilizationId(0) < CivilizationId(7));
    }

    #[test]
    fn test_id_display() {
        assert_eq!(SpeciesId(4).to_string(), "species#4");
        assert_eq!(CivilizationId(2).to_string(), "civ#2");
        assert_eq!(CellCoord::new(3, 9).to_string(), "(3, 9)");
    }

    #[test]
    fn test_wrapped_distance_crosses_seam() {
        let a = CellCoord::new(0, 5);
        let b = CellCoord::new(9, 5);
        assert_eq!(a.wrapped_distance_sq(&b, 10), 1);
        assert_eq!(a.wrapped_distance_sq(&CellCoord::new(0, 8), 10), 9);
    }
}
