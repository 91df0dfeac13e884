//! Planet surface: an immutable grid of cells
//!
//! Geography is generated once at initialization and never changes. The
//! kernel shares it behind an `Arc` with every snapshot.

pub mod biome;
pub mod generation;

use serde::{Deserialize, Serialize};

use crate::core::types::CellCoord;
pub use biome::BiomeKind;
pub use generation::{generate, generate_named};

/// A single surface cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Normalized elevation (0-1)
    pub elevation: f32,
    pub is_water: bool,
    pub biome: BiomeKind,
    /// Baseline humidity before weather (0-1)
    pub moisture: f32,
    /// Annual mean temperature before seasons and weather (0-1)
    pub base_temperature: f32,
}

/// Planet-wide physical parameters rolled at generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanetTraits {
    /// Degrees. Scales seasonal amplitude.
    pub axial_tilt: f32,
    pub land_fraction: f32,
    /// 0-1, drives volcanic terrain and supervolcano severity
    pub tectonic_activity: f32,
    pub year_length_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geography {
    name: String,
    width: u32,
    height: u32,
    sea_level: f32,
    planet: PlanetTraits,
    cells: Vec<Cell>,
}

impl Geography {
    pub(crate) fn from_parts(
        name: String,
        width: u32,
        height: u32,
        sea_level: f32,
        planet: PlanetTraits,
        cells: Vec<Cell>,
    ) -> Self {
        debug_assert_eq!(cells.len(), (width * height) as usize);
        Self { name, width, height, sea_level, planet, cells }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn sea_level(&self) -> f32 {
        self.sea_level
    }

    pub fn planet(&self) -> &PlanetTraits {
        &self.planet
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    pub fn index(&self, coord: CellCoord) -> usize {
        (coord.y * self.width + coord.x) as usize
    }

    pub fn coord(&self, index: usize) -> CellCoord {
        let index = index as u32;
        CellCoord::new(index % self.width, index / self.width)
    }

    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        if self.contains(coord) {
            self.cells.get(self.index(coord))
        } else {
            None
        }
    }

    /// Latitude of a row, -1 at the north pole and 1 at the south pole
    pub fn latitude(&self, y: u32) -> f32 {
        2.0 * (y as f32 + 0.5) / self.height as f32 - 1.0
    }

    /// The eight surrounding cells. The map wraps east-west but not over the poles.
    pub fn neighbors(&self, coord: CellCoord) -> Vec<CellCoord> {
        let mut result = Vec::with_capacity(8);
        for dy in -1i64..=1 {
            let ny = coord.y as i64 + dy;
            if ny < 0 || ny >= self.height as i64 {
                continue;
            }
            for dx in -1i64..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = (coord.x as i64 + dx).rem_euclid(self.width as i64);
                let neighbor = CellCoord::new(nx as u32, ny as u32);
                if neighbor != coord && !result.contains(&neighbor) {
                    result.push(neighbor);
                }
            }
        }
        result
    }

    /// Every land cell within `radius` of `center`
    pub fn land_within(&self, center: CellCoord, radius: u32) -> Vec<CellCoord> {
        let r = radius as i64;
        let mut result = Vec::new();
        for dy in -r..=r {
            let ny = center.y as i64 + dy;
            if ny < 0 || ny >= self.height as i64 {
                continue;
            }
            for dx in -r..=r {
                if dx * dx + dy * dy > r * r {
                    continue;
                }
                let nx = (center.x as i64 + dx).rem_euclid(self.width as i64);
                let coord = CellCoord::new(nx as u32, ny as u32);
                if !self.cells[self.index(coord)].is_water && !result.contains(&coord) {
                    result.push(coord);
                }
            }
        }
        result
    }

    pub fn land_cell_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_water).count()
    }

    /// Cell counts per biome, indexed by `BiomeKind::index`
    pub fn biome_histogram(&self) -> [usize; BiomeKind::COUNT] {
        let mut counts = [0; BiomeKind::COUNT];
        for cell in &self.cells {
            counts[cell.biome.index()] += 1;
        }
        counts
    }
}
