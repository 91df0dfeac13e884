//! Ocean currents: a slowly varying field that carries heat along fixed paths

use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::CellCoord;
use crate::geography::Geography;

/// Cells a current runs before it dissipates
const CURRENT_LENGTH: u32 = 12;

/// Temperature anomaly at full strength
const CURRENT_ANOMALY: f32 = 0.08;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OceanCurrent {
    pub origin: CellCoord,
    /// Radians, 0 points east
    pub heading: f32,
    /// 0.2-1.0
    pub strength: f32,
    /// Warm currents raise temperature along their path, cold ones lower it
    pub warm: bool,
}

impl OceanCurrent {
    /// Place `count` currents on random water cells. Dry worlds get none.
    pub fn spawn_all<R: Rng>(geography: &Geography, count: usize, rng: &mut R) -> Vec<OceanCurrent> {
        let water: Vec<usize> = geography
            .cells()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_water)
            .map(|(i, _)| i)
            .collect();
        if water.is_empty() {
            return Vec::new();
        }

        (0..count)
            .map(|_| {
                let origin = geography.coord(water[rng.gen_range(0..water.len())]);
                // Currents flowing poleward from the tropics run warm
                let lat = geography.latitude(origin.y);
                OceanCurrent {
                    origin,
                    heading: rng.gen_range(0.0..TAU),
                    strength: rng.gen_range(0.2..1.0),
                    warm: lat.abs() < 0.5,
                }
            })
            .collect()
    }

    /// Random walk of heading and strength within bounded steps
    pub fn drift<R: Rng>(&mut self, max_turn: f32, rng: &mut R) {
        if max_turn > 0.0 {
            self.heading = (self.heading + rng.gen_range(-max_turn..=max_turn)).rem_euclid(TAU);
        }
        self.strength = (self.strength + rng.gen_range(-0.02..=0.02)).clamp(0.2, 1.0);
    }

    /// Water cells along the current's path
    pub fn path(&self, geography: &Geography) -> Vec<CellCoord> {
        let (dx, dy) = (self.heading.cos(), self.heading.sin());
        let width = geography.width() as f32;
        let mut cells = Vec::new();
        for step in 0..CURRENT_LENGTH {
            let x = (self.origin.x as f32 + dx * step as f32).rem_euclid(width);
            let y = self.origin.y as f32 + dy * step as f32;
            if y < 0.0 || y >= geography.height() as f32 {
                break;
            }
            let coord = CellCoord::new(x as u32 % geography.width(), y as u32);
            match geography.cell(coord) {
                Some(cell) if cell.is_water => {
                    if !cells.contains(&coord) {
                        cells.push(coord);
                    }
                }
                _ => break,
            }
        }
        cells
    }
}

/// Temperature anomaly per cell from all currents
pub fn anomaly_field(currents: &[OceanCurrent], geography: &Geography) -> Vec<f32> {
    let mut field = vec![0.0; geography.cell_count()];
    for current in currents {
        let sign = if current.warm { 1.0 } else { -1.0 };
        for coord in current.path(geography) {
            let delta = sign * CURRENT_ANOMALY * current.strength;
            field[geography.index(coord)] += delta;
            // Coasts next to the current feel half the effect
            for neighbor in geography.neighbors(coord) {
                field[geography.index(neighbor)] += delta * 0.5 / 8.0;
            }
        }
    }
    field
}
