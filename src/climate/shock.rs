use serde::{Deserialize, Serialize};

use crate::core::types::CellCoord;

/// Temporary perturbation of the climate, usually from a catastrophe
///
/// The effect fades linearly over the shock's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateShock {
    pub cause: String,
    /// `None` affects the whole planet
    pub center: Option<CellCoord>,
    pub radius: u32,
    pub temperature_delta: f32,
    pub precipitation_delta: f32,
    pub duration: u32,
    pub remaining_ticks: u32,
}

impl ClimateShock {
    pub fn global(cause: impl Into<String>, temperature_delta: f32, precipitation_delta: f32, duration: u32) -> Self {
        Self {
            cause: cause.into(),
            center: None,
            radius: 0,
            temperature_delta,
            precipitation_delta,
            duration: duration.max(1),
            remaining_ticks: duration.max(1),
        }
    }

    pub fn regional(
        cause: impl Into<String>,
        center: CellCoord,
        radius: u32,
        temperature_delta: f32,
        precipitation_delta: f32,
        duration: u32,
    ) -> Self {
        Self {
            cause: cause.into(),
            center: Some(center),
            radius,
            temperature_delta,
            precipitation_delta,
            duration: duration.max(1),
            remaining_ticks: duration.max(1),
        }
    }

    /// Weight (0-1) of the shock at `coord` this tick
    pub fn weight(&self, coord: CellCoord, width: u32) -> f32 {
        let fade = self.remaining_ticks as f32 / self.duration as f32;
        match self.center {
            None => fade,
            Some(center) => {
                let distance = (center.wrapped_distance_sq(&coord, width) as f32).sqrt();
                let radius = self.radius.max(1) as f32;
                (1.0 - distance / radius).max(0.0) * fade
            }
        }
    }

    pub fn is_spent(&self) -> bool {
        self.remaining_ticks == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_shock_fades() {
        let mut shock = ClimateShock::global("meteorite", -0.3, 0.0, 4);
        let origin = CellCoord::new(0, 0);
        assert_eq!(shock.weight(origin, 10), 1.0);
        shock.remaining_ticks = 2;
        assert_eq!(shock.weight(origin, 10), 0.5);
    }

    #[test]
    fn test_regional_shock_is_local() {
        let shock = ClimateShock::regional("supervolcano", CellCoord::new(5, 5), 3, -0.25, 0.1, 3);
        assert!(shock.weight(CellCoord::new(5, 5), 40) > 0.9);
        assert_eq!(shock.weight(CellCoord::new(30, 5), 40), 0.0);
    }
}
