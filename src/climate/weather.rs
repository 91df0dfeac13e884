//! Regional weather fronts
//!
//! Fronts are short-lived perturbations layered on top of the climate field.
//! Seasons change which fronts are likely.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::climate::season::Season;
use crate::core::types::CellCoord;
use crate::geography::Geography;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherKind {
    Heatwave,
    ColdSnap,
    Drought,
    Storm,
    Monsoon,
}

impl WeatherKind {
    /// Temperature shift at the center of a full-intensity front
    pub fn temperature_modifier(&self) -> f32 {
        match self {
            Self::Heatwave => 0.15,
            Self::ColdSnap => -0.15,
            Self::Drought => 0.05,
            Self::Storm => -0.03,
            Self::Monsoon => 0.0,
        }
    }

    /// Precipitation shift at the center of a full-intensity front
    pub fn precipitation_modifier(&self) -> f32 {
        match self {
            Self::Heatwave => -0.05,
            Self::ColdSnap => 0.0,
            Self::Drought => -0.2,
            Self::Storm => 0.2,
            Self::Monsoon => 0.3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Heatwave => "heatwave",
            Self::ColdSnap => "cold snap",
            Self::Drought => "drought",
            Self::Storm => "storm",
            Self::Monsoon => "monsoon",
        }
    }

    /// Relative likelihood of each front in a season
    fn weights(season: Season) -> [(WeatherKind, u32); 5] {
        match season {
            Season::Spring => [
                (Self::Heatwave, 1), (Self::ColdSnap, 2), (Self::Drought, 1), (Self::Storm, 4), (Self::Monsoon, 2),
            ],
            Season::Summer => [
                (Self::Heatwave, 4), (Self::ColdSnap, 0), (Self::Drought, 3), (Self::Storm, 2), (Self::Monsoon, 3),
            ],
            Season::Autumn => [
                (Self::Heatwave, 1), (Self::ColdSnap, 2), (Self::Drought, 1), (Self::Storm, 4), (Self::Monsoon, 1),
            ],
            Season::Winter => [
                (Self::Heatwave, 0), (Self::ColdSnap, 5), (Self::Drought, 1), (Self::Storm, 3), (Self::Monsoon, 0),
            ],
        }
    }

    pub fn roll<R: Rng>(season: Season, rng: &mut R) -> Self {
        let weights = Self::weights(season);
        let total: u32 = weights.iter().map(|(_, w)| w).sum();
        let mut pick = rng.gen_range(0..total);
        for (kind, weight) in weights {
            if pick < weight {
                return kind;
            }
            pick -= weight;
        }
        Self::Storm
    }
}

/// An active front
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherFront {
    pub kind: WeatherKind,
    pub center: CellCoord,
    pub radius: u32,
    pub intensity: f32,
    pub remaining_ticks: u32,
}

impl WeatherFront {
    pub fn spawn<R: Rng>(geography: &Geography, season: Season, rng: &mut R) -> Self {
        let kind = WeatherKind::roll(season, rng);
        let center = CellCoord::new(rng.gen_range(0..geography.width()), rng.gen_range(0..geography.height()));
        Self {
            kind,
            center,
            radius: rng.gen_range(2..=6),
            intensity: rng.gen_range(0.3..1.0),
            remaining_ticks: rng.gen_range(1..=3),
        }
    }

    /// Strength of the front at `coord`, falling off linearly to the edge
    pub fn influence(&self, coord: CellCoord, width: u32) -> f32 {
        let distance = (self.center.wrapped_distance_sq(&coord, width) as f32).sqrt();
        let radius = self.radius.max(1) as f32;
        (1.0 - distance / radius).max(0.0) * self.intensity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_no_heatwaves_in_winter() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..200 {
            assert_ne!(WeatherKind::roll(Season::Winter, &mut rng), WeatherKind::Heatwave);
        }
    }

    #[test]
    fn test_influence_falls_off() {
        let front = WeatherFront {
            kind: WeatherKind::Storm,
            center: CellCoord::new(5, 5),
            radius: 4,
            intensity: 1.0,
            remaining_ticks: 2,
        };
        let center = front.influence(CellCoord::new(5, 5), 20);
        let edge = front.influence(CellCoord::new(8, 5), 20);
        let outside = front.influence(CellCoord::new(15, 5), 20);
        assert_eq!(center, 1.0);
        assert!(edge > 0.0 && edge < center);
        assert_eq!(outside, 0.0);
    }
}
