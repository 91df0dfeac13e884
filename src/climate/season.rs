use serde::{Deserialize, Serialize};

use crate::core::types::Tick;

/// Season of the planetary cycle, as seen from the northern hemisphere
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Season at `tick` for a cycle of `years_per_cycle` ticks
    pub fn from_tick(tick: Tick, years_per_cycle: u32) -> Self {
        let period = years_per_cycle.max(1) as u64;
        let quarter = (tick % period) * 4 / period;
        match quarter {
            0 => Self::Spring,
            1 => Self::Summer,
            2 => Self::Autumn,
            _ => Self::Winter,
        }
    }

    /// Temperature swing at full latitude and tilt
    pub fn temperature_factor(&self) -> f32 {
        match self {
            Self::Spring => 0.0,
            Self::Summer => 0.3,
            Self::Autumn => 0.0,
            Self::Winter => -0.3,
        }
    }

    pub fn precipitation_factor(&self) -> f32 {
        match self {
            Self::Spring => 0.2,
            Self::Summer => -0.1,
            Self::Autumn => 0.2,
            Self::Winter => 0.1,
        }
    }

    /// The season in the other hemisphere
    pub fn opposite(&self) -> Self {
        match self {
            Self::Spring => Self::Autumn,
            Self::Summer => Self::Winter,
            Self::Autumn => Self::Spring,
            Self::Winter => Self::Summer,
        }
    }
}

impl Default for Season {
    fn default() -> Self {
        Self::Spring
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_season_per_tick_at_period_four() {
        let seasons: Vec<Season> = (0..8).map(|t| Season::from_tick(t, 4)).collect();
        assert_eq!(
            seasons,
            vec![
                Season::Spring, Season::Summer, Season::Autumn, Season::Winter,
                Season::Spring, Season::Summer, Season::Autumn, Season::Winter,
            ]
        );
    }

    #[test]
    fn test_longer_period_holds_seasons() {
        assert_eq!(Season::from_tick(0, 8), Season::Spring);
        assert_eq!(Season::from_tick(1, 8), Season::Spring);
        assert_eq!(Season::from_tick(2, 8), Season::Summer);
        assert_eq!(Season::from_tick(7, 8), Season::Winter);
    }

    #[test]
    fn test_period_one_is_constant() {
        assert!((0..5).all(|t| Season::from_tick(t, 1) == Season::Spring));
    }

    #[test]
    fn test_hemispheres_mirror() {
        assert_eq!(Season::Summer.opposite(), Season::Winter);
        assert_eq!(Season::Summer.temperature_factor(), -Season::Winter.temperature_factor());
    }
}
