//! Saved worlds
//!
//! A `SavedWorld` holds everything a run needs to continue exactly where it
//! stopped, random stream positions included. The format is plain JSON and
//! carries no compatibility promise across crate versions.

use std::fs;
use std::path::Path;

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::civilization::{CivilizationSet, DiscoveryBias};
use crate::climate::ClimateState;
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::Tick;
use crate::ecosystem::SpeciesSet;
use crate::events::HistoryLog;
use crate::geography::Geography;
use crate::kernel::Phase;

/// Position of every subsystem's random stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RngStates {
    pub climate: ChaCha8Rng,
    pub ecosystem: ChaCha8Rng,
    pub civilization: ChaCha8Rng,
    pub disasters: ChaCha8Rng,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedWorld {
    pub config: SimulationConfig,
    pub phase: Phase,
    pub tick: Tick,
    pub geography: Geography,
    pub climate: ClimateState,
    /// Tombstones included
    pub species: SpeciesSet,
    /// Collapsed civilizations included
    pub civilizations: CivilizationSet,
    pub pending_bias: DiscoveryBias,
    pub rng: RngStates,
    pub history: HistoryLog,
}

impl SavedWorld {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        tracing::info!(path = %path.display(), tick = self.tick, "World saved");
        Ok(())
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::SimError;
    use crate::kernel::Simulation;

    fn config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.world.seed = 77;
        config.world.width = 20;
        config.world.height = 14;
        config
    }

    #[test]
    fn test_json_round_trip_is_lossless() {
        let mut sim = Simulation::initialize(config()).unwrap();
        for _ in 0..5 {
            sim.step().unwrap();
        }
        let saved = sim.save();
        let restored = SavedWorld::from_json(&saved.to_json().unwrap()).unwrap();
        assert_eq!(restored, saved);
    }

    #[test]
    fn test_garbage_is_a_serde_error() {
        assert!(matches!(SavedWorld::from_json("{ not json"), Err(SimError::SerdeError(_))));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let result = SavedWorld::load_from("/nonexistent/ecosphere/world.json");
        assert!(matches!(result, Err(SimError::IoError(_))));
    }
}
