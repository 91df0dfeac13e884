//! Planet-wide events rolled by the kernel once per tick: catastrophes and
//! breakthrough discoveries.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::civilization::{CivilizationSet, DiscoveryBias};
use crate::climate::ClimateShock;
use crate::core::config::KernelConfig;
use crate::core::rng::{stream_rng, Stream};
use crate::core::types::{CatastropheKind, CellCoord, CivilizationId, WorldSeed};
use crate::geography::Geography;

/// A catastrophe that struck this tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Catastrophe {
    pub kind: CatastropheKind,
    /// 0-1
    pub severity: f32,
    pub epicenter: Option<CellCoord>,
}

impl Catastrophe {
    /// Climate effect of the catastrophe, if it has one
    pub fn climate_shock(&self) -> Option<ClimateShock> {
        let s = self.severity;
        match (self.kind, self.epicenter) {
            // Dust winter
            (CatastropheKind::Meteorite, _) => Some(ClimateShock::global("meteorite impact", -0.3 * s, -0.1 * s, 5)),
            (CatastropheKind::Supervolcano, Some(center)) => {
                Some(ClimateShock::regional("supervolcano", center, 12, -0.25 * s, -0.05 * s, 4))
            }
            (CatastropheKind::Supervolcano, None) => Some(ClimateShock::global("supervolcano", -0.1 * s, 0.0, 3)),
            (CatastropheKind::SolarFlare, _) => Some(ClimateShock::global("solar flare", 0.15 * s, -0.05 * s, 2)),
            (CatastropheKind::Pandemic, _) => None,
        }
    }
}

pub struct DisasterEngine {
    config: KernelConfig,
    rng: ChaCha8Rng,
}

impl DisasterEngine {
    pub fn new(config: KernelConfig, seed: WorldSeed) -> Self {
        Self::with_rng(config, stream_rng(seed, Stream::Disasters))
    }

    pub fn with_rng(config: KernelConfig, rng: ChaCha8Rng) -> Self {
        Self { config, rng }
    }

    pub fn rng(&self) -> &ChaCha8Rng {
        &self.rng
    }

    /// Roll for a catastrophe. Tectonically active planets erupt more often.
    pub fn roll_catastrophe(&mut self, geography: &Geography) -> Option<Catastrophe> {
        let chance = self.config.catastrophe_chance * (0.5 + geography.planet().tectonic_activity);
        if self.rng.gen::<f32>() >= chance {
            return None;
        }

        let kind = CatastropheKind::ALL[self.rng.gen_range(0..CatastropheKind::ALL.len())];
        let severity = self.rng.gen_range(0.3..1.0);
        let epicenter = match kind {
            CatastropheKind::Meteorite | CatastropheKind::Supervolcano => Some(CellCoord::new(
                self.rng.gen_range(0..geography.width()),
                self.rng.gen_range(0..geography.height()),
            )),
            CatastropheKind::SolarFlare | CatastropheKind::Pandemic => None,
        };
        Some(Catastrophe { kind, severity, epicenter })
    }

    /// Roll for a breakthrough in one live civilization. The bias applies on
    /// the following tick.
    pub fn roll_discovery(&mut self, civilizations: &CivilizationSet) -> Option<(CivilizationId, DiscoveryBias)> {
        if self.rng.gen::<f32>() >= self.config.discovery_chance {
            return None;
        }
        let live: Vec<CivilizationId> = civilizations.live().map(|c| c.id).collect();
        if live.is_empty() {
            return None;
        }
        let id = live[self.rng.gen_range(0..live.len())];
        Some((id, [(id, self.config.discovery_bias)].into_iter().collect()))
    }
}
