//! Closed set of heritable traits
//!
//! Traits are a fixed table indexed by `TraitKind`. New traits are added to
//! the enum; there is no free-form trait bag.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Lowest and highest value a mutated trait may take
pub const TRAIT_FLOOR: f32 = 0.01;
pub const TRAIT_CEILING: f32 = 0.99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TraitKind {
    Size,
    Speed,
    Complexity,
    Adaptability,
    Fecundity,
    Lifespan,
    /// Preferred temperature on the normalized scale
    ThermalPreference,
    /// Preferred precipitation on the normalized scale
    MoisturePreference,
    Camouflage,
}

impl TraitKind {
    pub const COUNT: usize = 9;

    pub const ALL: [TraitKind; Self::COUNT] = [
        TraitKind::Size,
        TraitKind::Speed,
        TraitKind::Complexity,
        TraitKind::Adaptability,
        TraitKind::Fecundity,
        TraitKind::Lifespan,
        TraitKind::ThermalPreference,
        TraitKind::MoisturePreference,
        TraitKind::Camouflage,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            TraitKind::Size => "size",
            TraitKind::Speed => "speed",
            TraitKind::Complexity => "complexity",
            TraitKind::Adaptability => "adaptability",
            TraitKind::Fecundity => "fecundity",
            TraitKind::Lifespan => "lifespan",
            TraitKind::ThermalPreference => "thermal_preference",
            TraitKind::MoisturePreference => "moisture_preference",
            TraitKind::Camouflage => "camouflage",
        }
    }
}

impl fmt::Display for TraitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TraitKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        TraitKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| SimError::InvalidTrait(format!("unknown trait '{s}'")))
    }
}

/// One value in [0, 1] per trait kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitVector {
    values: [f32; TraitKind::COUNT],
}

impl Default for TraitVector {
    fn default() -> Self {
        Self { values: [0.5; TraitKind::COUNT] }
    }
}

impl TraitVector {
    /// Build from named values. Every trait must be present and in [0, 1].
    pub fn from_named(named: &BTreeMap<String, f32>) -> Result<Self> {
        let mut values = [f32::NAN; TraitKind::COUNT];
        for (name, &value) in named {
            let kind: TraitKind = name.parse()?;
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::InvalidTrait(format!("{kind} = {value} is outside [0, 1]")));
            }
            values[kind.index()] = value;
        }
        if let Some(missing) = TraitKind::ALL.iter().find(|k| values[k.index()].is_nan()) {
            return Err(SimError::InvalidTrait(format!("missing trait '{missing}'")));
        }
        Ok(Self { values })
    }

    /// Build from `(kind, value)` pairs on top of the neutral 0.5 default
    pub fn with(pairs: &[(TraitKind, f32)]) -> Result<Self> {
        let mut vector = Self::default();
        for &(kind, value) in pairs {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::InvalidTrait(format!("{kind} = {value} is outside [0, 1]")));
            }
            vector.values[kind.index()] = value;
        }
        Ok(vector)
    }

    pub fn get(&self, kind: TraitKind) -> f32 {
        self.values[kind.index()]
    }

    /// Set a trait, clamped into the mutable range
    pub fn set(&mut self, kind: TraitKind, value: f32) {
        self.values[kind.index()] = value.clamp(TRAIT_FLOOR, TRAIT_CEILING);
    }

    pub fn to_named(&self) -> BTreeMap<String, f32> {
        TraitKind::ALL.iter().map(|k| (k.name().to_string(), self.get(*k))).collect()
    }

    /// Copy with every trait shifted by up to `scale`
    pub fn mutated<R: Rng>(&self, scale: f32, rng: &mut R) -> Self {
        let mut child = *self;
        for kind in TraitKind::ALL {
            let shift = if scale > 0.0 { rng.gen_range(-scale..=scale) } else { 0.0 };
            child.set(kind, self.get(kind) + shift);
        }
        child
    }

    pub fn is_valid(&self) -> bool {
        self.values.iter().all(|v| v.is_finite() && (0.0..=1.0).contains(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_parse_names() {
        for kind in TraitKind::ALL {
            assert_eq!(kind.name().parse::<TraitKind>().unwrap(), kind);
        }
        assert!("wingspan".parse::<TraitKind>().is_err());
    }

    #[test]
    fn test_from_named_requires_every_trait() {
        let mut named = TraitVector::default().to_named();
        assert!(TraitVector::from_named(&named).is_ok());

        named.remove("speed");
        let err = TraitVector::from_named(&named).unwrap_err();
        assert!(err.to_string().contains("speed"));
    }

    #[test]
    fn test_from_named_rejects_out_of_range() {
        let mut named = TraitVector::default().to_named();
        named.insert("size".into(), 1.5);
        assert!(TraitVector::from_named(&named).is_err());
    }

    #[test]
    fn test_mutation_stays_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut traits = TraitVector::with(&[(TraitKind::Size, 0.99), (TraitKind::Speed, 0.01)]).unwrap();
        for _ in 0..100 {
            traits = traits.mutated(0.1, &mut rng);
            assert!(traits.is_valid());
            assert!(traits.get(TraitKind::Size) >= TRAIT_FLOOR);
            assert!(traits.get(TraitKind::Size) <= TRAIT_CEILING);
        }
    }
}
