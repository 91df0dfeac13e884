//! Tech progress, population and internal culture

use rand::Rng;

use crate::civilization::civilization::{Civilization, TechStage};
use crate::core::config::CivilizationConfig;
use crate::events::EventKind;

/// Progress toward the next stage earned this tick
pub fn tech_gain(civ: &Civilization, intelligence: f32, cfg: &CivilizationConfig) -> f32 {
    let base = 0.001;
    let intellect = intelligence * 0.01;
    let creativity = civ.culture.creativity * 0.005;
    let people = (civ.population as f32 / 1_000_000.0 * 0.005).min(0.01);
    let order = civ.culture.stability * 0.002;

    let mut gain = base + intellect + creativity + people + order;
    if civ.tech_stage >= TechStage::Information {
        gain *= 0.5;
    }
    gain * cfg.tech_rate
}

/// Try to move up one stage once progress is full. Returns the transition.
pub fn try_advance<R: Rng>(civ: &mut Civilization, rng: &mut R) -> Option<(TechStage, TechStage)> {
    if civ.tech_progress < 1.0 {
        return None;
    }
    let next = civ.tech_stage.next()?;
    let chance = 0.5 + civ.culture.creativity * 0.5;
    if rng.gen::<f32>() >= chance {
        return None;
    }

    let from = civ.tech_stage;
    civ.tech_stage = next;
    civ.tech_progress = 0.0;
    civ.peak_stage = civ.peak_stage.max(next);
    civ.technologies.extend(next.technologies().iter().map(|t| t.to_string()));
    civ.government = civ.government.after_advance(next, rng);
    Some((from, next))
}

/// Carrying capacity of the territory at the current stage
pub fn capacity(civ: &Civilization, mean_habitability: f32) -> f64 {
    civ.tech_stage.base_capacity() * civ.territory.len() as f64 / 100.0 * mean_habitability as f64
}

/// Population after one tick of growth
pub fn grow(civ: &Civilization, mean_habitability: f32) -> u64 {
    let capacity = capacity(civ, mean_habitability);
    let n = civ.population as f64;

    let mut rate = 0.01 + civ.tech_stage.growth_modifier() as f64 + civ.culture.stability as f64 * 0.01;
    if n > capacity {
        rate = -0.01;
    } else if n > capacity * 0.8 {
        rate *= 1.0 - n / capacity;
    }
    (n * (1.0 + rate)).round().max(0.0) as u64
}

/// Small random walk of one culture trait per tick
pub fn drift_culture<R: Rng>(civ: &mut Civilization, rng: &mut R) {
    let shift = rng.gen_range(-0.02..=0.02);
    match rng.gen_range(0..4) {
        0 => civ.culture.stability += shift,
        1 => civ.culture.aggression += shift,
        2 => civ.culture.cooperation += shift,
        _ => civ.culture.creativity += shift,
    }
    civ.culture.clamp();
}

/// Random internal event. Weights: cultural 1, political 1, economic 1,
/// local disaster 0.5, discovery 0.8.
pub fn random_event<R: Rng>(civ: &mut Civilization, rng: &mut R) -> EventKind {
    let roll = rng.gen_range(0.0..4.3);
    let id = civ.id;
    if roll < 1.0 {
        civ.culture.creativity += 0.05;
        civ.culture.clamp();
        EventKind::CultureShift { civilization: id, description: "an artistic golden age".into() }
    } else if roll < 2.0 {
        let unrest = rng.gen_range(0.02..0.1);
        civ.culture.stability -= unrest;
        civ.culture.clamp();
        EventKind::CultureShift { civilization: id, description: "political upheaval".into() }
    } else if roll < 3.0 {
        let boom = rng.gen_bool(0.6);
        let factor = if boom { 1.05 } else { 0.95 };
        civ.population = (civ.population as f64 * factor).round() as u64;
        let description = if boom { "an economic boom" } else { "an economic depression" };
        EventKind::CultureShift { civilization: id, description: description.into() }
    } else if roll < 3.5 {
        let loss = rng.gen_range(0.1..0.3);
        civ.population = (civ.population as f64 * (1.0 - loss)).round() as u64;
        EventKind::CultureShift { civilization: id, description: format!("a local disaster killing {:.0}%", loss * 100.0) }
    } else {
        civ.tech_progress += 0.1;
        EventKind::Discovery { civilization: id, description: "an unexpected breakthrough".into() }
    }
}
