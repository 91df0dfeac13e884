//! Contact, relations and war between civilizations

use std::collections::BTreeSet;

use rand::Rng;

use crate::civilization::civilization::{Civilization, CivilizationSet};
use crate::core::config::CivilizationConfig;
use crate::core::types::{CellCoord, CivilizationId};
use crate::events::EventKind;
use crate::geography::Geography;

/// Chance per tick that hostile neighbors go to war
const WAR_CHANCE: f32 = 0.1;

fn within_reach(a: &Civilization, b: &Civilization, width: u32, distance: u32) -> bool {
    let limit = distance * distance;
    a.territory
        .iter()
        .any(|ca| b.territory.iter().any(|cb| ca.wrapped_distance_sq(cb, width) <= limit))
}

fn opening_relation<R: Rng>(own: &Civilization, other: &Civilization, rng: &mut R) -> f32 {
    let mut relation = rng.gen_range(-0.3..=0.3);
    if own.government == other.government {
        relation += 0.2;
    }
    if own.tech_stage.index().abs_diff(other.tech_stage.index()) <= 1 {
        relation += 0.1;
    }
    relation += (own.culture.cooperation - 0.5) * 0.2;
    relation -= (own.culture.aggression - 0.5) * 0.2;
    relation.clamp(-1.0, 1.0)
}

fn relation_drift<R: Rng>(own: &Civilization, other: &Civilization, rng: &mut R) -> f32 {
    let mut drift = rng.gen_range(-0.05..=0.05);
    if own.government == other.government {
        drift += 0.01;
    }
    if own.tech_stage.index().abs_diff(other.tech_stage.index()) > 2 {
        drift -= 0.01;
    }
    drift - (own.culture.aggression - 0.5) * 0.02
}

/// Update contacts and relations, then fight any wars. Mutates `set` in place.
pub fn run<R: Rng>(
    set: &mut CivilizationSet,
    geography: &Geography,
    cfg: &CivilizationConfig,
    rng: &mut R,
) -> Vec<EventKind> {
    let mut events = Vec::new();
    let ids: Vec<CivilizationId> = set.live().map(|c| c.id).collect();

    for (i, &a) in ids.iter().enumerate() {
        for &b in &ids[i + 1..] {
            let (Some(ca), Some(cb)) = (set.get(a), set.get(b)) else { continue };
            let known = ca.relations.contains_key(&b);
            if !known {
                if !within_reach(ca, cb, geography.width(), cfg.contact_distance) {
                    continue;
                }
                let ab = opening_relation(ca, cb, rng);
                let ba = opening_relation(cb, ca, rng);
                if let Some(c) = set.get_mut(a) {
                    c.relations.insert(b, ab);
                }
                if let Some(c) = set.get_mut(b) {
                    c.relations.insert(a, ba);
                }
                events.push(EventKind::FirstContact { a, b });
                continue;
            }

            let ab = relation_drift(ca, cb, rng);
            let ba = relation_drift(cb, ca, rng);
            let mut hostile = false;
            if let Some(c) = set.get_mut(a) {
                let r = c.relations.entry(b).or_insert(0.0);
                *r = (*r + ab).clamp(-1.0, 1.0);
                hostile |= *r < cfg.war_threshold;
            }
            if let Some(c) = set.get_mut(b) {
                let r = c.relations.entry(a).or_insert(0.0);
                *r = (*r + ba).clamp(-1.0, 1.0);
                hostile |= *r < cfg.war_threshold;
            }

            if hostile && rng.gen::<f32>() < WAR_CHANCE {
                events.extend(wage_war(set, a, b, geography, rng));
            }
        }
    }
    events
}

/// Fight one war. The more aggressive side declares it.
pub fn wage_war<R: Rng>(
    set: &mut CivilizationSet,
    a: CivilizationId,
    b: CivilizationId,
    geography: &Geography,
    rng: &mut R,
) -> Vec<EventKind> {
    let (Some(ca), Some(cb)) = (set.get(a), set.get(b)) else { return Vec::new() };
    let (aggressor, defender) = if ca.culture.aggression >= cb.culture.aggression { (a, b) } else { (b, a) };

    let power = |c: &Civilization, roll: f32| c.population as f32 / 1_000_000.0 * (c.tech_stage.index() + 1) as f32 * roll;
    let pa = power(ca, rng.gen_range(0.8..1.2));
    let pb = power(cb, rng.gen_range(0.8..1.2));

    // (victor, loser, share of loser's border taken, victor survival, loser survival)
    let (victor, loser, share, keep_victor, keep_loser) = if pa > pb * 1.5 {
        (a, b, 0.2, 0.95, 0.7)
    } else if pa > pb {
        (a, b, 0.1, 0.9, 0.85)
    } else if pb > pa * 1.5 {
        (b, a, 0.2, 0.95, 0.7)
    } else {
        (b, a, 0.1, 0.9, 0.85)
    };

    let taken = transfer_border(set, victor, loser, share, geography);
    for (id, keep, relation) in [(victor, keep_victor, -0.5), (loser, keep_loser, -0.7)] {
        if let Some(c) = set.get_mut(id) {
            c.population = (c.population as f64 * keep).round() as u64;
            c.culture.stability -= 0.1;
            c.culture.clamp();
            let other = if id == victor { loser } else { victor };
            c.relations.insert(other, relation);
        }
    }

    vec![
        EventKind::WarDeclared { aggressor, defender },
        EventKind::WarEnded { victor, loser, cells_taken: taken },
    ]
}

/// Move `share` of the loser's cells that touch the victor's land
fn transfer_border(
    set: &mut CivilizationSet,
    victor: CivilizationId,
    loser: CivilizationId,
    share: f32,
    geography: &Geography,
) -> u32 {
    let (Some(win), Some(lose)) = (set.get(victor), set.get(loser)) else { return 0 };
    let border: Vec<CellCoord> = lose
        .territory
        .iter()
        .copied()
        .filter(|c| geography.neighbors(*c).iter().any(|n| win.territory.contains(n)))
        .collect();
    if border.is_empty() {
        return 0;
    }
    let count = ((lose.territory.len() as f32 * share).ceil() as usize).clamp(1, border.len());
    let moved: BTreeSet<CellCoord> = border.into_iter().take(count).collect();

    if let Some(c) = set.get_mut(loser) {
        c.territory.retain(|cell| !moved.contains(cell));
    }
    if let Some(c) = set.get_mut(victor) {
        c.territory.extend(moved.iter().copied());
    }
    moved.len() as u32
}
