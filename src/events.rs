//! Events and history logging
//!
//! Subsystems describe what happened as `EventKind` values. The kernel
//! stamps them with the tick once the tick commits and forwards them to
//! the history log and the configured sink.

use serde::{Deserialize, Serialize};

use crate::civilization::TechStage;
use crate::climate::WeatherKind;
use crate::core::types::{CatastropheKind, CellCoord, CivilizationId, SpeciesId, Tick};

/// A historical event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub tick: Tick,
    pub kind: EventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    // Ecosystem
    Speciation { parent: SpeciesId, child: SpeciesId, name: String },
    Extinction { species: SpeciesId, name: String, cause: String },

    // Civilizations
    CivilizationFounded { civilization: CivilizationId, species: SpeciesId, name: String, root: CellCoord },
    TechAdvance { civilization: CivilizationId, from: TechStage, to: TechStage },
    Collapse { civilization: CivilizationId, name: String, cause: String },
    CultureShift { civilization: CivilizationId, description: String },
    Discovery { civilization: CivilizationId, description: String },

    // Diplomacy
    FirstContact { a: CivilizationId, b: CivilizationId },
    WarDeclared { aggressor: CivilizationId, defender: CivilizationId },
    WarEnded { victor: CivilizationId, loser: CivilizationId, cells_taken: u32 },

    // Planet
    Disaster { kind: CatastropheKind, severity: f32, epicenter: Option<CellCoord> },
    WeatherFront { kind: WeatherKind, center: CellCoord, radius: u32 },

    /// A value went non-finite and was repaired
    NumericAnomaly { subsystem: String, count: u32 },
}

/// Coarse grouping of event kinds for filtering and reporting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Speciation,
    Extinction,
    CivilizationFounded,
    TechAdvance,
    Collapse,
    Disaster,
    Anomaly,
    Weather,
    Discovery,
    Diplomacy,
}

impl EventKind {
    pub fn category(&self) -> EventCategory {
        match self {
            EventKind::Speciation { .. } => EventCategory::Speciation,
            EventKind::Extinction { .. } => EventCategory::Extinction,
            EventKind::CivilizationFounded { .. } => EventCategory::CivilizationFounded,
            EventKind::TechAdvance { .. } => EventCategory::TechAdvance,
            EventKind::Collapse { .. } => EventCategory::Collapse,
            EventKind::CultureShift { .. } | EventKind::Discovery { .. } => EventCategory::Discovery,
            EventKind::FirstContact { .. } | EventKind::WarDeclared { .. } | EventKind::WarEnded { .. } => {
                EventCategory::Diplomacy
            }
            EventKind::Disaster { .. } => EventCategory::Disaster,
            EventKind::WeatherFront { .. } => EventCategory::Weather,
            EventKind::NumericAnomaly { .. } => EventCategory::Anomaly,
        }
    }

    /// One-line human description
    pub fn describe(&self) -> String {
        match self {
            EventKind::Speciation { parent, child, name } => format!("{name} ({child}) branched from {parent}"),
            EventKind::Extinction { species, name, cause } => format!("{name} ({species}) went extinct: {cause}"),
            EventKind::CivilizationFounded { civilization, species, name, root } => {
                format!("{name} ({civilization}) founded by {species} at {root}")
            }
            EventKind::TechAdvance { civilization, from, to } => {
                format!("{civilization} advanced from {} to {}", from.name(), to.name())
            }
            EventKind::Collapse { civilization, name, cause } => format!("{name} ({civilization}) collapsed: {cause}"),
            EventKind::CultureShift { civilization, description } => format!("{civilization}: {description}"),
            EventKind::Discovery { civilization, description } => format!("{civilization} discovered {description}"),
            EventKind::FirstContact { a, b } => format!("{a} made contact with {b}"),
            EventKind::WarDeclared { aggressor, defender } => format!("{aggressor} declared war on {defender}"),
            EventKind::WarEnded { victor, loser, cells_taken } => {
                format!("{victor} defeated {loser} and took {cells_taken} cells")
            }
            EventKind::Disaster { kind, severity, epicenter } => match epicenter {
                Some(at) => format!("{} (severity {severity:.2}) struck at {at}", kind.name()),
                None => format!("{} (severity {severity:.2}) struck the planet", kind.name()),
            },
            EventKind::WeatherFront { kind, center, radius } => {
                format!("{} formed at {center} (radius {radius})", kind.name())
            }
            EventKind::NumericAnomaly { subsystem, count } => format!("{count} numeric anomalies repaired in {subsystem}"),
        }
    }
}

/// Append-only history log, optionally trimmed to its most recent events
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryLog {
    pub events: Vec<Event>,
    next_event_id: u64,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(&mut self, kind: EventKind, tick: Tick) -> &Event {
        let id = self.next_event_id;
        self.next_event_id += 1;
        self.events.push(Event { id, tick, kind });
        &self.events[self.events.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Events ever recorded, including any trimmed away
    pub fn total_recorded(&self) -> u64 {
        self.next_event_id
    }

    /// Drop the oldest events so at most `limit` remain. 0 keeps everything.
    pub fn retain_latest(&mut self, limit: usize) {
        if limit > 0 && self.events.len() > limit {
            let excess = self.events.len() - limit;
            self.events.drain(..excess);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events_for_tick(&self, tick: Tick) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.tick == tick)
    }

    pub fn events_in(&self, category: EventCategory) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.kind.category() == category)
    }

    pub fn count(&self, category: EventCategory) -> usize {
        self.events_in(category).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase() {
        let mut log = HistoryLog::new();
        let first = log
            .add_event(EventKind::NumericAnomaly { subsystem: "climate".into(), count: 1 }, 3)
            .id;
        let second = log
            .add_event(EventKind::NumericAnomaly { subsystem: "climate".into(), count: 2 }, 3)
            .id;
        assert!(second > first);
        assert_eq!(log.events_for_tick(3).count(), 2);
        assert_eq!(log.count(EventCategory::Anomaly), 2);
    }

    #[test]
    fn test_retain_latest_keeps_newest() {
        let mut log = HistoryLog::new();
        for tick in 1..=5 {
            log.add_event(EventKind::NumericAnomaly { subsystem: "ecosystem".into(), count: 1 }, tick);
        }
        log.retain_latest(0);
        assert_eq!(log.len(), 5);

        log.retain_latest(2);
        let ticks: Vec<Tick> = log.events.iter().map(|e| e.tick).collect();
        assert_eq!(ticks, vec![4, 5]);
        assert_eq!(log.total_recorded(), 5);

        let next = log.add_event(EventKind::NumericAnomaly { subsystem: "ecosystem".into(), count: 1 }, 6).id;
        assert_eq!(next, 5);
    }

    #[test]
    fn test_category_mapping() {
        let kind = EventKind::Speciation { parent: SpeciesId(1), child: SpeciesId(2), name: "Neopodus".into() };
        assert_eq!(kind.category(), EventCategory::Speciation);
        assert!(kind.describe().contains("species#1"));

        let war = EventKind::WarDeclared { aggressor: CivilizationId(0), defender: CivilizationId(1) };
        assert_eq!(war.category(), EventCategory::Diplomacy);
    }
}
