//! Simulation kernel
//!
//! Owns the world and drives the per-tick pipeline:
//! climate → ecosystem → civilization → global events → consistency check
//! → commit → snapshot publish → event dispatch.
//!
//! Each stage reads the committed state of the previous tick and produces a
//! candidate. Nothing is committed, published or dispatched unless the whole
//! candidate passes the consistency check.

pub mod consistency;
pub mod disasters;
pub mod persist;
pub mod runner;
pub mod sink;
pub mod snapshot;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::civilization::{CivilizationEngine, CivilizationSet, DiscoveryBias};
use crate::climate::{ClimateEngine, ClimateState};
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::Tick;
use crate::ecosystem::{EcosystemEngine, SpeciesSet};
use crate::events::{EventKind, HistoryLog};
use crate::geography::{self, Geography};

pub use disasters::{Catastrophe, DisasterEngine};
pub use persist::{RngStates, SavedWorld};
pub use runner::{run, KernelControl, RunSummary, StopReason};
pub use sink::{ChannelSink, EventSink, TracingSink};
pub use snapshot::{WorldSnapshot, WorldStats};

/// Kernel lifecycle: Initializing → Running ⇄ Paused → Terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Initializing,
    Running,
    Paused,
    Terminated,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Initializing => "initializing",
            Phase::Running => "running",
            Phase::Paused => "paused",
            Phase::Terminated => "terminated",
        }
    }
}

pub struct Simulation {
    config: SimulationConfig,
    phase: Phase,
    tick: Tick,
    geography: Arc<Geography>,
    climate: ClimateState,
    species: SpeciesSet,
    civilizations: CivilizationSet,
    /// Discovery granted last tick, applied to this tick's progress
    pending_bias: DiscoveryBias,
    climate_engine: ClimateEngine,
    ecosystem_engine: EcosystemEngine,
    civilization_engine: CivilizationEngine,
    disasters: DisasterEngine,
    history: HistoryLog,
    sink: Option<Box<dyn EventSink>>,
    snapshots: watch::Sender<Option<Arc<WorldSnapshot>>>,
}

impl Simulation {
    /// Validate the configuration, generate the world and start running
    pub fn initialize(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.world.seed;
        tracing::info!(seed, width = config.world.width, height = config.world.height, "Initializing world");

        let geography = geography::generate_named(
            seed,
            config.world.width,
            config.world.height,
            &config.geography,
            config.world.planet_name.as_deref(),
        )?;
        let mut climate_engine = ClimateEngine::new(config.climate.clone(), seed);
        let climate = climate_engine.initial_state(&geography);
        let mut ecosystem_engine = EcosystemEngine::new(config.ecosystem.clone(), seed);
        let species = ecosystem_engine.seed_initial();
        let civilization_engine = CivilizationEngine::new(config.civilization.clone(), seed)
            .with_suitability(config.ecosystem.suitability_weights);
        let disasters = DisasterEngine::new(config.kernel.clone(), seed);

        let mut sim = Self {
            phase: Phase::Initializing,
            tick: 0,
            geography: Arc::new(geography),
            climate,
            species,
            civilizations: CivilizationSet::new(),
            pending_bias: DiscoveryBias::new(),
            climate_engine,
            ecosystem_engine,
            civilization_engine,
            disasters,
            history: HistoryLog::new(),
            sink: None,
            snapshots: watch::channel(None).0,
            config,
        };
        sim.phase = Phase::Running;
        sim.publish(0);
        tracing::info!(planet = sim.geography.name(), species = sim.species.len(), "World ready");
        Ok(sim)
    }

    /// Rebuild a simulation from a saved world. A saved paused world comes
    /// back paused; anything else comes back running.
    pub fn restore(saved: SavedWorld) -> Result<Self> {
        saved.config.validate()?;
        let SavedWorld {
            config,
            phase,
            tick,
            geography,
            climate,
            species,
            civilizations,
            pending_bias,
            rng,
            history,
        } = saved;

        if phase == Phase::Terminated {
            return Err(SimError::InvalidPhase { from: phase.name().into(), to: Phase::Running.name().into() });
        }
        if geography.width() != config.world.width
            || geography.height() != config.world.height
            || climate.cells.len() != geography.cell_count()
        {
            return Err(SimError::Configuration("saved world does not match its configuration".into()));
        }
        consistency::check(tick, &geography, &climate, &species, &civilizations)?;

        let civilization_engine = CivilizationEngine::with_rng(config.civilization.clone(), rng.civilization)
            .with_suitability(config.ecosystem.suitability_weights);
        let mut sim = Self {
            phase: if phase == Phase::Paused { Phase::Paused } else { Phase::Running },
            tick,
            geography: Arc::new(geography),
            climate,
            species,
            civilizations,
            pending_bias,
            climate_engine: ClimateEngine::with_rng(config.climate.clone(), rng.climate),
            ecosystem_engine: EcosystemEngine::with_rng(config.ecosystem.clone(), rng.ecosystem),
            civilization_engine,
            disasters: DisasterEngine::with_rng(config.kernel.clone(), rng.disasters),
            history,
            sink: None,
            snapshots: watch::channel(None).0,
            config,
        };
        sim.publish(0);
        tracing::info!(tick, phase = sim.phase.name(), "World restored");
        Ok(sim)
    }

    /// Forward committed events to `sink` as well as the history log
    pub fn with_event_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn set_event_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sink = Some(sink);
    }

    /// Advance one year. Only valid while running.
    ///
    /// A consistency violation terminates the kernel: the candidate state is
    /// dropped and nothing is published.
    pub fn step(&mut self) -> Result<Arc<WorldSnapshot>> {
        if self.phase != Phase::Running {
            return Err(SimError::NotRunning(self.phase.name().into()));
        }
        let tick = self.tick + 1;
        let geo = Arc::clone(&self.geography);
        let mut events = Vec::new();

        // 1. Climate
        let climate_step = self.climate_engine.advance(&self.climate, &geo, tick);
        let mut climate = climate_step.state;
        for front in climate_step.new_fronts {
            events.push(EventKind::WeatherFront { kind: front.kind, center: front.center, radius: front.radius });
        }
        if climate_step.anomalies > 0 {
            tracing::warn!(tick, count = climate_step.anomalies, "Repaired non-finite climate values");
            events.push(EventKind::NumericAnomaly { subsystem: "climate".into(), count: climate_step.anomalies });
        }

        // 2. Ecosystem
        let eco_step = self.ecosystem_engine.advance(&self.species, &geo, &climate, tick);
        let mut species = eco_step.species;
        events.extend(eco_step.events);
        if eco_step.anomalies > 0 {
            tracing::warn!(tick, count = eco_step.anomalies, "Repaired non-finite ecosystem values");
            events.push(EventKind::NumericAnomaly { subsystem: "ecosystem".into(), count: eco_step.anomalies });
        }

        // 3. Civilizations
        let civ_step =
            self.civilization_engine
                .advance(&species, &self.civilizations, &geo, &climate, &self.pending_bias, tick);
        let mut civilizations = civ_step.civilizations;
        events.extend(civ_step.events);
        climate.register_emissions(civ_step.industrial_count as f32 * self.config.kernel.emissions_per_industrial);

        // 4. Global events
        if let Some(catastrophe) = self.disasters.roll_catastrophe(&geo) {
            tracing::warn!(tick, kind = catastrophe.kind.name(), severity = catastrophe.severity, "Catastrophe");
            events.push(EventKind::Disaster {
                kind: catastrophe.kind,
                severity: catastrophe.severity,
                epicenter: catastrophe.epicenter,
            });
            if let Some(shock) = catastrophe.climate_shock() {
                climate.apply_shock(shock);
            }
            events.extend(self.ecosystem_engine.apply_catastrophe(
                &mut species,
                catastrophe.kind,
                catastrophe.severity,
                tick,
            ));
            events.extend(self.civilization_engine.apply_catastrophe(
                &mut civilizations,
                catastrophe.kind,
                catastrophe.severity,
                tick,
            ));
        }
        let mut next_bias = DiscoveryBias::new();
        if let Some((id, bias)) = self.disasters.roll_discovery(&civilizations) {
            events.push(EventKind::Discovery { civilization: id, description: "a scientific breakthrough".into() });
            next_bias = bias;
        }

        // 5. Consistency
        if let Err(err) = consistency::check(tick, &geo, &climate, &species, &civilizations) {
            tracing::error!(tick, error = %err, "Consistency violation, halting");
            self.phase = Phase::Terminated;
            return Err(err);
        }

        // 6. Commit
        self.tick = tick;
        self.climate = climate;
        self.species = species;
        self.civilizations = civilizations;
        self.pending_bias = next_bias;

        // 7. Publish, then 8. dispatch
        let snapshot = self.publish(events.len() as u32);
        for kind in events {
            let event = self.history.add_event(kind, tick);
            if let Some(sink) = self.sink.as_mut() {
                sink.record(event);
            }
        }
        self.history.retain_latest(self.config.kernel.history_limit);

        tracing::debug!(tick, summary = %snapshot.summary(), "Tick committed");
        Ok(snapshot)
    }

    pub fn pause(&mut self) -> Result<()> {
        self.transition(Phase::Running, Phase::Paused)
    }

    pub fn resume(&mut self) -> Result<()> {
        self.transition(Phase::Paused, Phase::Running)
    }

    /// Stop for good. Valid from any phase except Terminated.
    pub fn terminate(&mut self) -> Result<()> {
        if self.phase == Phase::Terminated {
            return Err(SimError::InvalidPhase { from: self.phase.name().into(), to: Phase::Terminated.name().into() });
        }
        self.phase = Phase::Terminated;
        tracing::info!(tick = self.tick, "Simulation terminated");
        Ok(())
    }

    /// Phase changes are published too, so a tick can appear twice in the
    /// feed; snapshots are distinct per (tick, phase).
    fn transition(&mut self, from: Phase, to: Phase) -> Result<()> {
        if self.phase != from {
            return Err(SimError::InvalidPhase { from: self.phase.name().into(), to: to.name().into() });
        }
        self.phase = to;
        self.publish(0);
        tracing::info!(tick = self.tick, phase = to.name(), "Phase changed");
        Ok(())
    }

    fn publish(&mut self, events_this_tick: u32) -> Arc<WorldSnapshot> {
        let snapshot = Arc::new(WorldSnapshot::capture(
            self.tick,
            self.phase,
            &self.geography,
            &self.climate,
            &self.species,
            &self.civilizations,
            events_this_tick,
        ));
        self.snapshots.send_replace(Some(Arc::clone(&snapshot)));
        snapshot
    }

    /// Receive each published snapshot. Slow readers only see the latest.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<WorldSnapshot>>> {
        self.snapshots.subscribe()
    }

    pub fn latest_snapshot(&self) -> Option<Arc<WorldSnapshot>> {
        self.snapshots.borrow().clone()
    }

    /// Everything needed to continue this run later
    pub fn save(&self) -> SavedWorld {
        SavedWorld {
            config: self.config.clone(),
            phase: self.phase,
            tick: self.tick,
            geography: (*self.geography).clone(),
            climate: self.climate.clone(),
            species: self.species.clone(),
            civilizations: self.civilizations.clone(),
            pending_bias: self.pending_bias.clone(),
            rng: RngStates {
                climate: self.climate_engine.rng().clone(),
                ecosystem: self.ecosystem_engine.rng().clone(),
                civilization: self.civilization_engine.rng().clone(),
                disasters: self.disasters.rng().clone(),
            },
            history: self.history.clone(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn geography(&self) -> &Arc<Geography> {
        &self.geography
    }

    pub fn climate(&self) -> &ClimateState {
        &self.climate
    }

    pub fn species(&self) -> &SpeciesSet {
        &self.species
    }

    pub fn civilizations(&self) -> &CivilizationSet {
        &self.civilizations
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }
}
