//! Real-time driver for the kernel
//!
//! Steps the simulation on a tokio interval. Pause and stop requests come in
//! through a shared [`KernelControl`] and take effect at the next tick
//! boundary; a tick in progress always completes.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;

use crate::core::error::Result;
use crate::core::types::Tick;
use crate::kernel::snapshot::WorldStats;
use crate::kernel::{Phase, Simulation};

/// Shared run controls. Lock-free, safe to poke from any task.
#[derive(Debug)]
pub struct KernelControl {
    paused: AtomicBool,
    stop_requested: AtomicBool,
    wake: Notify,
    /// 0 runs ticks back to back
    tick_interval_ms: AtomicU64,
}

impl KernelControl {
    pub fn new(ticks_per_second: f32) -> Self {
        Self {
            paused: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            wake: Notify::new(),
            tick_interval_ms: AtomicU64::new(interval_ms(ticks_per_second)),
        }
    }

    /// No cadence: step as fast as the machine allows
    pub fn headless() -> Self {
        Self::new(0.0)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.wake.notify_one();
    }

    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.wake.notify_one();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    pub fn set_ticks_per_second(&self, ticks_per_second: f32) {
        self.tick_interval_ms.store(interval_ms(ticks_per_second), Ordering::Release);
    }

    async fn wait_while_paused(&self) {
        while self.is_paused() && !self.is_stop_requested() {
            self.wake.notified().await;
        }
    }
}

fn interval_ms(ticks_per_second: f32) -> u64 {
    if ticks_per_second.is_finite() && ticks_per_second > 0.0 {
        (1000.0 / ticks_per_second).round() as u64
    } else {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    MaxTicksReached,
    StopRequested,
    /// The kernel was terminated outside the runner
    Terminated,
}

/// What a run did, for printing or writing out as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub planet: String,
    pub seed: u64,
    pub reason: StopReason,
    pub ticks_run: u64,
    pub final_tick: Tick,
    pub elapsed_ms: u64,
    pub events_logged: u64,
    pub final_stats: Option<WorldStats>,
}

impl RunSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Step `sim` until `max_ticks` more ticks have run, a stop is requested or
/// the kernel terminates. A fatal kernel error ends the run with that error.
pub async fn run(sim: &mut Simulation, control: &KernelControl, max_ticks: Option<u64>) -> Result<RunSummary> {
    let start = Instant::now();
    let first_tick = sim.tick();
    let mut current_ms = control.tick_interval_ms();
    let mut interval = make_interval(current_ms);

    tracing::info!(from = first_tick, max_ticks = ?max_ticks, interval_ms = current_ms, "Run started");

    let reason = loop {
        if control.is_stop_requested() {
            break StopReason::StopRequested;
        }
        if sim.phase() == Phase::Terminated {
            break StopReason::Terminated;
        }
        if control.is_paused() {
            if sim.phase() == Phase::Running {
                sim.pause()?;
            }
            control.wait_while_paused().await;
            continue;
        }
        if sim.phase() == Phase::Paused {
            sim.resume()?;
        }
        if max_ticks.is_some_and(|max| sim.tick() - first_tick >= max) {
            break StopReason::MaxTicksReached;
        }

        let ms = control.tick_interval_ms();
        if ms != current_ms {
            current_ms = ms;
            interval = make_interval(ms);
        }
        match interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => tokio::task::yield_now().await,
        }

        sim.step()?;
    };

    let summary = RunSummary {
        planet: sim.geography().name().to_string(),
        seed: sim.config().world.seed,
        reason,
        ticks_run: sim.tick() - first_tick,
        final_tick: sim.tick(),
        elapsed_ms: start.elapsed().as_millis() as u64,
        events_logged: sim.history().total_recorded(),
        final_stats: sim.latest_snapshot().map(|s| s.stats.clone()),
    };
    tracing::info!(reason = ?summary.reason, ticks = summary.ticks_run, elapsed_ms = summary.elapsed_ms, "Run finished");
    Ok(summary)
}

fn make_interval(ms: u64) -> Option<tokio::time::Interval> {
    (ms > 0).then(|| {
        let mut interval = tokio::time::interval(Duration::from_millis(ms));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use std::sync::Arc;

    fn sim() -> Simulation {
        let mut config = SimulationConfig::default();
        config.world.width = 16;
        config.world.height = 12;
        Simulation::initialize(config).unwrap()
    }

    #[test]
    fn test_interval_from_speed() {
        assert_eq!(interval_ms(1.0), 1000);
        assert_eq!(interval_ms(4.0), 250);
        assert_eq!(interval_ms(0.0), 0);
        assert_eq!(interval_ms(f32::NAN), 0);
    }

    #[tokio::test]
    async fn test_headless_run_stops_at_limit() {
        let mut sim = sim();
        let control = KernelControl::headless();
        let summary = run(&mut sim, &control, Some(5)).await.unwrap();
        assert_eq!(summary.reason, StopReason::MaxTicksReached);
        assert_eq!(summary.ticks_run, 5);
        assert_eq!(sim.tick(), 5);
    }

    #[tokio::test]
    async fn test_stop_before_first_tick() {
        let mut sim = sim();
        let control = KernelControl::headless();
        control.request_stop();
        let summary = run(&mut sim, &control, None).await.unwrap();
        assert_eq!(summary.reason, StopReason::StopRequested);
        assert_eq!(summary.ticks_run, 0);
    }

    #[tokio::test]
    async fn test_pause_then_stop() {
        let mut sim = sim();
        let control = Arc::new(KernelControl::headless());
        control.pause();

        let remote = Arc::clone(&control);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            remote.request_stop();
        });

        let summary = run(&mut sim, &control, Some(100)).await.unwrap();
        assert_eq!(summary.reason, StopReason::StopRequested);
        assert_eq!(summary.ticks_run, 0);
        assert_eq!(sim.phase(), Phase::Paused);
    }
}
