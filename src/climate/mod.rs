//! Climate engine
//!
//! Advances the per-cell temperature, precipitation and wind field by one
//! tick. Forcing comes from latitude, season, elevation, ocean currents,
//! weather fronts, climate shocks and accumulated global warming. Every cell
//! moves at most a bounded step per tick, so the field cannot blow up.

pub mod currents;
pub mod season;
pub mod shock;
pub mod weather;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::ClimateConfig;
use crate::core::rng::{stream_rng, Stream};
use crate::core::types::{CellCoord, Tick, WorldSeed};
use crate::geography::Geography;

pub use currents::OceanCurrent;
pub use season::Season;
pub use shock::ClimateShock;
pub use weather::{WeatherFront, WeatherKind};

/// Climate of one cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellClimate {
    /// Normalized temperature (0-1)
    pub temperature: f32,
    /// Normalized precipitation (0-1)
    pub precipitation: f32,
    /// Wind vector in cells per tick, x east, y south
    pub wind: (f32, f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateState {
    pub season: Season,
    pub cells: Vec<CellClimate>,
    pub ocean_currents: Vec<OceanCurrent>,
    /// Accumulated warming from industrial activity (0-1)
    pub global_warming: f32,
    pub fronts: Vec<WeatherFront>,
    pub shocks: Vec<ClimateShock>,
}

impl ClimateState {
    pub fn cell(&self, geography: &Geography, coord: CellCoord) -> Option<&CellClimate> {
        if geography.contains(coord) {
            self.cells.get(geography.index(coord))
        } else {
            None
        }
    }

    /// Add industrial emissions. Warming saturates at 1.
    pub fn register_emissions(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.global_warming = (self.global_warming + amount).min(1.0);
        }
    }

    /// Queue a shock; it starts shaping the field on the next advance
    pub fn apply_shock(&mut self, shock: ClimateShock) {
        self.shocks.push(shock);
    }

    pub fn mean_temperature(&self) -> f32 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.cells.iter().map(|c| c.temperature).sum::<f32>() / self.cells.len() as f32
    }

    pub fn mean_precipitation(&self) -> f32 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.cells.iter().map(|c| c.precipitation).sum::<f32>() / self.cells.len() as f32
    }
}

/// Result of one climate tick
#[derive(Debug, Clone)]
pub struct ClimateStep {
    pub state: ClimateState,
    /// Fronts that formed this tick
    pub new_fronts: Vec<WeatherFront>,
    /// Non-finite values that were reset to their previous value
    pub anomalies: u32,
}

pub struct ClimateEngine {
    config: ClimateConfig,
    rng: ChaCha8Rng,
}

impl ClimateEngine {
    pub fn new(config: ClimateConfig, seed: WorldSeed) -> Self {
        Self { config, rng: stream_rng(seed, Stream::Climate) }
    }

    /// Rebuild an engine around a saved random stream
    pub fn with_rng(config: ClimateConfig, rng: ChaCha8Rng) -> Self {
        Self { config, rng }
    }

    pub fn rng(&self) -> &ChaCha8Rng {
        &self.rng
    }

    pub fn config(&self) -> &ClimateConfig {
        &self.config
    }

    /// Climate at tick 0: base temperature and moisture, prevailing winds
    pub fn initial_state(&mut self, geography: &Geography) -> ClimateState {
        let cells = geography
            .cells()
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let lat = geography.latitude(geography.coord(i).y);
                CellClimate {
                    temperature: cell.base_temperature,
                    precipitation: cell.moisture,
                    wind: prevailing_wind(lat),
                }
            })
            .collect();

        ClimateState {
            season: Season::from_tick(0, self.config.years_per_cycle),
            cells,
            ocean_currents: OceanCurrent::spawn_all(geography, self.config.ocean_currents, &mut self.rng),
            global_warming: 0.0,
            fronts: Vec::new(),
            shocks: Vec::new(),
        }
    }

    /// Advance the climate by one tick. Never fails.
    pub fn advance(&mut self, state: &ClimateState, geography: &Geography, tick: Tick) -> ClimateStep {
        let cfg = &self.config;
        let season = Season::from_tick(tick, cfg.years_per_cycle);
        let width = geography.width();
        let tilt_scale = geography.planet().axial_tilt / 30.0;

        let mut currents = state.ocean_currents.clone();
        for current in &mut currents {
            current.drift(cfg.current_drift, &mut self.rng);
        }
        let current_anomaly = currents::anomaly_field(&currents, geography);

        let mut fronts: Vec<WeatherFront> = state.fronts.iter().filter(|f| f.remaining_ticks > 0).cloned().collect();
        let mut new_fronts = Vec::new();
        if self.rng.gen::<f32>() < cfg.weather_front_chance {
            let front = WeatherFront::spawn(geography, season, &mut self.rng);
            new_fronts.push(front.clone());
            fronts.push(front);
        }
        let shocks: Vec<ClimateShock> = state.shocks.iter().filter(|s| !s.is_spent()).cloned().collect();

        let prev = &state.cells;
        let warming = state.global_warming * cfg.warming_sensitivity;
        let mut cells = Vec::with_capacity(prev.len());
        let mut anomalies = 0;

        for (i, cell) in geography.cells().iter().enumerate() {
            let coord = geography.coord(i);
            let lat = geography.latitude(coord.y);
            let local_season = if lat < 0.0 { season } else { season.opposite() };
            let old = prev[i];

            // Wind: prevailing band plus thermal gradient, with a little noise
            let (band_x, band_y) = prevailing_wind(lat);
            let east = CellCoord::new((coord.x + 1) % width, coord.y);
            let west = CellCoord::new((coord.x + width - 1) % width, coord.y);
            let gradient = prev[geography.index(west)].temperature - prev[geography.index(east)].temperature;
            let wind = (
                band_x + gradient * 0.5 + self.rng.gen_range(-0.05..=0.05),
                band_y + self.rng.gen_range(-0.05..=0.05),
            );
            let upwind = upwind_of(geography, coord, wind);
            let up = prev[geography.index(upwind)];
            let up_cell = &geography.cells()[geography.index(upwind)];

            let mut front_t = 0.0;
            let mut front_p = 0.0;
            for front in &fronts {
                let w = front.influence(coord, width);
                front_t += front.kind.temperature_modifier() * w;
                front_p += front.kind.precipitation_modifier() * w;
            }
            for shock in &shocks {
                let w = shock.weight(coord, width);
                front_t += shock.temperature_delta * w;
                front_p += shock.precipitation_delta * w;
            }

            let seasonal_t = local_season.temperature_factor() * lat.abs() * tilt_scale;
            let target_t = cell.base_temperature + seasonal_t + warming + current_anomaly[i] + front_t;

            let seasonal_p = local_season.precipitation_factor() * lat.abs() * tilt_scale * 0.5;
            let evaporation = if up_cell.is_water { 0.1 * up.temperature } else { 0.0 };
            let rise = cell.elevation - up_cell.elevation;
            // Windward slopes rain out, lee slopes sit in a rain shadow
            let orographic = if rise > 0.0 { rise * 2.0 } else { rise };
            let target_p = cell.moisture + seasonal_p + evaporation + orographic + front_p;

            let neighbors = geography.neighbors(coord);
            let (mean_t, mean_p) = neighbor_means(&neighbors, geography, prev, old);

            let mut t = old.temperature + cfg.diffusion_rate * (mean_t - old.temperature);
            t += cfg.advection_rate * (up.temperature - old.temperature);
            t += 0.5 * (target_t - t);
            let mut p = old.precipitation + cfg.diffusion_rate * (mean_p - old.precipitation);
            p += cfg.advection_rate * (up.precipitation - old.precipitation);
            p += 0.5 * (target_p - p);

            let mut next = CellClimate {
                temperature: clamp_step(old.temperature, t, cfg.max_temperature_delta),
                precipitation: clamp_step(old.precipitation, p, cfg.max_precipitation_delta),
                wind,
            };
            if !next.temperature.is_finite() {
                next.temperature = old.temperature;
                anomalies += 1;
            }
            if !next.precipitation.is_finite() {
                next.precipitation = old.precipitation;
                anomalies += 1;
            }
            if !(next.wind.0.is_finite() && next.wind.1.is_finite()) {
                next.wind = old.wind;
                anomalies += 1;
            }
            cells.push(next);
        }

        for front in &mut fronts {
            front.remaining_ticks = front.remaining_ticks.saturating_sub(1);
        }
        fronts.retain(|f| f.remaining_ticks > 0);
        let mut shocks = shocks;
        for shock in &mut shocks {
            shock.remaining_ticks = shock.remaining_ticks.saturating_sub(1);
        }
        shocks.retain(|s| !s.is_spent());

        if anomalies > 0 {
            tracing::warn!(tick, anomalies, "Climate produced non-finite values; reset to previous tick");
        }

        ClimateStep {
            state: ClimateState {
                season,
                cells,
                ocean_currents: currents,
                global_warming: state.global_warming,
                fronts,
                shocks,
            },
            new_fronts,
            anomalies,
        }
    }
}

/// Trade winds near the equator, westerlies at mid latitudes, polar easterlies
fn prevailing_wind(lat: f32) -> (f32, f32) {
    let band = lat.abs();
    let x = if band < 0.33 {
        -1.0
    } else if band < 0.66 {
        1.0
    } else {
        -0.6
    };
    // Coriolis turns low-latitude flow toward the equator
    let y = if band < 0.33 { -lat * 0.6 } else { lat * 0.2 };
    (x * (0.5 + 0.5 * (1.0 - band)), y)
}

fn upwind_of(geography: &Geography, coord: CellCoord, wind: (f32, f32)) -> CellCoord {
    let width = geography.width() as i64;
    let step = |v: f32| -> i64 {
        if v > 0.25 {
            1
        } else if v < -0.25 {
            -1
        } else {
            0
        }
    };
    let x = (coord.x as i64 - step(wind.0)).rem_euclid(width);
    let y = (coord.y as i64 - step(wind.1)).clamp(0, geography.height() as i64 - 1);
    CellCoord::new(x as u32, y as u32)
}

fn neighbor_means(neighbors: &[CellCoord], geography: &Geography, prev: &[CellClimate], own: CellClimate) -> (f32, f32) {
    if neighbors.is_empty() {
        return (own.temperature, own.precipitation);
    }
    let (sum_t, sum_p) = neighbors.iter().fold((0.0, 0.0), |(t, p), n| {
        let c = prev[geography.index(*n)];
        (t + c.temperature, p + c.precipitation)
    });
    let n = neighbors.len() as f32;
    (sum_t / n, sum_p / n)
}

/// Move from `old` toward `new` by at most `max_delta`, staying in [0, 1]
fn clamp_step(old: f32, new: f32, max_delta: f32) -> f32 {
    if !new.is_finite() {
        return new;
    }
    (old + (new - old).clamp(-max_delta, max_delta)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GeographyConfig;
    use crate::geography::generate;

    fn setup() -> (Geography, ClimateEngine, ClimateState) {
        let geo = generate(21, 32, 24, &GeographyConfig::default()).unwrap();
        let mut engine = ClimateEngine::new(ClimateConfig::default(), 21);
        let state = engine.initial_state(&geo);
        (geo, engine, state)
    }

    #[test]
    fn test_deltas_are_bounded() {
        let (geo, mut engine, mut state) = setup();
        let cfg = engine.config().clone();
        for tick in 1..=20 {
            let step = engine.advance(&state, &geo, tick);
            for (old, new) in state.cells.iter().zip(&step.state.cells) {
                assert!((new.temperature - old.temperature).abs() <= cfg.max_temperature_delta + 1e-6);
                assert!((new.precipitation - old.precipitation).abs() <= cfg.max_precipitation_delta + 1e-6);
                assert!((0.0..=1.0).contains(&new.temperature));
                assert!((0.0..=1.0).contains(&new.precipitation));
            }
            state = step.state;
        }
    }

    #[test]
    fn test_same_seed_same_climate() {
        let (geo, mut a, state_a) = setup();
        let mut b = ClimateEngine::new(ClimateConfig::default(), 21);
        let state_b = b.initial_state(&geo);
        assert_eq!(state_a, state_b);
        let step_a = a.advance(&state_a, &geo, 1);
        let step_b = b.advance(&state_b, &geo, 1);
        assert_eq!(step_a.state, step_b.state);
    }

    #[test]
    fn test_season_follows_tick() {
        let (geo, mut engine, state) = setup();
        let step = engine.advance(&state, &geo, 1);
        assert_eq!(step.state.season, Season::Summer);
    }

    #[test]
    fn test_global_cooling_shock_lowers_temperature() {
        let (geo, mut engine, mut state) = setup();
        let mut control = ClimateEngine::new(ClimateConfig::default(), 21);
        let _ = control.initial_state(&geo);

        let mut shocked = state.clone();
        shocked.apply_shock(ClimateShock::global("meteorite", -0.3, 0.0, 5));

        for tick in 1..=3 {
            state = control.advance(&state, &geo, tick).state;
            shocked = engine.advance(&shocked, &geo, tick).state;
        }
        assert!(shocked.mean_temperature() < state.mean_temperature());
    }

    #[test]
    fn test_shocks_expire() {
        let (geo, mut engine, mut state) = setup();
        state.apply_shock(ClimateShock::global("solar flare", 0.15, 0.0, 2));
        for tick in 1..=3 {
            state = engine.advance(&state, &geo, tick).state;
        }
        assert!(state.shocks.is_empty());
    }

    #[test]
    fn test_warming_saturates() {
        let (_, _, mut state) = setup();
        for _ in 0..10 {
            state.register_emissions(0.3);
        }
        assert_eq!(state.global_warming, 1.0);
        state.register_emissions(f32::NAN);
        assert_eq!(state.global_warming, 1.0);
    }

    #[test]
    fn test_clamp_step() {
        assert!((clamp_step(0.5, 0.9, 0.05) - 0.55).abs() < 1e-6);
        assert_eq!(clamp_step(0.02, -1.0, 0.05), 0.0);
    }
}
