//! Procedural surface generation
//!
//! Elevation and moisture come from fractal Perlin noise sampled on a
//! cylinder so the map wraps east-west without a seam.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use ordered_float::OrderedFloat;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::GeographyConfig;
use crate::core::error::{Result, SimError};
use crate::core::rng::{stream_rng, Stream};
use crate::core::types::{CellCoord, WorldSeed};
use crate::geography::biome::{classify, BiomeInputs};
use crate::geography::{Cell, Geography, PlanetTraits};

const NAME_PREFIXES: &[&str] = &["Xen", "Zor", "Kep", "Ald", "Vor", "Nyx", "Tal", "Ery", "Qua", "Oph"];
const NAME_MIDDLES: &[&str] = &["a", "o", "i", "ae", "u", "e"];
const NAME_SUFFIXES: &[&str] = &["thia", "lon", "ris", "tos", "nara", "vex", "dor", "mira"];

/// Generate a planet surface. Fails only on a zero dimension.
pub fn generate(seed: WorldSeed, width: u32, height: u32, config: &GeographyConfig) -> Result<Geography> {
    generate_named(seed, width, height, config, None)
}

/// Like `generate`, with an optional fixed planet name
pub fn generate_named(
    seed: WorldSeed,
    width: u32,
    height: u32,
    config: &GeographyConfig,
    name: Option<&str>,
) -> Result<Geography> {
    if width == 0 || height == 0 {
        return Err(SimError::Configuration(format!(
            "geography dimensions must be positive, got {width}x{height}"
        )));
    }

    let mut rng = stream_rng(seed, Stream::Geography);
    let planet = roll_planet(config, &mut rng);
    let name = match name {
        Some(n) => n.to_string(),
        None => planet_name(&mut rng),
    };

    let elevation_seed: u32 = rng.gen();
    let moisture_seed: u32 = rng.gen();

    let elevation = normalize(noise_field(elevation_seed, width, height, config));
    let sea_level = sea_level_for(&elevation, planet.land_fraction);
    let mountain_level = config.mountain_level.max(sea_level + 0.05);
    let is_water: Vec<bool> = elevation.iter().map(|&e| e <= sea_level).collect();

    let distance = water_distance(&is_water, width, height, config.moisture_radius);
    let raw_moisture = normalize(noise_field(moisture_seed, width, height, config));
    let radius = config.moisture_radius.max(1) as f32;

    let mut cells = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        let lat = 2.0 * (y as f32 + 0.5) / height as f32 - 1.0;
        for x in 0..width {
            let i = (y * width + x) as usize;
            let proximity = distance[i].map(|d| 1.0 - (d as f32 / radius).min(1.0)).unwrap_or(0.0);
            let moisture = (raw_moisture[i] * 0.6 + proximity * 0.4).clamp(0.0, 1.0);

            let altitude = if is_water[i] {
                0.0
            } else {
                (elevation[i] - sea_level) / (1.0 - sea_level).max(1e-6)
            };
            let base_temperature = (1.0 - lat * lat - config.altitude_cooling * altitude).clamp(0.0, 1.0);

            let inputs = BiomeInputs {
                elevation: elevation[i],
                moisture,
                temperature: base_temperature,
                sea_level,
                mountain_level,
            };
            let volcanic = elevation[i] >= mountain_level
                && base_temperature >= 0.2
                && rng.gen::<f32>() < 0.05 * planet.tectonic_activity;
            let biome = classify(inputs, volcanic);

            cells.push(Cell {
                elevation: elevation[i],
                is_water: is_water[i],
                biome,
                moisture,
                base_temperature,
            });
        }
    }

    tracing::info!(
        planet = %name,
        width,
        height,
        sea_level,
        land_fraction = planet.land_fraction,
        axial_tilt = planet.axial_tilt,
        "Generated geography"
    );

    Ok(Geography::from_parts(name, width, height, sea_level, planet, cells))
}

fn roll_planet(config: &GeographyConfig, rng: &mut ChaCha8Rng) -> PlanetTraits {
    let land_fraction = config.land_fraction.unwrap_or_else(|| rng.gen_range(0.25..0.75));
    let axial_tilt = if rng.gen::<f32>() < 0.1 { 0.0 } else { rng.gen_range(10.0..30.0) };
    PlanetTraits {
        axial_tilt,
        land_fraction,
        tectonic_activity: rng.gen_range(0.1..1.0),
        year_length_days: rng.gen_range(200..=500),
    }
}

fn planet_name(rng: &mut ChaCha8Rng) -> String {
    let prefix = NAME_PREFIXES[rng.gen_range(0..NAME_PREFIXES.len())];
    let middle = NAME_MIDDLES[rng.gen_range(0..NAME_MIDDLES.len())];
    let suffix = NAME_SUFFIXES[rng.gen_range(0..NAME_SUFFIXES.len())];
    format!("{prefix}{middle}{suffix}")
}

/// Sample fractal noise on a cylinder wrapped around the x axis
fn noise_field(seed: u32, width: u32, height: u32, config: &GeographyConfig) -> Vec<f32> {
    let fbm = Fbm::<Perlin>::new(seed)
        .set_octaves(config.noise_octaves)
        .set_frequency(1.0)
        .set_lacunarity(2.0)
        .set_persistence(0.5);

    let circumference = config.noise_frequency;
    let radius = circumference / TAU;
    let rows = circumference * height as f64 / width as f64;

    let mut values = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        let v = y as f64 / height as f64 * rows;
        for x in 0..width {
            let angle = x as f64 / width as f64 * TAU;
            let point = [radius * angle.cos(), radius * angle.sin(), v];
            values.push(fbm.get(point) as f32);
        }
    }
    values
}

fn normalize(values: Vec<f32>) -> Vec<f32> {
    let min = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let span = max - min;
    if !span.is_finite() || span <= f32::EPSILON {
        return vec![0.5; values.len()];
    }
    values.into_iter().map(|v| (v - min) / span).collect()
}

/// Elevation quantile that leaves `land_fraction` of cells above water
fn sea_level_for(elevation: &[f32], land_fraction: f32) -> f32 {
    let mut sorted = elevation.to_vec();
    sorted.sort_by_key(|&e| OrderedFloat(e));
    let n = sorted.len();
    let index = (((1.0 - land_fraction) * n as f32) as usize).min(n - 1);
    sorted[index]
}

/// Multi-source BFS distance (in cells) to the nearest water, up to `limit`
fn water_distance(is_water: &[bool], width: u32, height: u32, limit: u32) -> Vec<Option<u32>> {
    let mut distance = vec![None; is_water.len()];
    let mut queue = VecDeque::new();
    for (i, &water) in is_water.iter().enumerate() {
        if water {
            distance[i] = Some(0);
            queue.push_back(i);
        }
    }

    while let Some(i) = queue.pop_front() {
        let d = distance[i].unwrap_or(0);
        if d >= limit {
            continue;
        }
        let here = CellCoord::new(i as u32 % width, i as u32 / width);
        for dy in -1i64..=1 {
            let ny = here.y as i64 + dy;
            if ny < 0 || ny >= height as i64 {
                continue;
            }
            for dx in -1i64..=1 {
                let nx = (here.x as i64 + dx).rem_euclid(width as i64);
                let j = (ny as u32 * width + nx as u32) as usize;
                if distance[j].is_none() {
                    distance[j] = Some(d + 1);
                    queue.push_back(j);
                }
            }
        }
    }
    distance
}
