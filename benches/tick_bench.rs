use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use ecosphere::core::config::{GeographyConfig, SimulationConfig};
use ecosphere::geography::generate;
use ecosphere::kernel::Simulation;

fn config(width: u32, height: u32) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.world.seed = 0xEC05;
    config.world.width = width;
    config.world.height = height;
    config
}

fn bench_kernel_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel_step");
    group.sample_size(30);
    for (width, height) in [(64, 48), (128, 96)] {
        group.bench_function(format!("{width}x{height}_10_years"), |b| {
            b.iter_batched(
                || Simulation::initialize(config(width, height)).expect("valid config"),
                |mut sim| {
                    for _ in 0..10 {
                        sim.step().expect("consistent tick");
                    }
                    sim
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_generation(c: &mut Criterion) {
    let geo = GeographyConfig::default();
    c.bench_function("generate_128x96", |b| b.iter(|| generate(7, 128, 96, &geo).expect("valid size")));
}

criterion_group!(benches, bench_kernel_step, bench_generation);
criterion_main!(benches);
