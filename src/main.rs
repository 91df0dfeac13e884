//! Ecosphere - Entry Point
//!
//! Builds a configuration from a TOML file and command-line overrides,
//! creates or restores a world and runs it in real time until the year
//! limit or Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::runtime::Runtime;

use ecosphere::core::config::SimulationConfig;
use ecosphere::core::error::Result;
use ecosphere::kernel::{self, ChannelSink, EventSink, KernelControl, SavedWorld, Simulation, TracingSink};

/// Ecosphere - watch an alien world evolve
#[derive(Parser, Debug)]
#[command(name = "ecosphere")]
#[command(about = "Run a self-contained alien world simulation")]
struct Args {
    /// TOML configuration file; missing keys take defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// World seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Map width in cells
    #[arg(long)]
    width: Option<u32>,

    /// Map height in cells
    #[arg(long)]
    height: Option<u32>,

    /// Simulated years per real second
    #[arg(long)]
    speed: Option<f32>,

    /// Stop after this many years
    #[arg(long)]
    max_years: Option<u64>,

    /// Run as fast as possible, without the real-time cadence
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// Continue a saved world instead of generating a new one
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Save the world here when the run ends
    #[arg(long)]
    save: Option<PathBuf>,

    /// Write the run summary here as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

impl Args {
    fn build_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_file(path)?,
            None => SimulationConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.world.seed = seed;
        }
        if let Some(width) = self.width {
            config.world.width = width;
        }
        if let Some(height) = self.height {
            config.world.height = height;
        }
        if let Some(speed) = self.speed {
            config.kernel.ticks_per_second = speed;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ecosphere=info")),
        )
        .init();

    let args = Args::parse();
    let rt = Runtime::new()?;
    rt.block_on(run(args))
}

async fn run(args: Args) -> Result<()> {
    let sim = match &args.resume {
        Some(path) => {
            tracing::info!(path = %path.display(), "Resuming saved world");
            Simulation::restore(SavedWorld::load_from(path)?)?
        }
        None => Simulation::initialize(args.build_config()?)?,
    };

    // History goes through a channel to a logger task
    let (sink, mut events) = ChannelSink::new();
    let logger = tokio::spawn(async move {
        let mut out = TracingSink;
        while let Some(event) = events.recv().await {
            out.record(&event);
        }
    });
    let mut sim = sim.with_event_sink(sink);

    let control = Arc::new(if args.headless {
        KernelControl::headless()
    } else {
        KernelControl::new(sim.config().kernel.ticks_per_second)
    });
    let interrupt = Arc::clone(&control);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping at the next year boundary");
            interrupt.request_stop();
        }
    });

    println!("\n=== ECOSPHERE ===");
    println!(
        "Planet {} ({}x{}), seed {}",
        sim.geography().name(),
        sim.geography().width(),
        sim.geography().height(),
        sim.config().world.seed
    );
    println!();

    let outcome = kernel::run(&mut sim, &control, args.max_years).await;

    // Closing the sink lets the logger drain and finish
    sim.set_event_sink(Box::new(TracingSink));
    if logger.await.is_err() {
        tracing::warn!("Event logger task failed");
    }

    let summary = outcome?;
    if let Some(snapshot) = sim.latest_snapshot() {
        println!("{}", snapshot.summary());
    }
    println!(
        "Ran {} years in {}ms ({:?}), {} events recorded",
        summary.ticks_run, summary.elapsed_ms, summary.reason, summary.events_logged
    );

    if let Some(path) = &args.save {
        sim.save().save_to(path)?;
        println!("World saved to {}", path.display());
    }
    if let Some(path) = &args.summary_json {
        std::fs::write(path, summary.to_json()?)?;
        println!("Summary written to {}", path.display());
    }
    Ok(())
}
