//! Headless runner for the organism world.

mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use teoc_core::{SimulationConfig, WrapMode};
use teoc_world::{Simulation, WorldSnapshot};
use tracing::info;

#[derive(Parser)]
#[command(name = "teoc")]
#[command(author, version, about = "Evolving organisms on a toroidal grid", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation headless and print a summary
    Run {
        /// JSON config file (defaults are used when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// RNG seed (wall clock when neither flag nor config sets one)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Number of ticks to run
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Grid width
        #[arg(long)]
        width: Option<u32>,

        /// Grid height
        #[arg(long)]
        height: Option<u32>,

        /// Initial number of organisms (without a config file, resizing the
        /// grid defaults this to a quarter of the cells)
        #[arg(short, long)]
        population: Option<usize>,

        /// Use single-step modular wrapping for genome and grid offsets
        #[arg(long)]
        legacy_wrap: bool,

        /// Continue from a bincode snapshot
        #[arg(long)]
        resume: Option<PathBuf>,

        /// Write the final world here (`.json` for JSON, bincode otherwise)
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Print the default configuration as JSON
    DumpDefaultConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_telemetry(cli.json_logs)?;

    match cli.command {
        Commands::Run {
            config,
            seed,
            ticks,
            width,
            height,
            population,
            legacy_wrap,
            resume,
            snapshot,
        } => {
            let from_file = config.is_some();
            let mut config = match config {
                Some(path) => SimulationConfig::from_json_file(&path)
                    .with_context(|| format!("failed to load config from {}", path.display()))?,
                None => SimulationConfig::default(),
            };
            Overrides {
                seed,
                ticks,
                width,
                height,
                population,
                legacy_wrap,
            }
            .apply(&mut config, from_file);

            run(config, resume.as_deref(), snapshot.as_deref())
        }
        Commands::DumpDefaultConfig => {
            let json = serde_json::to_string_pretty(&SimulationConfig::default())?;
            println!("{}", json);
            Ok(())
        }
    }
}

/// Command-line values layered over the loaded config
struct Overrides {
    seed: Option<u64>,
    ticks: Option<u64>,
    width: Option<u32>,
    height: Option<u32>,
    population: Option<usize>,
    legacy_wrap: bool,
}

impl Overrides {
    fn apply(self, config: &mut SimulationConfig, from_file: bool) {
        if let Some(width) = self.width {
            config.world.width = width;
        }
        if let Some(height) = self.height {
            config.world.height = height;
        }
        let resized = self.width.is_some() || self.height.is_some();
        if let Some(population) = self.population {
            config.initial_population = population;
        } else if resized && !from_file {
            config.initial_population = config.world.cell_count() / 4;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(ticks) = self.ticks {
            config.num_ticks = ticks;
        }
        if self.legacy_wrap {
            config.wrap_mode = WrapMode::Legacy;
        }
    }
}

fn run(config: SimulationConfig, resume: Option<&Path>, snapshot: Option<&Path>) -> Result<()> {
    let mut sim = match resume {
        Some(path) => {
            let saved = WorldSnapshot::load(path)
                .with_context(|| format!("failed to read snapshot {}", path.display()))?;
            Simulation::restore(config, saved).context("failed to restore simulation")?
        }
        None => Simulation::new(config).context("failed to create simulation")?,
    };

    let result = sim.run().context("simulation failed")?;
    sim.check_invariants()
        .context("world is inconsistent after the run")?;

    if let Some(path) = snapshot {
        write_snapshot(&sim.snapshot(), path)?;
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn write_snapshot(snapshot: &WorldSnapshot, path: &Path) -> Result<()> {
    let is_json = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        std::fs::write(path, snapshot.to_json()?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "JSON snapshot written");
    } else {
        snapshot
            .save(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}
