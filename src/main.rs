//! Walkabout - Entry Point
//!
//! `walkabout run` simulates a scenario once and prints the trajectories;
//! `walkabout stats` repeats it many times and tabulates path statistics.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use walkabout::core::error::Result;
use walkabout::core::types::SimRng;
use walkabout::scenario::{load_scenario, Scenario, StatisticsSpec};
use walkabout::simulation::{run_batch, BatchPlan, RunOutput};

/// Runs per step count when the scenario has no [statistics] table
const DEFAULT_RUNS: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "walkabout")]
#[command(about = "Random walkers among portals, obstacles, traps, slow zones and black holes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scenario once
    Run {
        /// Scenario file (.toml or .json)
        scenario: PathBuf,

        /// Random seed; overrides the scenario's seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pace the run frame by frame (honours the scenario's slow_motion)
        #[arg(long)]
        animate: bool,
    },
    /// Batch statistics over the scenario's step counts
    Stats {
        /// Scenario file (.toml or .json)
        scenario: PathBuf,

        /// Master seed; overrides the scenario's seed
        #[arg(long)]
        seed: Option<u64>,

        /// Write the table as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the table as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Text,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("walkabout=info")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run {
            scenario,
            seed,
            format,
            output,
            animate,
        } => run(&scenario, seed, format, output.as_deref(), animate),
        Command::Stats {
            scenario,
            seed,
            csv,
            json,
        } => stats(&scenario, seed, csv.as_deref(), json.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(
    path: &Path,
    seed: Option<u64>,
    format: Format,
    output: Option<&Path>,
    animate: bool,
) -> Result<()> {
    let scenario = load_scenario(path)?;
    let seed = scenario.resolve_seed(seed);
    tracing::info!("Running {} with seed {}", path.display(), seed);

    let text = match scenario.dimensions {
        2 => run_in::<2>(&scenario, seed, format, animate)?,
        _ => run_in::<3>(&scenario, seed, format, animate)?,
    };

    match output {
        Some(file) => std::fs::write(file, text)?,
        None => println!("{}", text),
    }
    Ok(())
}

fn run_in<const D: usize>(
    scenario: &Scenario,
    seed: u64,
    format: Format,
    animate: bool,
) -> Result<String> {
    let start = Instant::now();
    let mut sim = scenario.build::<D>(SimRng::seed_from_u64(seed))?;

    let trajectories = if animate {
        let slow_motion = scenario.slow_motion;
        sim.run_with(scenario.num_steps, |s| {
            for walker in s.walkers() {
                tracing::debug!("Walker {:?} at {:?}", walker.id(), walker.position().coords());
            }
            std::thread::sleep(s.pacing(slow_motion));
        })
    } else {
        sim.run(scenario.num_steps)
    };

    let output = RunOutput::new(
        &sim,
        trajectories,
        scenario.num_steps,
        Some(seed),
        start.elapsed(),
    );
    match format {
        Format::Json => output.to_json(),
        Format::Text => Ok(output.summary()),
    }
}

fn stats(path: &Path, seed: Option<u64>, csv: Option<&Path>, json: Option<&Path>) -> Result<()> {
    let scenario = load_scenario(path)?;
    let seed = scenario.resolve_seed(seed);
    tracing::info!("Batch statistics for {} with seed {}", path.display(), seed);

    let spec = scenario.statistics.clone().unwrap_or_else(|| {
        tracing::info!(
            "No [statistics] table, using {} runs of {} steps",
            DEFAULT_RUNS,
            scenario.num_steps
        );
        StatisticsSpec {
            num_runs: DEFAULT_RUNS,
            step_counts: vec![scenario.num_steps],
        }
    });
    let plan = BatchPlan::new(spec.step_counts, spec.num_runs, seed);

    let table = match scenario.dimensions {
        2 => run_batch::<2, _>(&plan, |rng| scenario.build::<2>(rng))?,
        _ => run_batch::<3, _>(&plan, |rng| scenario.build::<3>(rng))?,
    };

    if let Some(file) = csv {
        table.write_csv(file)?;
        tracing::info!("Wrote {}", file.display());
    }
    if let Some(file) = json {
        table.write_json(file)?;
        tracing::info!("Wrote {}", file.display());
    }
    if csv.is_none() && json.is_none() {
        print!("{}", table.to_csv());
    }
    Ok(())
}
