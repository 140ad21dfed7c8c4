//! Batch statistics over many independent runs
//!
//! Every (step count, run) pair gets its own simulation and generator. Seeds
//! are drawn up front from the master seed, so the table does not depend on
//! how rayon schedules the runs.

use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::core::error::{Result, WalkError};
use crate::core::types::SimRng;
use crate::simulation::driver::Simulation;
use crate::simulation::stats::{PathStats, StatsRow, StatsTable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    /// Rows of the resulting table
    pub step_counts: Vec<usize>,
    /// Independent simulations per step count
    pub num_runs: usize,
    pub seed: u64,
}

impl BatchPlan {
    pub fn new(step_counts: Vec<usize>, num_runs: usize, seed: u64) -> Self {
        Self {
            step_counts,
            num_runs,
            seed,
        }
    }

    /// (step count, run seed) for every run, in table order
    fn jobs(&self) -> Vec<(usize, u64)> {
        let mut seeder = SimRng::seed_from_u64(self.seed);
        self.step_counts
            .iter()
            .flat_map(|&steps| std::iter::repeat(steps).take(self.num_runs))
            .map(|steps| (steps, seeder.gen()))
            .collect()
    }
}

/// Run every job in `plan` in parallel and average the paths per step count
///
/// `build` creates a fresh simulation, walkers included, from a run's
/// generator. Every walker of every run contributes one path.
pub fn run_batch<const D: usize, F>(plan: &BatchPlan, build: F) -> Result<StatsTable>
where
    F: Fn(SimRng) -> Result<Simulation<D>> + Sync,
{
    if plan.num_runs == 0 || plan.step_counts.is_empty() {
        return Err(WalkError::InvalidConfiguration(
            "a batch needs at least one run and one step count".to_string(),
        ));
    }

    let jobs = plan.jobs();
    tracing::info!(
        "Running {} simulations over {} step counts",
        jobs.len(),
        plan.step_counts.len()
    );

    let results: Vec<(usize, Vec<PathStats>)> = jobs
        .par_iter()
        .map(|&(steps, seed)| -> Result<(usize, Vec<PathStats>)> {
            let mut sim = build(SimRng::seed_from_u64(seed))?;
            let stats = sim
                .run(steps)
                .iter()
                .filter_map(|t| PathStats::of(&t.points))
                .collect();
            Ok((steps, stats))
        })
        .collect::<Result<_>>()?;

    let mut table = StatsTable::new();
    for &steps in &plan.step_counts {
        let paths: Vec<PathStats> = results
            .iter()
            .filter(|(s, _)| *s == steps)
            .flat_map(|(_, stats)| stats.iter().copied())
            .collect();
        if let Some(row) = StatsRow::from_paths(steps, &paths) {
            table.insert(row);
        }
    }

    tracing::info!("Batch finished: {} rows", table.len());
    Ok(table)
}
