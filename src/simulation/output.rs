//! Run output and serialization

use std::fmt::Write as _;
use std::time::Duration;

use serde::Serialize;

use crate::core::error::Result;
use crate::simulation::driver::{OutcomeCounts, Simulation, Trajectory};
use crate::simulation::stats::{PathStats, StatsRow};
use crate::world::features::FeatureLayout;

/// Complete result of a single run
#[derive(Clone, Debug, Serialize)]
pub struct RunOutput<const D: usize> {
    pub dimensions: usize,
    pub seed: Option<u64>,
    pub features: Vec<FeatureLayout<D>>,
    pub trajectories: Vec<Trajectory<D>>,
    pub statistics: RunStats,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunStats {
    pub num_walkers: usize,
    pub num_steps: usize,
    pub simulation_time_ms: u64,
    pub outcomes: OutcomeCounts,
    /// Averages over this run's trajectories; absent for an empty run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<StatsRow>,
}

impl<const D: usize> RunOutput<D> {
    pub fn new(
        sim: &Simulation<D>,
        trajectories: Vec<Trajectory<D>>,
        num_steps: usize,
        seed: Option<u64>,
        elapsed: Duration,
    ) -> Self {
        let path_stats: Vec<PathStats> = trajectories
            .iter()
            .filter_map(|t| PathStats::of(&t.points))
            .collect();

        Self {
            dimensions: D,
            seed,
            features: sim.features().layout(),
            statistics: RunStats {
                num_walkers: trajectories.len(),
                num_steps,
                simulation_time_ms: elapsed.as_millis() as u64,
                outcomes: sim.outcomes(),
                paths: StatsRow::from_paths(num_steps, &path_stats),
            },
            trajectories,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    pub fn summary(&self) -> String {
        let s = &self.statistics;
        let mut out = format!(
            "Simulated {} walkers for {} steps in {}ms ({}D, {} features)\n",
            s.num_walkers,
            s.num_steps,
            s.simulation_time_ms,
            self.dimensions,
            self.features.len(),
        );
        let _ = writeln!(
            out,
            "{} teleports, {} blocked, {} captured, {} confined, {} pulled",
            s.outcomes.teleported,
            s.outcomes.blocked,
            s.outcomes.captured,
            s.outcomes.confined,
            s.outcomes.pulled,
        );
        for t in &self.trajectories {
            if let Some(end) = t.final_position() {
                let _ = writeln!(
                    out,
                    "  walker {} ({:?}): ends at {:?}, {:.3} from origin",
                    t.agent.0,
                    t.movement,
                    end.coords(),
                    end.norm(),
                );
            }
        }
        out
    }
}
