//! Running walkers through a world, singly or in batches

pub mod batch;
pub mod driver;
pub mod output;
pub mod stats;

pub use batch::{run_batch, BatchPlan};
pub use driver::{OutcomeCounts, Simulation, Trajectory};
pub use output::{RunOutput, RunStats};
pub use stats::{PathStats, StatsRow, StatsTable};
