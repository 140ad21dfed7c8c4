//! Scenario schema types for TOML / JSON deserialization
//!
//! A scenario describes one world: how many walkers of which type, how long
//! they walk, and which features they meet. Portals and obstacles may be
//! given as a count (placed at random) or as a list; a list entry may leave
//! out any field, which is then drawn at random too.

use serde::{Deserialize, Serialize};

use crate::core::config::MotionParams;
use crate::core::error::{Result, WalkError};
use crate::core::types::{Point, SimRng};
use crate::simulation::driver::Simulation;
use crate::walker::movement::MovementType;
use crate::world::features::{Blocker, FeatureSet, Teleporter};
use crate::world::generation::SpawnBounds;
use crate::world::resolve::SlowZonePolicy;

pub const MAX_STEPS: usize = 1000;
pub const MAX_WALKERS: usize = 50;
pub const MAX_FEATURES: usize = 5;
pub const MAX_RUNS: usize = 50;

fn default_num_steps() -> usize {
    100
}

fn default_num_walkers() -> usize {
    1
}

/// Complete scenario definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// 2 or 3
    pub dimensions: usize,
    /// Movement type code, 1-6
    pub walker_type: i64,
    #[serde(default = "default_num_steps")]
    pub num_steps: usize,
    #[serde(default = "default_num_walkers")]
    pub num_walkers: usize,
    /// Walkers occasionally jump back to the origin
    #[serde(default)]
    pub restart: bool,
    /// Occasional long pauses when animating
    #[serde(default)]
    pub slow_motion: bool,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub slow_zone_policy: SlowZonePolicy,
    #[serde(default)]
    pub portals: FeatureSpec<PortalSpec>,
    #[serde(default)]
    pub obstacles: FeatureSpec<ObstacleSpec>,
    #[serde(default)]
    pub traps: usize,
    #[serde(default)]
    pub slow_zones: usize,
    /// Three-dimensional scenarios only
    #[serde(default)]
    pub black_holes: usize,
    #[serde(default)]
    pub statistics: Option<StatisticsSpec>,
}

/// Either "this many, placed at random" or an explicit list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureSpec<T> {
    Count(usize),
    Explicit(Vec<T>),
}

impl<T> Default for FeatureSpec<T> {
    fn default() -> Self {
        FeatureSpec::Count(0)
    }
}

impl<T> FeatureSpec<T> {
    pub fn len(&self) -> usize {
        match self {
            FeatureSpec::Count(n) => *n,
            FeatureSpec::Explicit(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn explicit(&self) -> &[T] {
        match self {
            FeatureSpec::Count(_) => &[],
            FeatureSpec::Explicit(list) => list,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortalSpec {
    pub center: Option<Vec<f64>>,
    /// Side length of the portal cube
    pub length: Option<f64>,
    pub exit: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObstacleSpec {
    pub center: Option<Vec<f64>>,
    pub length: Option<f64>,
}

/// Batch statistics settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatisticsSpec {
    pub num_runs: usize,
    pub step_counts: Vec<usize>,
}

fn invalid<T>(msg: String) -> Result<T> {
    Err(WalkError::InvalidConfiguration(msg))
}

fn check_range(name: &str, value: usize, min: usize, max: usize) -> Result<()> {
    if value < min || value > max {
        return invalid(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        ));
    }
    Ok(())
}

fn check_coords(name: &str, coords: &Option<Vec<f64>>, dimensions: usize) -> Result<()> {
    if let Some(coords) = coords {
        if coords.len() != dimensions {
            return invalid(format!(
                "{} needs {} coordinates, got {}",
                name,
                dimensions,
                coords.len()
            ));
        }
        if coords.iter().any(|c| !c.is_finite()) {
            return invalid(format!("{} has a non-finite coordinate", name));
        }
    }
    Ok(())
}

fn check_length(name: &str, length: Option<f64>) -> Result<()> {
    match length {
        Some(l) if !(l.is_finite() && l > 0.0) => {
            invalid(format!("{} length must be positive, got {}", name, l))
        }
        _ => Ok(()),
    }
}

/// Explicit coordinates, or a random point
fn point_or_random<const D: usize>(
    coords: &Option<Vec<f64>>,
    bounds: &SpawnBounds,
    rng: &mut SimRng,
) -> Result<Point<D>> {
    match coords {
        Some(values) => Point::try_from(values.as_slice()).map_err(|len| {
            WalkError::InvalidConfiguration(format!(
                "expected {} coordinates, got {}",
                D, len
            ))
        }),
        None => Ok(bounds.point(rng)),
    }
}

impl Scenario {
    /// Minimal scenario: one walker, 100 steps, no features
    pub fn new(dimensions: usize, walker_type: i64) -> Self {
        Self {
            dimensions,
            walker_type,
            num_steps: default_num_steps(),
            num_walkers: default_num_walkers(),
            restart: false,
            slow_motion: false,
            seed: None,
            slow_zone_policy: SlowZonePolicy::default(),
            portals: FeatureSpec::default(),
            obstacles: FeatureSpec::default(),
            traps: 0,
            slow_zones: 0,
            black_holes: 0,
            statistics: None,
        }
    }

    pub fn movement(&self) -> Result<MovementType> {
        MovementType::try_from(self.walker_type)
    }

    /// Check every field against its allowed range
    pub fn validate(&self) -> Result<()> {
        if self.dimensions != 2 && self.dimensions != 3 {
            return invalid(format!("dimensions must be 2 or 3, got {}", self.dimensions));
        }
        self.movement()?;
        check_range("num_steps", self.num_steps, 1, MAX_STEPS)?;
        check_range("num_walkers", self.num_walkers, 1, MAX_WALKERS)?;
        check_range("portals", self.portals.len(), 0, MAX_FEATURES)?;
        check_range("obstacles", self.obstacles.len(), 0, MAX_FEATURES)?;
        check_range("traps", self.traps, 0, MAX_FEATURES)?;
        check_range("slow_zones", self.slow_zones, 0, MAX_FEATURES)?;
        check_range("black_holes", self.black_holes, 0, MAX_FEATURES)?;
        if self.black_holes > 0 && self.dimensions != 3 {
            return invalid("black holes are only available in 3D scenarios".to_string());
        }

        for portal in self.portals.explicit() {
            check_coords("portal center", &portal.center, self.dimensions)?;
            check_coords("portal exit", &portal.exit, self.dimensions)?;
            check_length("portal", portal.length)?;
        }
        for obstacle in self.obstacles.explicit() {
            check_coords("obstacle center", &obstacle.center, self.dimensions)?;
            check_length("obstacle", obstacle.length)?;
        }

        if let Some(stats) = &self.statistics {
            check_range("statistics.num_runs", stats.num_runs, 1, MAX_RUNS)?;
            if stats.step_counts.is_empty() {
                return invalid("statistics.step_counts must not be empty".to_string());
            }
            for &steps in &stats.step_counts {
                check_range("statistics.step_counts entry", steps, 1, MAX_STEPS)?;
            }
        }
        Ok(())
    }

    /// Seed to run with: the override if given, else the scenario's, else a fresh one
    pub fn resolve_seed(&self, override_seed: Option<u64>) -> u64 {
        override_seed
            .or(self.seed)
            .unwrap_or_else(rand::random)
    }

    /// Features described by the scenario, random ones drawn from `rng`
    pub fn features<const D: usize>(&self, rng: &mut SimRng) -> Result<FeatureSet<D>> {
        let bounds = SpawnBounds::for_dimension(D);
        let mut features = FeatureSet::new();

        match &self.portals {
            FeatureSpec::Count(n) => {
                for _ in 0..*n {
                    features.insert(bounds.teleporter::<D, _>(rng)?);
                }
            }
            FeatureSpec::Explicit(list) => {
                for spec in list {
                    let center = point_or_random::<D>(&spec.center, &bounds, rng)?;
                    let length = match spec.length {
                        Some(l) => l,
                        None => bounds.size(rng),
                    };
                    let exit = point_or_random::<D>(&spec.exit, &bounds, rng)?;
                    features.insert(Teleporter::new(center, length, exit)?);
                }
            }
        }

        match &self.obstacles {
            FeatureSpec::Count(n) => {
                for _ in 0..*n {
                    features.insert(bounds.blocker::<D, _>(rng)?);
                }
            }
            FeatureSpec::Explicit(list) => {
                for spec in list {
                    let center = point_or_random::<D>(&spec.center, &bounds, rng)?;
                    let length = match spec.length {
                        Some(l) => l,
                        None => bounds.size(rng),
                    };
                    features.insert(Blocker::new(center, length)?);
                }
            }
        }

        for _ in 0..self.traps {
            features.insert(bounds.capture_zone::<D, _>(rng)?);
        }
        for _ in 0..self.slow_zones {
            features.insert(bounds.slow_zone::<D, _>(rng)?);
        }
        for _ in 0..self.black_holes {
            features.insert(bounds.sink::<D, _>(rng)?);
        }
        Ok(features)
    }

    /// Validate, then build a ready-to-run simulation
    ///
    /// `rng` places the random features first and then drives the run.
    pub fn build<const D: usize>(&self, mut rng: SimRng) -> Result<Simulation<D>> {
        if D != self.dimensions {
            return invalid(format!(
                "scenario is {}-dimensional, cannot build a {}-dimensional simulation",
                self.dimensions, D
            ));
        }
        self.validate()?;
        let movement = self.movement()?;
        let features = self.features::<D>(&mut rng)?;
        tracing::debug!(
            "Built {}D world with {} features, {} {:?} walkers",
            D,
            features.len(),
            self.num_walkers,
            movement
        );

        let mut sim = Simulation::new(features, MotionParams::for_dimension(D), rng)?
            .with_slow_zone_policy(self.slow_zone_policy);
        sim.spawn_walkers(self.num_walkers, movement, self.restart);
        Ok(sim)
    }
}
