//! Simulation driver
//!
//! Owns the walkers, the feature set and the random generator, and advances
//! every walker one step per tick:
//!
//! 1. propose a candidate from the walker's movement type
//! 2. resolve it against the features
//! 3. commit the accepted position and roll the restart check

use std::time::Duration;

use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::core::config::MotionParams;
use crate::core::error::Result;
use crate::core::types::{AgentId, Point, SimRng};
use crate::walker::agent::{Walker, WalkerPhase};
use crate::walker::movement::{propose_move, MovementType};
use crate::world::features::FeatureSet;
use crate::world::resolve::{resolve, Outcome, SlowZonePolicy};

/// Delay between frames when animating a run
pub const FRAME_DELAY: Duration = Duration::from_micros(100);
/// Occasional long pause in slow-motion mode
pub const SLOW_MOTION_DELAY: Duration = Duration::from_millis(500);
pub const SLOW_MOTION_CHANCE: f64 = 0.05;

/// Positions of one walker over a run, starting position first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory<const D: usize> {
    pub agent: AgentId,
    pub movement: MovementType,
    pub points: Vec<Point<D>>,
}

impl<const D: usize> Trajectory<D> {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn final_position(&self) -> Option<Point<D>> {
        self.points.last().copied()
    }
}

/// Tally of how moves were resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub moved: u64,
    pub teleported: u64,
    pub blocked: u64,
    pub captured: u64,
    pub confined: u64,
    pub pulled: u64,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: Outcome) {
        let slot = match outcome {
            Outcome::Moved => &mut self.moved,
            Outcome::Teleported => &mut self.teleported,
            Outcome::Blocked => &mut self.blocked,
            Outcome::Captured => &mut self.captured,
            Outcome::Confined => &mut self.confined,
            Outcome::Pulled => &mut self.pulled,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u64 {
        self.moved + self.teleported + self.blocked + self.captured + self.confined + self.pulled
    }
}

/// A set of walkers moving through a shared set of features
#[derive(Debug, Clone)]
pub struct Simulation<const D: usize> {
    walkers: Vec<Walker<D>>,
    features: FeatureSet<D>,
    params: MotionParams,
    policy: SlowZonePolicy,
    rng: SimRng,
    /// Separate stream so frame pacing never shifts trajectories
    pacing_rng: SimRng,
    outcomes: OutcomeCounts,
}

impl<const D: usize> Simulation<D> {
    pub fn new(features: FeatureSet<D>, params: MotionParams, mut rng: SimRng) -> Result<Self> {
        params.validate()?;
        let pacing_rng = SimRng::seed_from_u64(rng.gen());
        Ok(Self {
            walkers: Vec::new(),
            features,
            params,
            policy: SlowZonePolicy::default(),
            rng,
            pacing_rng,
            outcomes: OutcomeCounts::default(),
        })
    }

    /// Add a walker at the origin
    pub fn add_walker(&mut self, movement: MovementType, restart_enabled: bool) -> AgentId {
        let id = AgentId(self.walkers.len() as u32);
        self.walkers.push(Walker::new(id, movement, restart_enabled));
        id
    }

    pub fn spawn_walkers(
        &mut self,
        count: usize,
        movement: MovementType,
        restart_enabled: bool,
    ) -> Vec<AgentId> {
        (0..count)
            .map(|_| self.add_walker(movement, restart_enabled))
            .collect()
    }

    pub fn set_slow_zone_policy(&mut self, policy: SlowZonePolicy) {
        self.policy = policy;
    }

    pub fn with_slow_zone_policy(mut self, policy: SlowZonePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn walkers(&self) -> &[Walker<D>] {
        &self.walkers
    }

    pub fn walker(&self, id: AgentId) -> Option<&Walker<D>> {
        self.walkers.iter().find(|w| w.id() == id)
    }

    pub fn features(&self) -> &FeatureSet<D> {
        &self.features
    }

    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    pub fn slow_zone_policy(&self) -> SlowZonePolicy {
        self.policy
    }

    /// Resolution tally since construction
    pub fn outcomes(&self) -> OutcomeCounts {
        self.outcomes
    }

    /// Advance every walker by one step, in id order
    pub fn tick(&mut self) {
        for walker in self.walkers.iter_mut() {
            walker.set_phase(WalkerPhase::Stepping);
            let candidate = propose_move(walker, &self.params, &mut self.rng);
            let resolution = resolve(
                walker,
                candidate,
                &mut self.features,
                &self.params,
                self.policy,
            );
            self.outcomes.record(resolution.outcome);
            walker.advance(
                resolution.accepted,
                self.params.restart_probability,
                &mut self.rng,
            );
        }
    }

    /// Run `num_steps` ticks and return one trajectory per walker
    ///
    /// Each trajectory holds `num_steps + 1` points: the position before the
    /// first tick, then the position after each tick.
    pub fn run(&mut self, num_steps: usize) -> Vec<Trajectory<D>> {
        self.run_with(num_steps, |_| {})
    }

    /// Like `run`, calling `between` after every tick
    pub fn run_with<F>(&mut self, num_steps: usize, mut between: F) -> Vec<Trajectory<D>>
    where
        F: FnMut(&mut Self),
    {
        let mut trajectories: Vec<Trajectory<D>> = self
            .walkers
            .iter()
            .map(|w| {
                let mut points = Vec::with_capacity(num_steps + 1);
                points.push(w.position());
                Trajectory {
                    agent: w.id(),
                    movement: w.movement(),
                    points,
                }
            })
            .collect();

        for _ in 0..num_steps {
            self.tick();
            for (trajectory, walker) in trajectories.iter_mut().zip(&self.walkers) {
                trajectory.points.push(walker.position());
            }
            between(self);
        }

        for walker in self.walkers.iter_mut() {
            walker.set_phase(WalkerPhase::Done);
        }

        tracing::debug!(
            "Run finished: {} walkers, {} steps, {:?}",
            self.walkers.len(),
            num_steps,
            self.outcomes
        );
        trajectories
    }

    /// Every walker back to the origin at normal speed; histories are kept
    pub fn reset(&mut self) {
        for walker in self.walkers.iter_mut() {
            walker.reset();
        }
    }

    /// How long to wait before drawing the next frame
    pub fn pacing(&mut self, slow_motion: bool) -> Duration {
        if slow_motion && self.pacing_rng.gen_bool(SLOW_MOTION_CHANCE) {
            SLOW_MOTION_DELAY
        } else {
            FRAME_DELAY
        }
    }
}
