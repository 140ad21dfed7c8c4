//! Stochastic step rules
//!
//! Every rule turns the walker's current position into a candidate position.
//! Candidates are only proposals; the interaction resolver decides what the
//! walker actually does with them.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::MotionParams;
use crate::core::error::{Result, WalkError};
use crate::core::types::Point;
use crate::walker::agent::{SpeedState, Walker};

/// The six walker types, numbered 1-6 in scenario files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Uniform heading, unit distance
    Isotropic,
    /// Uniform heading, distance uniform in a range around one unit
    VariableRange,
    /// One of the +/- axis headings, unit distance
    AxisAligned,
    /// Unit step with a pull toward the origin
    OriginBiased,
    /// Uniform heading, heavy-tailed (Pareto) distance
    Levy,
    /// Isotropic step that sometimes stays put
    Resting,
}

impl MovementType {
    pub const ALL: [MovementType; 6] = [
        MovementType::Isotropic,
        MovementType::VariableRange,
        MovementType::AxisAligned,
        MovementType::OriginBiased,
        MovementType::Levy,
        MovementType::Resting,
    ];

    pub fn code(self) -> u8 {
        match self {
            MovementType::Isotropic => 1,
            MovementType::VariableRange => 2,
            MovementType::AxisAligned => 3,
            MovementType::OriginBiased => 4,
            MovementType::Levy => 5,
            MovementType::Resting => 6,
        }
    }

    /// Candidate position for a walker at `position`
    pub fn propose<const D: usize, R: Rng + ?Sized>(
        self,
        position: Point<D>,
        speed: SpeedState,
        params: &MotionParams,
        rng: &mut R,
    ) -> Point<D> {
        let divisor = match speed {
            SpeedState::Normal => 1.0,
            SpeedState::Slowed => params.slow_divisor,
        };
        let unit = params.unit_step / divisor;

        match self {
            MovementType::Isotropic => position + random_direction(rng) * unit,
            MovementType::VariableRange => {
                let heading = random_direction(rng);
                let distance = rng.gen_range(params.variable_step_min..=params.variable_step_max);
                position + heading * (distance / divisor)
            }
            MovementType::AxisAligned => {
                let heading = Direction::axis_token::<D>(rng.gen_range(0..2 * D));
                position + heading.heading(&position) * unit
            }
            MovementType::OriginBiased => {
                position + params.origin_bias.heading(&position, rng) * unit
            }
            MovementType::Levy => {
                let heading = random_direction(rng);
                let distance = levy_distance(params.levy_shape, rng);
                position + heading * (distance / divisor)
            }
            MovementType::Resting => {
                if rng.gen_bool(params.rest_probability) {
                    position
                } else {
                    position + random_direction(rng) * unit
                }
            }
        }
    }
}

impl TryFrom<i64> for MovementType {
    type Error = WalkError;

    fn try_from(code: i64) -> Result<Self> {
        MovementType::ALL
            .into_iter()
            .find(|m| i64::from(m.code()) == code)
            .ok_or_else(|| {
                WalkError::InvalidConfiguration(format!(
                    "walker type must be between 1 and 6, got {}",
                    code
                ))
            })
    }
}

/// Candidate position for `walker` under its own movement type and speed
pub fn propose_move<const D: usize, R: Rng + ?Sized>(
    walker: &Walker<D>,
    params: &MotionParams,
    rng: &mut R,
) -> Point<D> {
    walker
        .movement()
        .propose(walker.position(), walker.speed(), params, rng)
}

/// Finite heading set used by the axis-aligned and origin-biased walkers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Axis { axis: usize, positive: bool },
    TowardOrigin,
}

impl Direction {
    /// Token `index` of the +/- axis set: even indices positive, odd negative.
    /// Index `2 * D` is the toward-origin token.
    fn axis_token<const D: usize>(index: usize) -> Self {
        assert!(index <= 2 * D, "direction token {} outside 0..={}", index, 2 * D);
        if index == 2 * D {
            Direction::TowardOrigin
        } else {
            Direction::Axis {
                axis: index / 2,
                positive: index % 2 == 0,
            }
        }
    }

    /// Unit vector for this direction as seen from `from`
    ///
    /// Toward-origin from the origin itself resolves to +x.
    pub fn heading<const D: usize>(self, from: &Point<D>) -> Point<D> {
        match self {
            Direction::Axis { axis, positive } => Point::axis(axis, positive),
            Direction::TowardOrigin => (-*from).normalize().unwrap_or_else(|| Point::axis(0, true)),
        }
    }
}

/// Heading rule for the origin-biased walker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum OriginBias {
    /// Draw from the axis set plus toward-origin, with one randomly favored
    /// token repeated `weight` extra times
    Weighted { weight: u32 },
    /// Head straight for the origin with `probability`, otherwise any heading
    Reversal { probability: f64 },
}

impl OriginBias {
    pub fn heading<const D: usize, R: Rng + ?Sized>(&self, from: &Point<D>, rng: &mut R) -> Point<D> {
        match *self {
            OriginBias::Weighted { weight } => {
                let tokens = 2 * D + 1;
                let favored = rng.gen_range(0..tokens);
                let pick = rng.gen_range(0..tokens + weight as usize);
                let index = if pick < tokens { pick } else { favored };
                Direction::axis_token::<D>(index).heading(from)
            }
            OriginBias::Reversal { probability } => {
                if rng.gen_bool(probability) {
                    Direction::TowardOrigin.heading(from)
                } else {
                    random_direction(rng)
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            OriginBias::Reversal { probability } if !(0.0..=1.0).contains(&probability) => {
                Err(WalkError::InvalidConfiguration(format!(
                    "origin reversal probability must lie in [0, 1], got {}",
                    probability
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Uniformly distributed unit vector (rejection sampling in the unit ball)
pub fn random_direction<const D: usize, R: Rng + ?Sized>(rng: &mut R) -> Point<D> {
    loop {
        let mut coords = [0.0; D];
        for c in coords.iter_mut() {
            *c = rng.gen_range(-1.0..=1.0);
        }
        let candidate = Point(coords);
        let len = candidate.norm();
        if len > 1e-9 && len <= 1.0 {
            return candidate / len;
        }
    }
}

/// Pareto(`shape`) draw shifted by one, so never below 1.0
pub fn levy_distance<R: Rng + ?Sized>(shape: f64, rng: &mut R) -> f64 {
    let u: f64 = rng.gen();
    (1.0 - u).powf(-1.0 / shape)
}
