//! Motion configuration with documented constants
//!
//! The step rules read every tunable number from here. Defaults depend on the
//! dimension of the space because the 2D and 3D walkers were tuned apart.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, WalkError};
use crate::walker::movement::OriginBias;

/// Probability that a restart-enabled walker jumps back to the origin after a move
pub const RESTART_PROBABILITY: f64 = 0.1;

/// Parameters for the movement model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionParams {
    /// Length of a unit step (world units)
    ///
    /// Also the length of the pull step a gravitational sink applies.
    pub unit_step: f64,

    /// Divisor applied to every step distance while a walker is slowed
    ///
    /// 2 in 2D, 4 in 3D.
    pub slow_divisor: f64,

    /// Lower bound of the variable-range step distance
    pub variable_step_min: f64,

    /// Upper bound of the variable-range step distance
    pub variable_step_max: f64,

    /// Pareto shape parameter of the Levy step
    ///
    /// The drawn distance is always at least 1.0; smaller shapes give
    /// heavier tails.
    pub levy_shape: f64,

    /// Chance that a resting walker skips its move
    ///
    /// 0.5 in 2D but 0.1 in 3D. The two walkers disagree and are kept that way.
    pub rest_probability: f64,

    /// How the origin-biased walker picks a heading
    pub origin_bias: OriginBias,

    /// Chance of a restart after each accepted move (restart-enabled walkers only)
    pub restart_probability: f64,
}

impl MotionParams {
    /// Defaults for a space of `dimensions` axes
    pub fn for_dimension(dimensions: usize) -> Self {
        let planar = dimensions <= 2;
        Self {
            unit_step: 1.0,
            slow_divisor: if planar { 2.0 } else { 4.0 },
            variable_step_min: 0.5,
            variable_step_max: 1.5,
            levy_shape: 1.5,
            rest_probability: if planar { 0.5 } else { 0.1 },
            origin_bias: if planar {
                OriginBias::Reversal { probability: 0.1 }
            } else {
                OriginBias::Weighted { weight: 30 }
            },
            restart_probability: RESTART_PROBABILITY,
        }
    }

    /// Validate parameters for internal consistency
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(WalkError::InvalidConfiguration(msg));

        if !(self.unit_step.is_finite() && self.unit_step > 0.0) {
            return invalid(format!("unit_step must be positive, got {}", self.unit_step));
        }
        if !(self.slow_divisor.is_finite() && self.slow_divisor >= 1.0) {
            return invalid(format!(
                "slow_divisor must be at least 1, got {}",
                self.slow_divisor
            ));
        }
        if !(self.variable_step_min > 0.0 && self.variable_step_min < self.variable_step_max) {
            return invalid(format!(
                "variable step range [{}, {}] is empty or non-positive",
                self.variable_step_min, self.variable_step_max
            ));
        }
        if !(self.levy_shape.is_finite() && self.levy_shape > 0.0) {
            return invalid(format!("levy_shape must be positive, got {}", self.levy_shape));
        }
        for (name, p) in [
            ("rest_probability", self.rest_probability),
            ("restart_probability", self.restart_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("{} must lie in [0, 1], got {}", name, p));
            }
        }
        self.origin_bias.validate()
    }
}
