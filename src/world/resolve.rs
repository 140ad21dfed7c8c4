//! Interaction resolution
//!
//! Turns a candidate move into the walker's accepted position.
//!
//! Slow zones are synced first, on every tick: each zone admits a walker whose
//! current position is inside and releases one that has left. Then features
//! are consulted in `FeatureKind::PRECEDENCE` order and the first one whose
//! rule fires decides the move:
//!
//! 1. Teleporter: candidate inside -> exit point
//! 2. Blocker: candidate inside -> stay put
//! 3. CaptureZone: a held walker may only move within every zone holding it;
//!    a free walker stepping in is captured
//! 4. SlowZone: never moves the walker (see `SlowZonePolicy` for when a
//!    resident walker ends the scan here)
//! 5. GravitationalSink: current position inside the event horizon ->
//!    pull step toward the center
//!
//! If nothing fires the candidate is accepted unchanged.

use serde::{Deserialize, Serialize};

use crate::core::config::MotionParams;
use crate::core::types::{AgentId, Point};
use crate::walker::agent::Walker;
use crate::world::features::{Feature, FeatureSet};

/// What a slow zone does to the rest of the scan when the walker is already a member
///
/// A walker that enters a slow zone always keeps scanning, so a later sink can
/// still pull it on the same tick. For a walker that was already slowed by the
/// zone the two choices differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlowZonePolicy {
    /// Stop scanning and accept the candidate; later features (sinks) are skipped
    #[default]
    StopWhenResident,
    /// Keep scanning; later features still apply
    Passthrough,
}

/// Which rule settled the move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Candidate accepted unchanged
    Moved,
    Teleported,
    Blocked,
    /// Free walker stepped into a capture zone
    Captured,
    /// Held walker tried to leave a capture zone
    Confined,
    /// Pulled toward a gravitational sink
    Pulled,
}

/// Accepted position and the rule that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<const D: usize> {
    pub accepted: Point<D>,
    pub outcome: Outcome,
}

impl<const D: usize> Resolution<D> {
    fn new(accepted: Point<D>, outcome: Outcome) -> Self {
        Self { accepted, outcome }
    }
}

/// Resolve `candidate` for `walker` against `features`
///
/// Updates zone membership and the walker's speed state. The walker's
/// position is left alone; the caller commits `Resolution::accepted`.
pub fn resolve<const D: usize>(
    walker: &mut Walker<D>,
    candidate: Point<D>,
    features: &mut FeatureSet<D>,
    params: &MotionParams,
    policy: SlowZonePolicy,
) -> Resolution<D> {
    let id = walker.id();
    let current = walker.position();
    let resident = sync_slow_zones(walker, features);

    let resolution = teleport_or_block(features, &current, &candidate)
        .or_else(|| confine(features, id, &current, &candidate))
        .or_else(|| {
            (resident && policy == SlowZonePolicy::StopWhenResident)
                .then(|| Resolution::new(candidate, Outcome::Moved))
        })
        .or_else(|| pull(features, &current, params))
        .unwrap_or_else(|| Resolution::new(candidate, Outcome::Moved));

    if resolution.outcome != Outcome::Moved {
        tracing::trace!(
            "Walker {:?}: {:?} at {:?}",
            id,
            resolution.outcome,
            resolution.accepted.coords()
        );
    }
    resolution
}

/// Admit or release the walker in every slow zone by its current position
///
/// Returns true if some zone already counted the walker before this tick.
fn sync_slow_zones<const D: usize>(walker: &mut Walker<D>, features: &mut FeatureSet<D>) -> bool {
    let id = walker.id();
    let current = walker.position();
    let mut resident = false;
    let mut inside = false;
    let mut left = false;

    for feature in features.iter_mut() {
        if let Feature::SlowZone(zone) = feature {
            if zone.contains(&current) {
                inside = true;
                resident |= !zone.admit(id);
            } else {
                left |= zone.release(id);
            }
        }
    }

    // Overlapping zones: speed comes back only once no zone holds the walker
    if inside {
        walker.slow_down();
    } else if left {
        walker.regular_speed();
    }
    resident
}

fn teleport_or_block<const D: usize>(
    features: &FeatureSet<D>,
    current: &Point<D>,
    candidate: &Point<D>,
) -> Option<Resolution<D>> {
    features.iter().find_map(|feature| match feature {
        Feature::Teleporter(portal) => portal
            .teleport(candidate)
            .map(|exit| Resolution::new(exit, Outcome::Teleported)),
        Feature::Blocker(blocker) if blocker.blocks(candidate) => {
            Some(Resolution::new(*current, Outcome::Blocked))
        }
        _ => None,
    })
}

/// Capture zone rule over every zone at once
///
/// A walker held by several overlapping zones must stay inside all of them.
fn confine<const D: usize>(
    features: &mut FeatureSet<D>,
    id: AgentId,
    current: &Point<D>,
    candidate: &Point<D>,
) -> Option<Resolution<D>> {
    let mut held = false;
    let mut escapes = false;
    let mut entering = false;

    for feature in features.iter_mut() {
        if let Feature::CaptureZone(trap) = feature {
            if trap.holds(id, current) {
                held = true;
                escapes |= !trap.contains(candidate);
            } else if trap.contains(candidate) {
                entering = true;
            }
        }
    }

    if held && escapes {
        return Some(Resolution::new(*current, Outcome::Confined));
    }
    if !held && !entering {
        return None;
    }

    for feature in features.iter_mut() {
        if let Feature::CaptureZone(trap) = feature {
            if trap.contains(candidate) {
                trap.capture(id);
            }
        }
    }
    let outcome = if held { Outcome::Moved } else { Outcome::Captured };
    Some(Resolution::new(*candidate, outcome))
}

fn pull<const D: usize>(
    features: &FeatureSet<D>,
    current: &Point<D>,
    params: &MotionParams,
) -> Option<Resolution<D>> {
    features.iter().find_map(|feature| match feature {
        Feature::GravitationalSink(sink) if sink.in_event_horizon(current) => Some(
            Resolution::new(sink.pull(current, params.unit_step), Outcome::Pulled),
        ),
        _ => None,
    })
}
