//! Gravitational sinks (black holes)
//!
//! A sink pulls in every walker whose current position lies inside its event
//! horizon: the radius at which the Newtonian attraction between a walker and
//! the sink drops to `FORCE_THRESHOLD`.
//!
//! ```text
//! F   = G * m_walker * m_sink / (r^2 + EPSILON)
//! r_h = sqrt(G * m_walker * m_sink / FORCE_THRESHOLD)
//! ```

use serde::Serialize;

use crate::core::error::{Result, WalkError};
use crate::core::types::Point;
use crate::spatial::geometry::Sphere;

pub const GRAVITATIONAL_CONSTANT: f64 = 6.674e-11;
pub const WALKER_MASS: f64 = 1e-14;
pub const SINK_MASS: f64 = 1.5e24;
/// Force at the event horizon
pub const FORCE_THRESHOLD: f64 = 0.01;
/// Radius drawn by renderers; has no effect on movement
pub const VISUAL_RADIUS: f64 = 1.0;
/// Keeps the force finite at zero distance
pub const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GravitationalSink<const D: usize> {
    body: Sphere<D>,
    mass: f64,
    horizon: f64,
}

impl<const D: usize> GravitationalSink<D> {
    /// Sink with the standard mass at `center`; three-dimensional spaces only
    pub fn new(center: Point<D>) -> Result<Self> {
        Self::with_mass(center, SINK_MASS)
    }

    pub fn with_mass(center: Point<D>, mass: f64) -> Result<Self> {
        if D != 3 {
            return Err(WalkError::InvalidFeature(format!(
                "gravitational sinks need three dimensions, this space has {}",
                D
            )));
        }
        if !(mass.is_finite() && mass > 0.0) {
            return Err(WalkError::InvalidFeature(format!(
                "sink mass must be positive, got {}",
                mass
            )));
        }
        Ok(Self {
            body: Sphere::new(center, VISUAL_RADIUS)?,
            mass,
            horizon: (GRAVITATIONAL_CONSTANT * WALKER_MASS * mass / FORCE_THRESHOLD).sqrt(),
        })
    }

    pub fn body(&self) -> &Sphere<D> {
        &self.body
    }

    pub fn center(&self) -> Point<D> {
        self.body.center()
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn contains(&self, point: &Point<D>) -> bool {
        self.body.contains(point)
    }

    pub fn event_horizon_radius(&self) -> f64 {
        self.horizon
    }

    /// Attraction felt by a walker at `point`
    pub fn force_at(&self, point: &Point<D>) -> f64 {
        let r = self.center().distance(point);
        GRAVITATIONAL_CONSTANT * WALKER_MASS * self.mass / (r * r + EPSILON)
    }

    pub fn in_event_horizon(&self, point: &Point<D>) -> bool {
        self.center().distance(point) <= self.horizon
    }

    /// One step of at most `max_step` from `from` straight at the center
    ///
    /// Never overshoots: a walker closer than `max_step` lands on the center.
    pub fn pull(&self, from: &Point<D>, max_step: f64) -> Point<D> {
        let offset = self.center() - *from;
        let distance = offset.norm() + EPSILON;
        let step = distance.min(max_step);
        *from + offset * (step / distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Point2, Point3};

    #[test]
    fn test_event_horizon_formula() {
        let sink = GravitationalSink::new(Point3::origin()).unwrap();
        let expected = (GRAVITATIONAL_CONSTANT * WALKER_MASS * SINK_MASS / FORCE_THRESHOLD).sqrt();
        assert_eq!(sink.event_horizon_radius(), expected);
        // about ten units with the standard constants
        assert!((sink.event_horizon_radius() - 10.005).abs() < 0.01);
    }

    #[test]
    fn test_force_at_horizon_equals_threshold() {
        let sink = GravitationalSink::new(Point3::new([2.0, -3.0, 1.0])).unwrap();
        let edge = sink.center() + Point3::new([0.0, 0.0, sink.event_horizon_radius()]);
        assert!((sink.force_at(&edge) - FORCE_THRESHOLD).abs() < 1e-9);
        assert!(sink.in_event_horizon(&sink.center()));
        assert!(!sink.in_event_horizon(&(edge + Point3::new([0.0, 0.0, 0.01]))));
    }

    #[test]
    fn test_force_finite_at_center() {
        let sink = GravitationalSink::new(Point3::origin()).unwrap();
        assert!(sink.force_at(&Point3::origin()).is_finite());
    }

    #[test]
    fn test_pull_moves_one_unit_toward_center() {
        let sink = GravitationalSink::new(Point3::new([5.0, 0.0, 0.0])).unwrap();
        let next = sink.pull(&Point3::origin(), 1.0);
        assert!((next.x() - 1.0).abs() < 1e-6);
        assert!(next.y().abs() < 1e-12 && next.z().abs() < 1e-12);

        let near = Point3::new([4.6, 0.0, 0.0]);
        let landed = sink.pull(&near, 1.0);
        assert!(landed.distance(&sink.center()) < 1e-6);
    }

    #[test]
    fn test_pull_at_center_stays() {
        let sink = GravitationalSink::new(Point3::new([1.0, 1.0, 1.0])).unwrap();
        assert_eq!(sink.pull(&sink.center(), 1.0), sink.center());
    }

    #[test]
    fn test_rejects_planar_sink() {
        assert!(matches!(
            GravitationalSink::new(Point2::origin()),
            Err(WalkError::InvalidFeature(_))
        ));
    }
}
