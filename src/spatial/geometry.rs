//! Containment geometry shared by every environmental feature
//!
//! Two shapes cover all features: an axis-aligned cube (square in 2D) given by
//! center and side length, and a ball (disc in 2D) given by center and radius.

use serde::Serialize;

use crate::core::error::{Result, WalkError};
use crate::core::types::Point;

fn check_size(what: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(WalkError::InvalidFeature(format!(
            "{} must be a positive finite number, got {}",
            what, value
        )))
    }
}

fn check_point<const D: usize>(what: &str, point: &Point<D>) -> Result<()> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(WalkError::InvalidFeature(format!(
            "{} has a non-finite coordinate: {:?}",
            what,
            point.coords()
        )))
    }
}

/// Axis-aligned cube around `center` with side `length`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundedRegion<const D: usize> {
    center: Point<D>,
    length: f64,
}

impl<const D: usize> BoundedRegion<D> {
    pub fn new(center: Point<D>, length: f64) -> Result<Self> {
        check_point("region center", &center)?;
        check_size("region side length", length)?;
        Ok(Self { center, length })
    }

    pub fn center(&self) -> Point<D> {
        self.center
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Minimum and maximum corners
    pub fn bounds(&self) -> (Point<D>, Point<D>) {
        let half = self.length / 2.0;
        (
            Point(self.center.0.map(|c| c - half)),
            Point(self.center.0.map(|c| c + half)),
        )
    }

    /// Closed interval test on every axis
    pub fn contains(&self, point: &Point<D>) -> bool {
        let (min, max) = self.bounds();
        (0..D).all(|axis| min[axis] <= point[axis] && point[axis] <= max[axis])
    }
}

/// Ball around `center` with `radius`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sphere<const D: usize> {
    center: Point<D>,
    radius: f64,
}

impl<const D: usize> Sphere<D> {
    pub fn new(center: Point<D>, radius: f64) -> Result<Self> {
        check_point("sphere center", &center)?;
        check_size("sphere radius", radius)?;
        Ok(Self { center, radius })
    }

    pub fn center(&self) -> Point<D> {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Axis-aligned bounding box of the sphere
    pub fn bounds(&self) -> (Point<D>, Point<D>) {
        let r = self.radius;
        (
            Point(self.center.0.map(|c| c - r)),
            Point(self.center.0.map(|c| c + r)),
        )
    }

    /// Euclidean distance to the center is at most the radius
    pub fn contains(&self, point: &Point<D>) -> bool {
        self.center.distance(point) <= self.radius
    }
}
