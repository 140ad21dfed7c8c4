//! Geometry primitives for feature containment

pub mod geometry;

pub use geometry::{BoundedRegion, Sphere};
