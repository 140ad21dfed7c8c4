//! Random feature placement
//!
//! Scenario files may ask for "N portals" instead of listing them. The
//! generated features are scattered uniformly over a cube around the origin.

use rand::Rng;

use crate::core::error::Result;
use crate::core::types::Point;
use crate::world::features::{Blocker, CaptureZone, SlowZone, Teleporter};
use crate::world::gravity::GravitationalSink;

/// Where random features may appear and how large they are
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnBounds {
    /// Coordinates are drawn from `[-extent, extent]` on every axis
    pub extent: f64,
    /// Side lengths and radii are drawn from `[min_size, max_size]`
    pub min_size: f64,
    pub max_size: f64,
}

impl SpawnBounds {
    /// 60 units in 2D, 40 in 3D; sizes 10-20 in both
    pub fn for_dimension(dimensions: usize) -> Self {
        Self {
            extent: if dimensions <= 2 { 60.0 } else { 40.0 },
            min_size: 10.0,
            max_size: 20.0,
        }
    }

    pub fn point<const D: usize, R: Rng + ?Sized>(&self, rng: &mut R) -> Point<D> {
        let mut coords = [0.0; D];
        for c in coords.iter_mut() {
            *c = rng.gen_range(-self.extent..=self.extent);
        }
        Point(coords)
    }

    pub fn size<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.min_size..=self.max_size)
    }

    pub fn blocker<const D: usize, R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Blocker<D>> {
        let length = self.size(rng);
        Blocker::new(self.point(rng), length)
    }

    pub fn teleporter<const D: usize, R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Teleporter<D>> {
        let length = self.size(rng);
        let center = self.point(rng);
        Teleporter::new(center, length, self.point(rng))
    }

    pub fn capture_zone<const D: usize, R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<CaptureZone<D>> {
        let radius = self.size(rng);
        CaptureZone::new(self.point(rng), radius)
    }

    pub fn slow_zone<const D: usize, R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SlowZone<D>> {
        let radius = self.size(rng);
        SlowZone::new(self.point(rng), radius)
    }

    pub fn sink<const D: usize, R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<GravitationalSink<D>> {
        GravitationalSink::new(self.point(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SimRng;
    use rand::SeedableRng;

    #[test]
    fn test_points_within_extent() {
        let bounds = SpawnBounds::for_dimension(3);
        let mut rng = SimRng::seed_from_u64(21);
        for _ in 0..500 {
            let p: Point<3> = bounds.point(&mut rng);
            assert!(p.coords().iter().all(|c| c.abs() <= 40.0));
        }
    }

    #[test]
    fn test_sizes_in_range() {
        let bounds = SpawnBounds::for_dimension(2);
        let mut rng = SimRng::seed_from_u64(22);
        for _ in 0..200 {
            let zone: SlowZone<2> = bounds.slow_zone(&mut rng).unwrap();
            let r = zone.sphere().radius();
            assert!((10.0..=20.0).contains(&r));
            let portal: Teleporter<2> = bounds.teleporter(&mut rng).unwrap();
            assert!(portal.exit().coords().iter().all(|c| c.abs() <= 60.0));
        }
    }

    #[test]
    fn test_sink_needs_three_dimensions() {
        let mut rng = SimRng::seed_from_u64(23);
        assert!(SpawnBounds::for_dimension(3).sink::<3, _>(&mut rng).is_ok());
        assert!(SpawnBounds::for_dimension(2).sink::<2, _>(&mut rng).is_err());
    }
}
