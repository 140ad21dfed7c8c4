//! Environmental features and the ordered feature set
//!
//! Five kinds of feature share two geometries:
//! - `Blocker` and `Teleporter` occupy a `BoundedRegion`
//! - `CaptureZone`, `SlowZone` and `GravitationalSink` occupy a `Sphere`
//!
//! Capture and slow zones remember which walkers they hold. Nothing else in
//! the world carries state from one tick to the next.

use ahash::AHashSet;
use serde::Serialize;

use crate::core::error::{Result, WalkError};
use crate::core::types::{AgentId, Point};
use crate::spatial::geometry::{BoundedRegion, Sphere};
use crate::world::gravity::GravitationalSink;

/// Feature kinds, in the order the resolver consults them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Teleporter,
    Blocker,
    CaptureZone,
    SlowZone,
    GravitationalSink,
}

impl FeatureKind {
    /// Resolution precedence: earlier kinds win over later ones
    pub const PRECEDENCE: [FeatureKind; 5] = [
        FeatureKind::Teleporter,
        FeatureKind::Blocker,
        FeatureKind::CaptureZone,
        FeatureKind::SlowZone,
        FeatureKind::GravitationalSink,
    ];

    pub fn rank(self) -> usize {
        Self::PRECEDENCE
            .iter()
            .position(|k| *k == self)
            .unwrap_or(Self::PRECEDENCE.len())
    }
}

/// Region that rejects any move landing inside it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Blocker<const D: usize> {
    region: BoundedRegion<D>,
}

impl<const D: usize> Blocker<D> {
    pub fn new(center: Point<D>, length: f64) -> Result<Self> {
        Ok(Self {
            region: BoundedRegion::new(center, length)?,
        })
    }

    pub fn region(&self) -> &BoundedRegion<D> {
        &self.region
    }

    pub fn contains(&self, point: &Point<D>) -> bool {
        self.region.contains(point)
    }

    /// True when a move to `candidate` must be rejected
    pub fn blocks(&self, candidate: &Point<D>) -> bool {
        self.contains(candidate)
    }
}

/// Region that sends any move landing inside it to a fixed exit point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Teleporter<const D: usize> {
    region: BoundedRegion<D>,
    exit: Point<D>,
}

impl<const D: usize> Teleporter<D> {
    pub fn new(center: Point<D>, length: f64, exit: Point<D>) -> Result<Self> {
        if !exit.is_finite() {
            return Err(WalkError::InvalidFeature(format!(
                "teleporter exit point has a non-finite coordinate: {:?}",
                exit.coords()
            )));
        }
        Ok(Self {
            region: BoundedRegion::new(center, length)?,
            exit,
        })
    }

    pub fn region(&self) -> &BoundedRegion<D> {
        &self.region
    }

    pub fn exit(&self) -> Point<D> {
        self.exit
    }

    pub fn contains(&self, point: &Point<D>) -> bool {
        self.region.contains(point)
    }

    /// Exit point if `candidate` lands inside the region
    pub fn teleport(&self, candidate: &Point<D>) -> Option<Point<D>> {
        self.contains(candidate).then_some(self.exit)
    }
}

/// Sphere that walkers can enter but never leave
#[derive(Debug, Clone)]
pub struct CaptureZone<const D: usize> {
    zone: Sphere<D>,
    trapped: AHashSet<AgentId>,
}

impl<const D: usize> CaptureZone<D> {
    pub fn new(center: Point<D>, radius: f64) -> Result<Self> {
        Ok(Self {
            zone: Sphere::new(center, radius)?,
            trapped: AHashSet::new(),
        })
    }

    pub fn sphere(&self) -> &Sphere<D> {
        &self.zone
    }

    pub fn contains(&self, point: &Point<D>) -> bool {
        self.zone.contains(point)
    }

    pub fn is_trapped(&self, agent: AgentId) -> bool {
        self.trapped.contains(&agent)
    }

    pub fn trapped(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.trapped.iter().copied()
    }

    pub fn trapped_count(&self) -> usize {
        self.trapped.len()
    }

    /// Whether `agent`, standing at `current`, is held by this zone
    ///
    /// A walker standing inside is held even if it was never admitted
    /// (it started there or was teleported in); it is admitted on the spot.
    /// A recorded member standing outside (after a restart or a teleport)
    /// is released.
    pub fn holds(&mut self, agent: AgentId, current: &Point<D>) -> bool {
        if self.zone.contains(current) {
            self.trapped.insert(agent);
            true
        } else {
            self.trapped.remove(&agent);
            false
        }
    }

    pub fn capture(&mut self, agent: AgentId) {
        self.trapped.insert(agent);
    }

    pub fn release(&mut self, agent: AgentId) -> bool {
        self.trapped.remove(&agent)
    }
}

/// Sphere that slows every walker standing inside it
#[derive(Debug, Clone)]
pub struct SlowZone<const D: usize> {
    zone: Sphere<D>,
    slowed: AHashSet<AgentId>,
}

impl<const D: usize> SlowZone<D> {
    pub fn new(center: Point<D>, radius: f64) -> Result<Self> {
        Ok(Self {
            zone: Sphere::new(center, radius)?,
            slowed: AHashSet::new(),
        })
    }

    pub fn sphere(&self) -> &Sphere<D> {
        &self.zone
    }

    pub fn contains(&self, point: &Point<D>) -> bool {
        self.zone.contains(point)
    }

    pub fn is_slowing(&self, agent: AgentId) -> bool {
        self.slowed.contains(&agent)
    }

    pub fn slowed(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.slowed.iter().copied()
    }

    /// Record `agent` as slowed; false if it already was
    pub fn admit(&mut self, agent: AgentId) -> bool {
        self.slowed.insert(agent)
    }

    /// Forget `agent`; false if it was not a member
    pub fn release(&mut self, agent: AgentId) -> bool {
        self.slowed.remove(&agent)
    }
}

/// Closed set of environmental features
#[derive(Debug, Clone)]
pub enum Feature<const D: usize> {
    Teleporter(Teleporter<D>),
    Blocker(Blocker<D>),
    CaptureZone(CaptureZone<D>),
    SlowZone(SlowZone<D>),
    GravitationalSink(GravitationalSink<D>),
}

impl<const D: usize> Feature<D> {
    pub fn kind(&self) -> FeatureKind {
        match self {
            Feature::Teleporter(_) => FeatureKind::Teleporter,
            Feature::Blocker(_) => FeatureKind::Blocker,
            Feature::CaptureZone(_) => FeatureKind::CaptureZone,
            Feature::SlowZone(_) => FeatureKind::SlowZone,
            Feature::GravitationalSink(_) => FeatureKind::GravitationalSink,
        }
    }

    /// Geometric containment; for sinks this is the visual body, not the event horizon
    pub fn contains(&self, point: &Point<D>) -> bool {
        match self {
            Feature::Teleporter(f) => f.contains(point),
            Feature::Blocker(f) => f.contains(point),
            Feature::CaptureZone(f) => f.contains(point),
            Feature::SlowZone(f) => f.contains(point),
            Feature::GravitationalSink(f) => f.contains(point),
        }
    }

    /// Serializable description for renderers and reports
    pub fn layout(&self) -> FeatureLayout<D> {
        let (center, size, exit) = match self {
            Feature::Teleporter(f) => (f.region().center(), f.region().length(), Some(f.exit())),
            Feature::Blocker(f) => (f.region().center(), f.region().length(), None),
            Feature::CaptureZone(f) => (f.sphere().center(), f.sphere().radius(), None),
            Feature::SlowZone(f) => (f.sphere().center(), f.sphere().radius(), None),
            Feature::GravitationalSink(f) => (f.body().center(), f.body().radius(), None),
        };
        FeatureLayout {
            kind: self.kind(),
            center,
            size,
            exit,
        }
    }
}

impl<const D: usize> From<Teleporter<D>> for Feature<D> {
    fn from(f: Teleporter<D>) -> Self {
        Feature::Teleporter(f)
    }
}

impl<const D: usize> From<Blocker<D>> for Feature<D> {
    fn from(f: Blocker<D>) -> Self {
        Feature::Blocker(f)
    }
}

impl<const D: usize> From<CaptureZone<D>> for Feature<D> {
    fn from(f: CaptureZone<D>) -> Self {
        Feature::CaptureZone(f)
    }
}

impl<const D: usize> From<SlowZone<D>> for Feature<D> {
    fn from(f: SlowZone<D>) -> Self {
        Feature::SlowZone(f)
    }
}

impl<const D: usize> From<GravitationalSink<D>> for Feature<D> {
    fn from(f: GravitationalSink<D>) -> Self {
        Feature::GravitationalSink(f)
    }
}

/// Shape summary of one feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureLayout<const D: usize> {
    pub kind: FeatureKind,
    pub center: Point<D>,
    /// Side length for regions, radius for spheres
    pub size: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit: Option<Point<D>>,
}

/// Features kept sorted by `FeatureKind::PRECEDENCE`
///
/// Insertion order is preserved among features of the same kind.
#[derive(Debug, Clone, Default)]
pub struct FeatureSet<const D: usize> {
    features: Vec<Feature<D>>,
}

impl<const D: usize> FeatureSet<D> {
    pub fn new() -> Self {
        Self {
            features: Vec::new(),
        }
    }

    pub fn insert(&mut self, feature: impl Into<Feature<D>>) {
        let feature = feature.into();
        let rank = feature.kind().rank();
        let at = self
            .features
            .partition_point(|existing| existing.kind().rank() <= rank);
        self.features.insert(at, feature);
    }

    pub fn with(mut self, feature: impl Into<Feature<D>>) -> Self {
        self.insert(feature);
        self
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature<D>> {
        self.features.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Feature<D>> {
        self.features.iter_mut()
    }

    pub fn count(&self, kind: FeatureKind) -> usize {
        self.features.iter().filter(|f| f.kind() == kind).count()
    }

    /// True if any slow zone still counts `agent` as a member
    pub fn is_slowed_anywhere(&self, agent: AgentId) -> bool {
        self.features.iter().any(|f| match f {
            Feature::SlowZone(zone) => zone.is_slowing(agent),
            _ => false,
        })
    }

    pub fn layout(&self) -> Vec<FeatureLayout<D>> {
        self.features.iter().map(Feature::layout).collect()
    }
}

impl<const D: usize> FromIterator<Feature<D>> for FeatureSet<D> {
    fn from_iter<I: IntoIterator<Item = Feature<D>>>(iter: I) -> Self {
        let mut set = FeatureSet::new();
        for feature in iter {
            set.insert(feature);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Point2, Point3};

    #[test]
    fn test_precedence_rank_matches_order() {
        for (i, kind) in FeatureKind::PRECEDENCE.iter().enumerate() {
            assert_eq!(kind.rank(), i);
        }
    }

    #[test]
    fn test_feature_set_sorted_by_precedence() {
        let set: FeatureSet<3> = FeatureSet::new()
            .with(SlowZone::new(Point3::origin(), 2.0).unwrap())
            .with(GravitationalSink::new(Point3::new([9.0, 9.0, 9.0])).unwrap())
            .with(Blocker::new(Point3::new([5.0, 0.0, 0.0]), 1.0).unwrap())
            .with(CaptureZone::new(Point3::origin(), 3.0).unwrap())
            .with(Teleporter::new(Point3::origin(), 1.0, Point3::new([1.0, 1.0, 1.0])).unwrap())
            .with(Blocker::new(Point3::new([-5.0, 0.0, 0.0]), 1.0).unwrap());

        let kinds: Vec<FeatureKind> = set.iter().map(Feature::kind).collect();
        assert_eq!(
            kinds,
            vec![
                FeatureKind::Teleporter,
                FeatureKind::Blocker,
                FeatureKind::Blocker,
                FeatureKind::CaptureZone,
                FeatureKind::SlowZone,
                FeatureKind::GravitationalSink,
            ]
        );

        // same-kind features keep insertion order
        let blocker_x: Vec<f64> = set
            .iter()
            .filter_map(|f| match f {
                Feature::Blocker(b) => Some(b.region().center().x()),
                _ => None,
            })
            .collect();
        assert_eq!(blocker_x, vec![5.0, -5.0]);
        assert_eq!(set.count(FeatureKind::Blocker), 2);
    }

    #[test]
    fn test_teleport_only_inside() {
        let portal = Teleporter::new(
            Point2::new([5.0, 5.0]),
            2.0,
            Point2::new([-5.0, -5.0]),
        )
        .unwrap();
        assert_eq!(
            portal.teleport(&Point2::new([5.5, 4.5])),
            Some(Point2::new([-5.0, -5.0]))
        );
        assert_eq!(portal.teleport(&Point2::new([7.0, 5.0])), None);
    }

    #[test]
    fn test_capture_zone_holds_and_releases() {
        let mut trap = CaptureZone::new(Point2::origin(), 2.0).unwrap();
        let agent = AgentId(7);

        assert!(trap.holds(agent, &Point2::new([1.0, 0.0])));
        assert!(trap.is_trapped(agent));

        // member found outside (restart or teleport) is let go
        assert!(!trap.holds(agent, &Point2::new([10.0, 0.0])));
        assert!(!trap.is_trapped(agent));
        assert_eq!(trap.trapped_count(), 0);
    }

    #[test]
    fn test_slow_zone_membership() {
        let mut zone = SlowZone::new(Point2::origin(), 2.0).unwrap();
        assert!(zone.admit(AgentId(1)));
        assert!(!zone.admit(AgentId(1)));
        assert!(zone.is_slowing(AgentId(1)));
        assert!(zone.release(AgentId(1)));
        assert!(!zone.release(AgentId(1)));
    }

    #[test]
    fn test_layout_reports_exit() {
        let set: FeatureSet<2> = FeatureSet::new()
            .with(Teleporter::new(Point2::origin(), 4.0, Point2::new([9.0, 9.0])).unwrap())
            .with(SlowZone::new(Point2::new([1.0, 1.0]), 3.0).unwrap());
        let layout = set.layout();
        assert_eq!(layout[0].exit, Some(Point2::new([9.0, 9.0])));
        assert_eq!(layout[1].kind, FeatureKind::SlowZone);
        assert_eq!(layout[1].size, 3.0);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(Blocker::new(Point2::origin(), 0.0).is_err());
        assert!(CaptureZone::new(Point2::origin(), -1.0).is_err());
        assert!(Teleporter::new(Point2::origin(), 1.0, Point2::new([f64::NAN, 0.0])).is_err());
    }
}
