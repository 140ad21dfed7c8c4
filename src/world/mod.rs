//! Environmental features and move resolution

pub mod features;
pub mod generation;
pub mod gravity;
pub mod resolve;

pub use features::{
    Blocker, CaptureZone, Feature, FeatureKind, FeatureLayout, FeatureSet, SlowZone, Teleporter,
};
pub use generation::SpawnBounds;
pub use gravity::GravitationalSink;
pub use resolve::{resolve, Outcome, Resolution, SlowZonePolicy};
