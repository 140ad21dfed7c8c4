//! Walkabout - random walkers in 2D and 3D worlds with portals, obstacles,
//! traps, slow zones and black holes

pub mod core;
pub mod scenario;
pub mod simulation;
pub mod spatial;
pub mod walker;
pub mod world;
