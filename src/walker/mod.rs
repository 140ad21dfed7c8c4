//! Walkers and the movement model that proposes their steps

pub mod agent;
pub mod movement;

pub use agent::{SpeedState, Walker, WalkerPhase};
pub use movement::{propose_move, Direction, MovementType, OriginBias};
