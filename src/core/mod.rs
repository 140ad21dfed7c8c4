pub mod config;
pub mod error;
pub mod types;

pub use config::MotionParams;
pub use error::{Result, WalkError};
pub use types::{AgentId, Point, Point2, Point3, SimRng};
