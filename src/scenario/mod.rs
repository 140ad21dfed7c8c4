//! Scenario files: what to simulate

pub mod loader;
pub mod schema;

pub use loader::{load_scenario, parse_scenario_json, parse_scenario_toml};
pub use schema::{FeatureSpec, ObstacleSpec, PortalSpec, Scenario, StatisticsSpec};
