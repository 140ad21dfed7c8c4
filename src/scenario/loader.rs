//! Load scenarios from TOML or JSON files

use std::fs;
use std::path::Path;

use crate::core::error::{Result, WalkError};
use crate::scenario::schema::Scenario;

/// Parse a TOML scenario and validate it
pub fn parse_scenario_toml(content: &str) -> Result<Scenario> {
    let scenario: Scenario =
        toml::from_str(content).map_err(|e| WalkError::ScenarioParse(e.to_string()))?;
    scenario.validate()?;
    Ok(scenario)
}

/// Parse a JSON scenario and validate it
pub fn parse_scenario_json(content: &str) -> Result<Scenario> {
    let scenario: Scenario =
        serde_json::from_str(content).map_err(|e| WalkError::ScenarioParse(e.to_string()))?;
    scenario.validate()?;
    Ok(scenario)
}

/// Load a scenario file; the format follows the extension (`.toml` or `.json`)
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let scenario = match extension.as_deref() {
        Some("toml") => parse_scenario_toml(&content),
        Some("json") => parse_scenario_json(&content),
        _ => Err(WalkError::ScenarioParse(format!(
            "{}: unknown scenario format, expected .toml or .json",
            path.display()
        ))),
    }?;

    tracing::debug!(
        "Loaded {}D scenario from {}",
        scenario.dimensions,
        path.display()
    );
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::schema::{FeatureSpec, PortalSpec};
    use crate::world::resolve::SlowZonePolicy;

    const PLANAR_TOML: &str = r#"
dimensions = 2
walker_type = 3
num_steps = 250
num_walkers = 4
restart = true
seed = 42
traps = 1
slow_zone_policy = "passthrough"

obstacles = 2

[[portals]]
center = [5.0, 5.0]
length = 2.0
exit = [-5.0, -5.0]

[[portals]]
length = 3.5

[statistics]
num_runs = 10
step_counts = [100, 200]
"#;

    #[test]
    fn test_parse_toml() {
        let scenario = parse_scenario_toml(PLANAR_TOML).unwrap();
        assert_eq!(scenario.dimensions, 2);
        assert_eq!(scenario.num_steps, 250);
        assert!(scenario.restart);
        assert_eq!(scenario.seed, Some(42));
        assert_eq!(scenario.obstacles, FeatureSpec::Count(2));
        assert_eq!(scenario.slow_zone_policy, SlowZonePolicy::Passthrough);
        assert_eq!(
            scenario.portals,
            FeatureSpec::Explicit(vec![
                PortalSpec {
                    center: Some(vec![5.0, 5.0]),
                    length: Some(2.0),
                    exit: Some(vec![-5.0, -5.0]),
                },
                PortalSpec {
                    center: None,
                    length: Some(3.5),
                    exit: None,
                },
            ])
        );
        assert_eq!(scenario.statistics.unwrap().step_counts, vec![100, 200]);
    }

    #[test]
    fn test_parse_json_with_defaults() {
        let scenario = parse_scenario_json(r#"{"dimensions": 3, "walker_type": 5, "black_holes": 2}"#)
            .unwrap();
        assert_eq!(scenario.num_steps, 100);
        assert_eq!(scenario.num_walkers, 1);
        assert_eq!(scenario.black_holes, 2);
        assert_eq!(scenario.slow_zone_policy, SlowZonePolicy::StopWhenResident);
        assert!(scenario.portals.is_empty());
    }

    #[test]
    fn test_unknown_field_is_parse_error() {
        let err = parse_scenario_toml("dimensions = 2\nwalker_type = 1\nwarp_drives = 3\n").unwrap_err();
        assert!(matches!(err, WalkError::ScenarioParse(_)));
    }

    #[test]
    fn test_invalid_values_are_configuration_errors() {
        let err = parse_scenario_json(r#"{"dimensions": 2, "walker_type": 9}"#).unwrap_err();
        assert!(matches!(err, WalkError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_out_of_range_walker_codes_are_configuration_errors() {
        for code in ["300", "-1", "0"] {
            let toml = format!("dimensions = 2\nwalker_type = {}\n", code);
            let err = parse_scenario_toml(&toml).unwrap_err();
            assert!(matches!(err, WalkError::InvalidConfiguration(_)), "code {}", code);
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_scenario(Path::new("/nonexistent/scenario.toml")).unwrap_err();
        assert!(matches!(err, WalkError::IoError(_)));
    }
}
