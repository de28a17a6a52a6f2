//! `validate` command implementation.

use std::f64::consts::PI;

use anyhow::{Context, Result};
use contracts::SonarBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    sensor: String,
    link: String,
    topic: String,
    world: String,
    target_count: usize,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    let invalid = |error: String| ValidationResult {
        valid: false,
        config_path: config_path.clone(),
        error: Some(error),
        warnings: None,
        summary: None,
    };

    if !args.config.exists() {
        return invalid(format!("File not found: {}", args.config.display()));
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path: config_path.clone(),
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    sensor: blueprint.sensor.name.clone(),
                    link: blueprint.sensor.link_reference.clone(),
                    topic: blueprint.sensor.topic.clone(),
                    world: blueprint.world.name.clone(),
                    target_count: blueprint.world.targets.len(),
                    sink_count: blueprint.sinks.len(),
                }),
            }
        }
        Err(e) => invalid(e.to_string()),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &SonarBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();
    let sensor = &blueprint.sensor;

    if sensor.angle_min > sensor.angle_max {
        warnings.push(format!(
            "angle_min ({}) is greater than angle_max ({}) - the head reverses every tick",
            sensor.angle_min, sensor.angle_max
        ));
    }

    if sensor.limits().is_degenerate() && sensor.angular_velocity != 0.0 {
        warnings.push(
            "angle_min equals angle_max with nonzero angular_velocity - the head never reverses"
                .to_string(),
        );
    }

    let rotation = &sensor.local_rotation;
    if [rotation.x, rotation.y, rotation.z]
        .iter()
        .any(|a| a.abs() > PI)
    {
        warnings.push("local_rotation has a component beyond ±π".to_string());
    }

    if blueprint.world.targets.is_empty() {
        warnings.push("No targets configured - every image will be empty".to_string());
    }

    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - emissions will be dropped".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Sensor: {} on '{}'", summary.sensor, summary.link);
            println!("  Topic: {}", summary.topic);
            println!("  World: {}", summary.world);
            println!("  Targets: {}", summary.target_count);
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_loader::{ConfigFormat, ConfigLoader};

    const BASE: &str = r#"
[sensor]
link_reference = "sonar_link"
angle_min = -1.0
angle_max = 1.0
axis_rotation = 2
angular_velocity = 0.2
update_rate = 10.0
topic = "/msis"
hfov = 0.785
vfov = 1.3
bin_count = 16
beam_count = 8

[sensor.clip]
near = 0.1
far = 10.0

[sensor.image]
width = 32
height = 16

[[world.targets]]
position = { x = 5.0, y = 0.0, z = 0.0 }
radius = 1.0

[[sinks]]
name = "log"
sink_type = "log"
"#;

    fn load(content: &str) -> SonarBlueprint {
        ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap()
    }

    #[test]
    fn test_clean_config_has_no_warnings() {
        assert!(collect_warnings(&load(BASE)).is_empty());
    }

    #[test]
    fn test_warns_on_degenerate_limits_with_motion() {
        let mut blueprint = load(BASE);
        blueprint.sensor.angle_min = 0.5;
        blueprint.sensor.angle_max = 0.5;
        let warnings = collect_warnings(&blueprint);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("never reverses"));
    }

    #[test]
    fn test_warns_on_inverted_limits_and_missing_sinks() {
        let mut blueprint = load(BASE);
        blueprint.sensor.angle_min = 1.0;
        blueprint.sensor.angle_max = -1.0;
        blueprint.sinks.clear();
        let warnings = collect_warnings(&blueprint);
        assert!(warnings.iter().any(|w| w.contains("greater than angle_max")));
        assert!(warnings.iter().any(|w| w.contains("No sinks")));
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let args = ValidateArgs {
            config: "/nonexistent/sonar.toml".into(),
            json: true,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }
}
