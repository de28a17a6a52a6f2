//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::SonarBlueprint;
use tracing::info;

use super::load_blueprint;
use crate::cli::InfoArgs;

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let blueprint = load_blueprint(&args.config)?;

    if args.json {
        let json = config_loader::ConfigLoader::to_json(&blueprint)
            .context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint);
    }

    Ok(())
}

fn print_config_info(blueprint: &SonarBlueprint) {
    let sensor = &blueprint.sensor;
    let topics = sensor.topics();

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  MSIS Sonar Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📡 Sensor");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Name: {}", sensor.name);
    println!("   ├─ Link: {}", sensor.link_reference);
    println!(
        "   ├─ Sweep: {:?} axis in [{:.4}, {:.4}] rad",
        sensor.axis_rotation, sensor.angle_min, sensor.angle_max
    );
    println!("   ├─ Angular velocity: {} rad/s", sensor.angular_velocity);
    println!(
        "   ├─ Local rotation: ({}, {}, {})",
        sensor.local_rotation.x, sensor.local_rotation.y, sensor.local_rotation.z
    );
    println!("   ├─ Update rate: {} Hz", sensor.update_rate);
    println!("   ├─ Image topic: {}", topics.image);
    println!("   ├─ Range topic: {}", topics.returns);
    match &topics.shader {
        Some(shader) => println!("   └─ Shader topic: {}", shader),
        None => println!("   └─ Shader topic: disabled"),
    }

    println!("\n🎯 Rendering");
    println!(
        "   ├─ FOV: {:.3} x {:.3} rad",
        sensor.hfov, sensor.vfov
    );
    println!("   ├─ Clip: {} .. {} m", sensor.clip.near, sensor.clip.far);
    println!(
        "   ├─ Image: {}x{} ({:?})",
        sensor.image.width, sensor.image.height, sensor.image.format
    );
    println!(
        "   └─ Beams x bins: {} x {}",
        sensor.beam_count, sensor.bin_count
    );

    let world = &blueprint.world;
    println!("\n🌊 World");
    println!("   ├─ Name: {}", world.name);
    println!("   ├─ Step size: {} s", world.step_size);
    println!("   └─ Targets ({})", world.targets.len());
    for (i, target) in world.targets.iter().enumerate() {
        let prefix = if i == world.targets.len() - 1 { "└─" } else { "├─" };
        println!(
            "        {} ({}, {}, {}) r={} refl={}",
            prefix,
            target.position.x,
            target.position.y,
            target.position.z,
            target.radius,
            target.reflectivity
        );
    }

    if !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let prefix = if i == blueprint.sinks.len() - 1 { "└─" } else { "├─" };
            println!(
                "   {} {} ({:?}, queue {})",
                prefix, sink.name, sink.sink_type, sink.queue_capacity
            );
            for (key, value) in &sink.params {
                println!("        {} = {}", key, value);
            }
        }
    }

    println!();
}
