//! `run` command implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::load_blueprint;
use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let blueprint = load_blueprint(&args.config)?;

    info!(
        sensor = %blueprint.sensor.name,
        link = %blueprint.sensor.link_reference,
        world = %blueprint.world.name,
        targets = blueprint.world.targets.len(),
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        blueprint,
        duration: (args.duration > 0.0).then_some(args.duration),
        max_emissions: (args.max_emissions > 0).then_some(args.max_emissions),
        buffer_size: args.buffer_size,
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    };

    let stop = Arc::new(AtomicBool::new(false));
    let signal_stop = Arc::clone(&stop);
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        warn!("Received shutdown signal, stopping simulation...");
        signal_stop.store(true, Ordering::SeqCst);
    });

    info!("Starting simulation...");
    let stats = Pipeline::new(pipeline_config)
        .run(stop)
        .await
        .context("Simulation failed")?;

    info!(
        ticks = stats.ticks,
        emissions = stats.emissions,
        sim_time = stats.sim_time,
        wall_secs = stats.duration.as_secs_f64(),
        "Simulation completed"
    );
    stats.print_summary();

    info!("MSIS sonar finished");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::SonarBlueprint) {
    let s = &blueprint.sensor;
    println!("\n=== Configuration Summary ===\n");
    println!("Sensor: {} on link '{}'", s.name, s.link_reference);
    println!(
        "  Sweep: {:?} axis, [{:.4}, {:.4}] rad at {} rad/s",
        s.axis_rotation, s.angle_min, s.angle_max, s.angular_velocity
    );
    println!("  Rate: {} Hz, topic '{}'", s.update_rate, s.topic);
    println!(
        "  Image: {}x{}, {} beams x {} bins, clip {}..{} m",
        s.image.width, s.image.height, s.beam_count, s.bin_count, s.clip.near, s.clip.far
    );
    println!(
        "\nWorld: {} (step {} s, {} targets)",
        blueprint.world.name,
        blueprint.world.step_size,
        blueprint.world.targets.len()
    );

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
