//! Pipeline orchestrator - ticks the simulation and feeds the dispatcher.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::SonarBlueprint;
use observability::SonarMetricsAggregator;
use sim_host::SimulationDriver;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::PipelineStats;
use crate::error::CliError;

/// Ticks between cooperative yields to the runtime
const YIELD_EVERY: u64 = 64;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Resolved run configuration
    pub blueprint: SonarBlueprint,

    /// Simulated seconds to run (None = until stopped)
    pub duration: Option<f64>,

    /// Maximum number of emissions (None = unlimited)
    pub max_emissions: Option<u64>,

    /// Channel buffer size
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until the duration or emission limit is reached, or `stop` is set
    pub async fn run(self, stop: Arc<AtomicBool>) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let mut driver = SimulationDriver::from_blueprint(blueprint)
            .map_err(|e| CliError::setup(e.to_string()))?;

        let (tx, rx) = mpsc::channel(self.config.buffer_size.max(1));
        let dispatcher = dispatcher::create_dispatcher(blueprint.sinks.clone(), rx)
            .context("Failed to create dispatcher")?;
        let dispatcher_handle = dispatcher.spawn();

        let tick_limit = self
            .config
            .duration
            .map(|d| (d / driver.step_size()).round().max(0.0) as u64);

        info!(
            tick_limit = ?tick_limit,
            max_emissions = ?self.config.max_emissions,
            sinks = blueprint.sinks.len(),
            "Pipeline started"
        );

        let mut sonar_metrics = SonarMetricsAggregator::new();
        let mut ticks = 0u64;
        let mut emissions = 0u64;
        let mut tick_error = None;

        loop {
            if stop.load(Ordering::SeqCst) {
                info!("Stop requested");
                break;
            }
            if tick_limit.is_some_and(|limit| ticks >= limit) {
                info!(ticks, "Reached duration limit");
                break;
            }
            if self.config.max_emissions.is_some_and(|max| emissions >= max) {
                info!(emissions, "Reached emission limit");
                break;
            }

            let report = match driver.tick() {
                Ok(report) => report,
                Err(e) => {
                    tick_error = Some(e);
                    break;
                }
            };
            ticks += 1;
            sonar_metrics.record_tick();

            if let Some(state) = report.reversal {
                sonar_metrics.record_reversal(state.as_str());
            }

            if let Some(emission) = report.emission {
                sonar_metrics.record_emission(&emission);
                emissions += 1;
                if tx.send(emission).await.is_err() {
                    warn!("Dispatcher closed, stopping simulation");
                    break;
                }
            }

            if ticks % YIELD_EVERY == 0 {
                tokio::task::yield_now().await;
            }
        }

        let sim_time = driver.world().sim_time;
        let backend = driver.shutdown();
        debug!(
            sonars_created = backend.sonars_created(),
            releases = backend.releases(),
            "Renderer released"
        );

        drop(tx);
        let sink_metrics = dispatcher_handle
            .await
            .context("Dispatcher task panicked")?;

        if let Some(e) = tick_error {
            return Err(e).context(format!("Tick {} failed", ticks));
        }

        Ok(PipelineStats {
            ticks,
            emissions,
            sim_time,
            duration: start_time.elapsed(),
            sink_metrics,
            sonar_metrics,
        })
    }
}
