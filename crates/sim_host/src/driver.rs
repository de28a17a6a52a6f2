//! Fixed-step tick driver.

use contracts::{ContractError, SonarBlueprint, SonarConfig, SonarEmission, WorldContext};
use scan_engine::{BeamSample, MsisSonar, ScanError, SweepState};
use tracing::{info, instrument};

use crate::{SimModel, SyntheticBackend, SyntheticSonar};

/// Outcome of one simulation tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    /// Iteration the phases ran at
    pub iteration: u64,
    /// Simulation time the phases ran at (seconds)
    pub sim_time: f64,
    pub sample: BeamSample,
    pub reversal: Option<SweepState>,
    pub emission: Option<SonarEmission>,
}

/// Drives one sonar through pre_render, pose_update, render, post_render
/// and then advances the physics by one fixed step.
pub struct SimulationDriver {
    model: SimModel,
    backend: SyntheticBackend,
    world: WorldContext,
    step_size: f64,
    sonar: MsisSonar<SyntheticSonar>,
}

impl SimulationDriver {
    /// Build model, backend and sensor from a blueprint.
    pub fn from_blueprint(blueprint: &SonarBlueprint) -> Result<Self, ScanError> {
        let model = SimModel::from_world(&blueprint.world, &blueprint.sensor.link_reference);
        let backend = SyntheticBackend::from_world(&blueprint.world);
        Self::with_parts(
            &blueprint.sensor,
            blueprint.world.step_size,
            model,
            backend,
            WorldContext::new(blueprint.world.name.clone()),
        )
    }

    #[instrument(name = "simulation_driver_setup", skip_all, fields(world = %world.name, step_size = step_size))]
    pub fn with_parts(
        config: &SonarConfig,
        step_size: f64,
        model: SimModel,
        mut backend: SyntheticBackend,
        world: WorldContext,
    ) -> Result<Self, ScanError> {
        if !step_size.is_finite() || step_size <= 0.0 {
            return Err(ContractError::config_validation(
                "world.step_size",
                format!("must be > 0, got {step_size}"),
            )
            .into());
        }

        let sonar = MsisSonar::setup(config, &mut backend, &model, &world)?;
        info!(model = %model.name(), sensor = %sonar.name(), "Simulation ready");

        Ok(Self {
            model,
            backend,
            world,
            step_size,
            sonar,
        })
    }

    /// Run one tick.
    pub fn tick(&mut self) -> Result<TickReport, ScanError> {
        let iteration = self.world.iteration;
        let sim_time = self.world.sim_time;

        let sample = self.sonar.pre_render(&mut self.model)?;
        let reversal = self.sonar.pose_update(&mut self.model)?;
        self.sonar.render()?;
        let emission = self.sonar.post_render(&self.world)?;

        self.model.step(self.step_size);
        self.world.iteration += 1;
        self.world.sim_time = self.world.iteration as f64 * self.step_size;

        Ok(TickReport {
            iteration,
            sim_time,
            sample,
            reversal,
            emission,
        })
    }

    /// Tick until `duration` seconds of simulation time have elapsed.
    ///
    /// Returns the number of ticks run.
    pub fn run_for<F>(&mut self, duration: f64, mut on_tick: F) -> Result<u64, ScanError>
    where
        F: FnMut(&TickReport),
    {
        let ticks = (duration / self.step_size).round().max(0.0) as u64;
        for _ in 0..ticks {
            let report = self.tick()?;
            on_tick(&report);
        }
        Ok(ticks)
    }

    pub fn sonar(&self) -> &MsisSonar<SyntheticSonar> {
        &self.sonar
    }

    pub fn model(&self) -> &SimModel {
        &self.model
    }

    pub fn world(&self) -> &WorldContext {
        &self.world
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Release the sensor and hand back the backend.
    pub fn shutdown(self) -> SyntheticBackend {
        self.sonar.shutdown();
        self.backend
    }
}
