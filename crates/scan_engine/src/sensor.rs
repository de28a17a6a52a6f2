//! Sensor lifecycle: setup and the four per-tick phases.

use contracts::{
    ContractError, EmissionTopics, LinkLookup, MountLink, RenderBackend, RenderSettings,
    SonarConfig, SonarEmission, SonarRenderer, WorldContext,
};
use tracing::{debug, error, info, instrument, trace, warn};

use crate::{
    AngleTracker, BeamRenderAdapter, BeamSample, RateLimiter, RendererLease, Result,
    ScanError, ScanMotionController, SonarImageCompositor, SweepState,
};

/// Far clip applied before `load`; `load` then installs the configured one.
pub const DEFAULT_FAR_CLIP: f64 = 100.0;

/// Name of the off-screen target allocated at setup.
pub const TEXTURE_NAME: &str = "GPUTexture";

const SETTING_TOLERANCE: f64 = 1e-9;

/// Per-tick phases, in the order the host must drive them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    PreRender,
    PoseUpdate,
    Render,
    PostRender,
}

impl TickPhase {
    fn next(self) -> Self {
        match self {
            TickPhase::PreRender => TickPhase::PoseUpdate,
            TickPhase::PoseUpdate => TickPhase::Render,
            TickPhase::Render => TickPhase::PostRender,
            TickPhase::PostRender => TickPhase::PreRender,
        }
    }
}

/// Mechanically scanning imaging sonar bound to one link and one renderer.
pub struct MsisSonar<R: SonarRenderer> {
    name: String,
    link_name: String,
    topics: EmissionTopics,
    debug: bool,
    renderer: RendererLease<R>,
    adapter: BeamRenderAdapter,
    motion: ScanMotionController,
    limiter: RateLimiter,
    compositor: SonarImageCompositor,
    displacement: f64,
    bearing: f64,
    next_phase: TickPhase,
    sequence: u64,
}

impl<R: SonarRenderer> MsisSonar<R> {
    /// Bind the sensor to its link and acquire a renderer.
    ///
    /// The renderer is held by a [`RendererLease`] from the moment the
    /// backend creates it, so any failure after that point releases it.
    ///
    /// # Errors
    /// - `RendererUnavailable` when the backend is disabled
    /// - `LinkNotFound` when `link_reference` does not resolve
    /// - `ConfigValidation` for an empty topic or non-positive update rate
    /// - `Renderer` when a setup call fails or the renderer reports settings
    ///   other than the configured ones
    #[instrument(
        name = "msis_sonar_setup",
        skip_all,
        fields(sensor = %config.name, link = %config.link_reference)
    )]
    pub fn setup<B, M>(
        config: &SonarConfig,
        backend: &mut B,
        model: &M,
        world: &WorldContext,
    ) -> Result<Self>
    where
        B: RenderBackend<Renderer = R>,
        M: LinkLookup,
    {
        if !backend.is_enabled() {
            return Err(ContractError::renderer_unavailable(
                "rendering is disabled for this process",
            )
            .into());
        }

        let link = model
            .link(&config.link_reference)
            .ok_or_else(|| ContractError::link_not_found(&config.link_reference))?;

        if config.topic.trim().is_empty() {
            return Err(
                ContractError::config_validation("sensor.topic", "topic name is not set").into(),
            );
        }

        let tracker = AngleTracker::new(config.axis_rotation);
        let initial_bearing = tracker.angle(&link.relative_pose());
        let limiter = RateLimiter::new(config.update_rate, world.sim_time)?;

        let scene = match backend.scene(&world.name) {
            Some(scene) => {
                debug!(scene_id = scene.id, world = %world.name, "Reusing existing scene");
                scene
            }
            None => {
                let scene = backend.create_scene(&world.name)?;
                info!(scene_id = scene.id, world = %world.name, "Created scene");
                scene
            }
        };

        let mut renderer = RendererLease::new(backend.create_sonar(&config.name, &scene)?);
        renderer.set_far_clip(DEFAULT_FAR_CLIP);
        renderer.init()?;

        let settings = config.render_settings();
        renderer.load(&settings)?;
        renderer.create_texture(TEXTURE_NAME)?;
        verify_settings(&*renderer, &settings)?;

        let limits = config.limits();
        if limits.is_degenerate() && config.angular_velocity != 0.0 {
            warn!(
                angle = limits.angle_max,
                angular_velocity = config.angular_velocity,
                "Scan limits are equal; velocity will never reverse"
            );
        }

        info!(
            initial_bearing,
            axis = ?config.axis_rotation,
            angle_min = limits.angle_min,
            angle_max = limits.angle_max,
            update_rate = config.update_rate,
            "Sonar ready"
        );

        Ok(Self {
            name: config.name.clone(),
            link_name: config.link_reference.clone(),
            topics: config.topics(),
            debug: config.debug,
            renderer,
            adapter: BeamRenderAdapter::new(
                tracker,
                config.local_rotation.into(),
                initial_bearing,
            ),
            motion: ScanMotionController::new(
                config.axis_rotation,
                limits,
                config.angular_velocity,
            ),
            limiter,
            compositor: SonarImageCompositor::new(),
            displacement: 0.0,
            bearing: initial_bearing,
            next_phase: TickPhase::PreRender,
            sequence: 0,
        })
    }

    /// Position the beam and refresh the displacement.
    #[instrument(level = "trace", name = "msis_sonar_pre_render", skip_all)]
    pub fn pre_render<M: LinkLookup>(&mut self, model: &mut M) -> Result<BeamSample> {
        self.enter(TickPhase::PreRender)?;

        let link = model
            .link_mut(&self.link_name)
            .ok_or_else(|| ContractError::link_not_found(&self.link_name))?;
        let sample = self.adapter.render_bearing(link, &mut *self.renderer)?;

        self.displacement = sample.displacement;
        self.bearing = sample.bearing;
        observability::record_bearing(&self.name, sample.bearing, sample.displacement);

        self.advance();
        Ok(sample)
    }

    /// Apply the sweep rule and command the link's angular velocity.
    #[instrument(level = "trace", name = "msis_sonar_pose_update", skip_all)]
    pub fn pose_update<M: LinkLookup>(&mut self, model: &mut M) -> Result<Option<SweepState>> {
        self.enter(TickPhase::PoseUpdate)?;

        let link = model
            .link_mut(&self.link_name)
            .ok_or_else(|| ContractError::link_not_found(&self.link_name))?;
        let transition = self.motion.step(self.displacement, link);

        if let Some(state) = transition {
            observability::record_sweep_reversal(&self.name, state.as_str());
        }

        self.advance();
        Ok(transition)
    }

    /// Execute the draw.
    pub fn render(&mut self) -> Result<()> {
        self.enter(TickPhase::Render)?;
        if self.debug {
            debug!(link = %self.link_name, "Rendering sonar beam");
        }
        self.renderer.render();
        self.advance();
        Ok(())
    }

    /// Emit when the rate limiter allows it.
    ///
    /// Renderer read-back only happens on emitting ticks.
    #[instrument(
        level = "trace",
        name = "msis_sonar_post_render",
        skip_all,
        fields(sim_time = world.sim_time)
    )]
    pub fn post_render(&mut self, world: &WorldContext) -> Result<Option<SonarEmission>> {
        self.enter(TickPhase::PostRender)?;
        self.advance();

        if !self.limiter.poll(world.sim_time) {
            observability::record_tick_skipped(&self.name);
            return Ok(None);
        }

        self.renderer.post_render();
        let composite = self
            .compositor
            .compose(&*self.renderer, world, self.displacement, self.debug)
            .inspect_err(|e| error!(sensor = %self.name, error = %e, "Composite failed"))?;

        self.sequence += 1;
        observability::record_emission(&self.name, composite.valid_fraction);
        trace!(
            sensor = %self.name,
            sequence = self.sequence,
            displacement = self.displacement,
            valid_fraction = composite.valid_fraction,
            "Emitting sonar image"
        );

        Ok(Some(SonarEmission {
            sequence: self.sequence,
            stamp: world.sim_time,
            sensor: self.name.clone(),
            topics: self.topics.clone(),
            image: composite.image,
            sonar_return: composite.sonar_return,
            shader: composite.shader,
            valid_fraction: composite.valid_fraction,
        }))
    }

    /// Release the renderer.
    pub fn shutdown(mut self) {
        self.renderer.release();
        info!(sensor = %self.name, emissions = self.sequence, "Sonar shut down");
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn link_name(&self) -> &str {
        &self.link_name
    }

    pub fn topics(&self) -> &EmissionTopics {
        &self.topics
    }

    /// Absolute bearing measured at the last `pre_render`.
    pub fn bearing(&self) -> f64 {
        self.bearing
    }

    /// Displacement from the initial bearing measured at the last `pre_render`.
    pub fn displacement(&self) -> f64 {
        self.displacement
    }

    pub fn initial_bearing(&self) -> f64 {
        self.adapter.initial_bearing()
    }

    /// Currently commanded signed angular velocity.
    pub fn angular_velocity(&self) -> f64 {
        self.motion.angular_velocity()
    }

    pub fn sweep_state(&self) -> SweepState {
        self.motion.state()
    }

    /// Phase the sensor expects next.
    pub fn phase(&self) -> TickPhase {
        self.next_phase
    }

    /// Emissions produced so far.
    pub fn emissions(&self) -> u64 {
        self.sequence
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn enter(&self, actual: TickPhase) -> Result<()> {
        if self.next_phase != actual {
            error!(
                sensor = %self.name,
                expected = ?self.next_phase,
                actual = ?actual,
                "Tick phase out of order"
            );
            return Err(ScanError::PhaseOrder {
                expected: self.next_phase,
                actual,
            });
        }
        Ok(())
    }

    fn advance(&mut self) {
        self.next_phase = self.next_phase.next();
    }
}

fn verify_settings<R: SonarRenderer + ?Sized>(
    renderer: &R,
    settings: &RenderSettings,
) -> std::result::Result<(), ContractError> {
    let float_checks = [
        ("far_clip", settings.far_clip, renderer.far_clip()),
        ("near_clip", settings.near_clip, renderer.near_clip()),
        ("vfov", settings.vfov, renderer.vert_fov()),
    ];
    for (setting, configured, reported) in float_checks {
        if (configured - reported).abs() > SETTING_TOLERANCE {
            return Err(ContractError::renderer(format!(
                "{setting} mismatch: configured {configured}, renderer reports {reported}"
            )));
        }
    }

    let int_checks = [
        ("image_width", settings.image_width, renderer.image_width()),
        ("image_height", settings.image_height, renderer.image_height()),
        ("bin_count", settings.bin_count, renderer.bin_count()),
        ("beam_count", settings.beam_count, renderer.beam_count()),
    ];
    for (setting, configured, reported) in int_checks {
        if configured != reported {
            return Err(ContractError::renderer(format!(
                "{setting} mismatch: configured {configured}, renderer reports {reported}"
            )));
        }
    }

    Ok(())
}
