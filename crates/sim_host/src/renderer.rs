//! 合成声呐渲染器：对球体目标做逐列光线投射

use std::f64::consts::{PI, TAU};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use contracts::{
    ContractError, Grid, MountPose, RenderSettings, SceneHandle, ShaderFrame, SonarRenderer,
    SonarReturn, TargetConfig, WorldContext,
};
use nalgebra::Vector3;
use tracing::{debug, trace};

use crate::SyntheticFailures;

/// Spherical reflector in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vector3<f64>,
    pub radius: f64,
    pub reflectivity: f64,
}

impl From<&TargetConfig> for Sphere {
    fn from(target: &TargetConfig) -> Self {
        Self {
            center: target.position.into(),
            radius: target.radius,
            reflectivity: target.reflectivity.clamp(0.0, 1.0),
        }
    }
}

/// Entry/exit along a ray and the echo strength at entry.
#[derive(Debug, Clone, Copy)]
struct Hit {
    enter: f64,
    exit: f64,
    strength: f64,
}

impl Sphere {
    fn intersect(&self, origin: &Vector3<f64>, dir: &Vector3<f64>) -> Option<Hit> {
        let oc = origin - self.center;
        let b = oc.dot(dir);
        let c = oc.dot(&oc) - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        let exit = -b + sq;
        if exit < 0.0 {
            return None;
        }
        let enter = (-b - sq).max(0.0);
        let normal = (origin + dir * enter - self.center) / self.radius;
        let incidence = (-normal.dot(dir)).max(0.0);
        Some(Hit {
            enter,
            exit,
            strength: self.reflectivity * incidence,
        })
    }
}

/// Read-back buffers of one draw.
#[derive(Debug, Clone)]
struct Frame {
    intensity: Grid<f32>,
    mask: Grid<bool>,
    shader: ShaderFrame,
    returns: Vec<f32>,
}

impl Frame {
    fn empty(settings: &RenderSettings) -> Self {
        let (w, h) = (settings.image_width, settings.image_height);
        Self {
            intensity: Grid::filled(w, h, 0.0),
            mask: Grid::filled(w, h, false),
            shader: Grid::filled(w, h, [0.0; 3]),
            returns: vec![0.0; settings.beam_count as usize * settings.bin_count as usize],
        }
    }
}

/// Beams folded together over the sweep.
///
/// Columns cover one full revolution of scan displacement starting at `-π`;
/// rows span near to far clip like a single draw.
#[derive(Debug, Clone)]
struct PolarImage {
    intensity: Grid<f32>,
    mask: Grid<bool>,
    shader: ShaderFrame,
}

impl PolarImage {
    fn empty(settings: &RenderSettings) -> Self {
        let (w, h) = (settings.image_width, settings.image_height);
        Self {
            intensity: Grid::filled(w, h, 0.0),
            mask: Grid::filled(w, h, false),
            shader: Grid::filled(w, h, [0.0; 3]),
        }
    }

    /// Column holding `bearing` (radians, any winding).
    fn column(&self, bearing: f64) -> u32 {
        let width = self.intensity.width();
        let wrapped = (bearing + PI).rem_euclid(TAU);
        ((wrapped / TAU * f64::from(width)) as u32).min(width.saturating_sub(1))
    }

    fn column_center(&self, index: u32) -> f64 {
        -PI + TAU * (f64::from(index) + 0.5) / f64::from(self.intensity.width())
    }

    /// Overwrite every column whose center falls inside the aperture of
    /// `frame` when pointed at `displacement`, plus the column holding
    /// `displacement` itself.
    ///
    /// Each written column copies the draw column nearest its center, invalid
    /// rows included, so a revisited bearing is always refreshed.
    fn fold(&mut self, frame: &Frame, displacement: f64, hfov: f64) {
        let draw_width = frame.intensity.width();
        if draw_width == 0 || self.intensity.width() == 0 || hfov <= 0.0 {
            return;
        }
        let height = self.intensity.height().min(frame.intensity.height());
        let half = hfov / 2.0;
        let home = self.column(displacement);

        for column in 0..self.intensity.width() {
            let offset = (self.column_center(column) - displacement + PI).rem_euclid(TAU) - PI;
            // Apertures narrower than a column still land in their own column
            if offset.abs() > half && column != home {
                continue;
            }
            let offset = offset.clamp(-half, half);
            let x = (((offset + half) / hfov * f64::from(draw_width)) as u32).min(draw_width - 1);
            for y in 0..height {
                let valid = frame.mask.get(x, y).copied().unwrap_or(false);
                let (value, px) = if valid {
                    (
                        frame.intensity.get(x, y).copied().unwrap_or(0.0),
                        frame.shader.get(x, y).copied().unwrap_or([0.0; 3]),
                    )
                } else {
                    (0.0, [0.0; 3])
                };
                self.intensity.set(column, y, value);
                self.mask.set(column, y, valid);
                self.shader.set(column, y, px);
            }
        }
    }
}

/// Ray-casting sonar over a fixed set of spheres.
///
/// One draw covers the horizontal aperture with `image_width` columns and
/// near to far clip with `image_height` rows. `accumulate` folds the latest
/// draw into a polar image at the scan displacement; `post_render` makes the
/// polar image and the latest returns readable.
pub struct SyntheticSonar {
    name: String,
    scene: SceneHandle,
    targets: Arc<Vec<Sphere>>,
    failures: SyntheticFailures,
    releases: Arc<AtomicUsize>,
    settings: RenderSettings,
    initialized: bool,
    loaded: bool,
    texture: Option<String>,
    released: bool,
    pose: Option<MountPose>,
    pending: Option<Frame>,
    latest_returns: Vec<f32>,
    polar: PolarImage,
    front: Frame,
    draws: u64,
    folds: u64,
}

impl SyntheticSonar {
    pub(crate) fn new(
        name: &str,
        scene: SceneHandle,
        targets: Arc<Vec<Sphere>>,
        failures: SyntheticFailures,
        releases: Arc<AtomicUsize>,
    ) -> Self {
        let settings = RenderSettings {
            hfov: 0.0,
            vfov: 0.0,
            near_clip: 0.0,
            far_clip: 0.0,
            image_width: 0,
            image_height: 0,
            format: Default::default(),
            bin_count: 0,
            beam_count: 0,
        };
        let front = Frame::empty(&settings);
        let polar = PolarImage::empty(&settings);
        Self {
            name: name.to_string(),
            scene,
            targets,
            failures,
            releases,
            settings,
            initialized: false,
            loaded: false,
            texture: None,
            released: false,
            pose: None,
            pending: None,
            latest_returns: Vec::new(),
            polar,
            front,
            draws: 0,
            folds: 0,
        }
    }

    pub fn scene(&self) -> &SceneHandle {
        &self.scene
    }

    pub fn texture(&self) -> Option<&str> {
        self.texture.as_deref()
    }

    /// World pose handed in by the last `pre_render`.
    pub fn last_pose(&self) -> Option<MountPose> {
        self.pose
    }

    /// Completed draws.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Draws folded into the polar image.
    pub fn folds(&self) -> u64 {
        self.folds
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn nearest_hit(&self, pose: &MountPose, bearing: f64) -> Option<Hit> {
        let dir = pose.rotation * Vector3::new(bearing.cos(), bearing.sin(), 0.0);
        self.targets
            .iter()
            .filter_map(|s| s.intersect(&pose.position, &dir))
            .min_by(|a, b| a.enter.total_cmp(&b.enter))
    }

    /// Bearing of column `index` out of `count` across the aperture.
    fn column_bearing(&self, index: u32, count: u32) -> f64 {
        let hfov = self.settings.hfov;
        -hfov / 2.0 + hfov * (f64::from(index) + 0.5) / f64::from(count)
    }

    fn row_range(&self, index: u32, count: u32) -> f64 {
        let (near, far) = (self.settings.near_clip, self.settings.far_clip);
        near + (far - near) * (f64::from(index) + 0.5) / f64::from(count)
    }

    fn draw(&self, pose: &MountPose) -> Frame {
        let s = &self.settings;
        let mut frame = Frame::empty(s);
        let span = (s.far_clip - s.near_clip).max(f64::EPSILON);

        for x in 0..s.image_width {
            let Some(hit) = self.nearest_hit(pose, self.column_bearing(x, s.image_width)) else {
                continue;
            };
            for y in 0..s.image_height {
                let range = self.row_range(y, s.image_height);
                if range < hit.enter || range > hit.exit {
                    continue;
                }
                frame.intensity.set(x, y, hit.strength as f32);
                frame.mask.set(x, y, true);
                let normalized = ((range - s.near_clip) / span) as f32;
                frame.shader.set(x, y, [hit.strength as f32, normalized, 0.0]);
            }
        }

        for beam in 0..s.beam_count {
            let Some(hit) = self.nearest_hit(pose, self.column_bearing(beam, s.beam_count)) else {
                continue;
            };
            for bin in 0..s.bin_count {
                let range = self.row_range(bin, s.bin_count);
                if range < hit.enter || range > hit.exit {
                    continue;
                }
                // Two-way spherical spreading, left unnormalized
                let echo = hit.strength / (range * range).max(f64::EPSILON);
                frame.returns[beam as usize * s.bin_count as usize + bin as usize] = echo as f32;
            }
        }

        frame
    }

    fn ensure_loaded(&self) -> Result<(), ContractError> {
        if self.released {
            return Err(ContractError::renderer(format!(
                "renderer '{}' already released",
                self.name
            )));
        }
        if !self.loaded || self.texture.is_none() {
            return Err(ContractError::renderer(format!(
                "renderer '{}' used before load/create_texture",
                self.name
            )));
        }
        Ok(())
    }
}

impl SonarRenderer for SyntheticSonar {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_far_clip(&mut self, far: f64) {
        self.settings.far_clip = far;
    }

    fn init(&mut self) -> Result<(), ContractError> {
        if self.failures.fail_init {
            return Err(ContractError::renderer("injected init failure"));
        }
        self.initialized = true;
        Ok(())
    }

    fn load(&mut self, settings: &RenderSettings) -> Result<(), ContractError> {
        if !self.initialized {
            return Err(ContractError::renderer("load called before init"));
        }
        if self.failures.fail_load {
            return Err(ContractError::renderer("injected load failure"));
        }
        self.settings = settings.clone();
        self.front = Frame::empty(&self.settings);
        self.polar = PolarImage::empty(&self.settings);
        self.latest_returns = self.front.returns.clone();
        self.loaded = true;
        Ok(())
    }

    fn create_texture(&mut self, name: &str) -> Result<(), ContractError> {
        if self.failures.fail_texture {
            return Err(ContractError::renderer("injected texture failure"));
        }
        debug!(renderer = %self.name, texture = name, "Texture created");
        self.texture = Some(name.to_string());
        Ok(())
    }

    fn pre_render(&mut self, world_pose: &MountPose) -> Result<(), ContractError> {
        self.ensure_loaded()?;
        self.pose = Some(*world_pose);
        Ok(())
    }

    fn accumulate(&mut self, displacement: f64) -> Result<(), ContractError> {
        self.ensure_loaded()?;
        let Some(frame) = self.pending.take() else {
            return Ok(());
        };
        self.polar.fold(&frame, displacement, self.settings.hfov);
        self.folds += 1;
        trace!(renderer = %self.name, displacement, folds = self.folds, "Beam accumulated");
        Ok(())
    }

    fn render(&mut self) {
        if let Some(pose) = self.pose {
            let frame = self.draw(&pose);
            self.latest_returns = frame.returns.clone();
            self.pending = Some(frame);
            self.draws += 1;
            trace!(renderer = %self.name, draws = self.draws, "Drawn");
        }
    }

    fn post_render(&mut self) {
        self.front = Frame {
            intensity: self.polar.intensity.clone(),
            mask: self.polar.mask.clone(),
            shader: self.polar.shader.clone(),
            returns: self.latest_returns.clone(),
        };
    }

    fn sonar_image(&self) -> Grid<f32> {
        self.front.intensity.clone()
    }

    fn sonar_mask(&self) -> Grid<bool> {
        self.front.mask.clone()
    }

    fn shader_image(&self) -> ShaderFrame {
        self.front.shader.clone()
    }

    fn sonar_return(&self, world: &WorldContext, bearing: f64) -> SonarReturn {
        let s = &self.settings;
        let half_bin = (s.far_clip - s.near_clip) / (2.0 * f64::from(s.bin_count.max(1)));
        SonarReturn {
            stamp: world.sim_time,
            bearing,
            beam_count: s.beam_count,
            bin_count: s.bin_count,
            hfov: s.hfov,
            range_min: s.near_clip + half_bin,
            range_max: s.far_clip - half_bin,
            intensities: self.front.returns.clone(),
        }
    }

    fn far_clip(&self) -> f64 {
        self.failures
            .misreport_far_clip
            .unwrap_or(self.settings.far_clip)
    }

    fn near_clip(&self) -> f64 {
        self.settings.near_clip
    }

    fn image_width(&self) -> u32 {
        self.settings.image_width
    }

    fn image_height(&self) -> u32 {
        self.settings.image_height
    }

    fn bin_count(&self) -> u32 {
        self.settings.bin_count
    }

    fn beam_count(&self) -> u32 {
        self.settings.beam_count
    }

    fn vert_fov(&self) -> f64 {
        self.settings.vfov
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.texture = None;
        self.pending = None;
        self.releases.fetch_add(1, Ordering::SeqCst);
        debug!(renderer = %self.name, scene_id = self.scene.id, "Renderer released");
    }
}
