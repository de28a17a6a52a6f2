//! In-crate test doubles for the link and renderer contracts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use contracts::{
    ContractError, Grid, LinkLookup, MountLink, MountPose, PixelFormat, RenderBackend,
    RenderSettings, SceneHandle, ShaderFrame, SonarRenderer, SonarReturn, WorldContext,
};
use nalgebra::Vector3;

pub(crate) struct StubLink {
    pub name: String,
    pub pose: MountPose,
    pub parent: MountPose,
    pub angular_velocity: Vector3<f64>,
}

impl StubLink {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pose: MountPose::identity(),
            parent: MountPose::identity(),
            angular_velocity: Vector3::zeros(),
        }
    }
}

impl MountLink for StubLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn relative_pose(&self) -> MountPose {
        self.pose
    }

    fn set_relative_pose(&mut self, pose: MountPose) {
        self.pose = pose;
    }

    fn world_pose(&self) -> MountPose {
        self.parent.compose(&self.pose)
    }

    fn set_angular_velocity(&mut self, omega: Vector3<f64>) {
        self.angular_velocity = omega;
    }
}

pub(crate) struct StubModel {
    pub links: Vec<StubLink>,
}

impl StubModel {
    pub fn with_link(name: &str) -> Self {
        Self {
            links: vec![StubLink::new(name)],
        }
    }
}

impl LinkLookup for StubModel {
    type Link = StubLink;

    fn link(&self, name: &str) -> Option<&StubLink> {
        self.links.iter().find(|l| l.name == name)
    }

    fn link_mut(&mut self, name: &str) -> Option<&mut StubLink> {
        self.links.iter_mut().find(|l| l.name == name)
    }
}

pub(crate) struct StubRenderer {
    pub name: String,
    pub intensity: Grid<f32>,
    pub mask: Grid<bool>,
    pub settings: RenderSettings,
    pub pre_render_poses: Vec<MountPose>,
    pub accumulated: Vec<f64>,
    pub renders: usize,
    pub post_renders: usize,
    pub fail_pre_render: bool,
    pub fail_texture: bool,
    pub misreport_far_clip: Option<f64>,
    pub releases: Arc<AtomicUsize>,
}

impl StubRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            name: "stub".to_string(),
            intensity: Grid::filled(width, height, 0.5),
            mask: Grid::filled(width, height, true),
            settings: RenderSettings {
                hfov: 0.5,
                vfov: 0.1,
                near_clip: 0.1,
                far_clip: 10.0,
                image_width: width,
                image_height: height,
                format: PixelFormat::R8g8b8,
                bin_count: 3,
                beam_count: 2,
            },
            pre_render_poses: Vec::new(),
            accumulated: Vec::new(),
            renders: 0,
            post_renders: 0,
            fail_pre_render: false,
            fail_texture: false,
            misreport_far_clip: None,
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl SonarRenderer for StubRenderer {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_far_clip(&mut self, far: f64) {
        self.settings.far_clip = far;
    }

    fn init(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    fn load(&mut self, settings: &RenderSettings) -> Result<(), ContractError> {
        self.settings = settings.clone();
        self.intensity = Grid::filled(settings.image_width, settings.image_height, 0.5);
        self.mask = Grid::filled(settings.image_width, settings.image_height, true);
        Ok(())
    }

    fn create_texture(&mut self, _name: &str) -> Result<(), ContractError> {
        if self.fail_texture {
            return Err(ContractError::renderer("texture allocation failed"));
        }
        Ok(())
    }

    fn pre_render(&mut self, world_pose: &MountPose) -> Result<(), ContractError> {
        if self.fail_pre_render {
            return Err(ContractError::renderer("pre_render failed"));
        }
        self.pre_render_poses.push(*world_pose);
        Ok(())
    }

    fn accumulate(&mut self, displacement: f64) -> Result<(), ContractError> {
        self.accumulated.push(displacement);
        Ok(())
    }

    fn render(&mut self) {
        self.renders += 1;
    }

    fn post_render(&mut self) {
        self.post_renders += 1;
    }

    fn sonar_image(&self) -> Grid<f32> {
        self.intensity.clone()
    }

    fn sonar_mask(&self) -> Grid<bool> {
        self.mask.clone()
    }

    fn shader_image(&self) -> ShaderFrame {
        Grid::filled(self.intensity.width(), self.intensity.height(), [0.5, 0.25, 0.0])
    }

    fn sonar_return(&self, world: &WorldContext, bearing: f64) -> SonarReturn {
        let s = &self.settings;
        SonarReturn {
            stamp: world.sim_time,
            bearing,
            beam_count: s.beam_count,
            bin_count: s.bin_count,
            hfov: s.hfov,
            range_min: s.near_clip,
            range_max: s.far_clip,
            intensities: vec![0.0; (s.beam_count * s.bin_count) as usize],
        }
    }

    fn far_clip(&self) -> f64 {
        self.misreport_far_clip.unwrap_or(self.settings.far_clip)
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
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub(crate) struct StubBackend {
    pub disabled: bool,
    pub scenes: Vec<SceneHandle>,
    pub scenes_created: usize,
    pub fail_texture: bool,
    pub misreport_far_clip: Option<f64>,
    pub releases: Arc<AtomicUsize>,
}

impl RenderBackend for StubBackend {
    type Renderer = StubRenderer;

    fn is_enabled(&self) -> bool {
        !self.disabled
    }

    fn scene(&self, world: &str) -> Option<SceneHandle> {
        self.scenes.iter().find(|s| s.world == world).cloned()
    }

    fn create_scene(&mut self, world: &str) -> Result<SceneHandle, ContractError> {
        let handle = SceneHandle {
            id: self.scenes.len() as u32,
            world: world.to_string(),
        };
        self.scenes.push(handle.clone());
        self.scenes_created += 1;
        Ok(handle)
    }

    fn create_sonar(
        &mut self,
        name: &str,
        _scene: &SceneHandle,
    ) -> Result<StubRenderer, ContractError> {
        let mut renderer = StubRenderer::new(1, 1);
        renderer.name = name.to_string();
        renderer.fail_texture = self.fail_texture;
        renderer.misreport_far_clip = self.misreport_far_clip;
        renderer.releases = self.releases.clone();
        Ok(renderer)
    }
}
