//! External renderer contracts.
//!
//! The renderer is opaque: given a world pose it draws one beam, folds each
//! completed beam into an accumulated polar image at its scan displacement,
//! and exposes that image as a normalized intensity grid plus a validity
//! mask, alongside a diagnostic shader image and the structured return.
//! Scene rasterization itself is out of scope here.

use serde::{Deserialize, Serialize};

use crate::{ContractError, Grid, MountPose, ShaderFrame, SonarReturn, WorldContext};

/// Settings applied by [`SonarRenderer::load`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub hfov: f64,
    pub vfov: f64,
    pub near_clip: f64,
    pub far_clip: f64,
    pub image_width: u32,
    pub image_height: u32,
    pub format: PixelFormat,
    pub bin_count: u32,
    pub beam_count: u32,
}

/// Off-screen target pixel format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    #[default]
    R8g8b8,
    L8,
}

/// Handle to a scene owned by a [`RenderBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneHandle {
    pub id: u32,
    pub world: String,
}

/// Per-sensor renderer instance.
pub trait SonarRenderer: Send {
    /// Instance name
    fn name(&self) -> &str;

    /// Override the far clip before `load`
    fn set_far_clip(&mut self, far: f64);

    /// One-time GPU resource allocation
    fn init(&mut self) -> Result<(), ContractError>;

    /// Apply field of view / clip / image settings
    fn load(&mut self, settings: &RenderSettings) -> Result<(), ContractError>;

    /// Allocate an off-screen target
    fn create_texture(&mut self, name: &str) -> Result<(), ContractError>;

    /// Position the virtual beam for one bearing
    fn pre_render(&mut self, world_pose: &MountPose) -> Result<(), ContractError>;

    /// Fold the most recent completed draw into the accumulated image at
    /// `displacement` (radians from the initial bearing)
    fn accumulate(&mut self, displacement: f64) -> Result<(), ContractError>;

    /// Execute the draw
    fn render(&mut self);

    /// Finalize buffers for read-back
    fn post_render(&mut self);

    /// Accumulated normalized intensity grid
    fn sonar_image(&self) -> Grid<f32>;

    /// Accumulated validity mask
    fn sonar_mask(&self) -> Grid<bool>;

    /// Raw diagnostic output
    fn shader_image(&self) -> ShaderFrame;

    /// Structured return of the latest beam at the given scan displacement
    fn sonar_return(&self, world: &WorldContext, bearing: f64) -> SonarReturn;

    fn far_clip(&self) -> f64;

    fn near_clip(&self) -> f64;

    fn image_width(&self) -> u32;

    fn image_height(&self) -> u32;

    fn bin_count(&self) -> u32;

    fn beam_count(&self) -> u32;

    fn vert_fov(&self) -> f64;

    /// Release textures and scene references; must be idempotent
    fn release(&mut self);
}

/// Process-wide rendering engine, passed explicitly into sensor setup.
pub trait RenderBackend {
    type Renderer: SonarRenderer;

    /// False when rendering is disabled for this process
    fn is_enabled(&self) -> bool;

    /// Existing scene for `world`, if any
    fn scene(&self, world: &str) -> Option<SceneHandle>;

    /// Create a scene for `world`
    fn create_scene(&mut self, world: &str) -> Result<SceneHandle, ContractError>;

    /// Create a renderer bound to `scene`
    fn create_sonar(
        &mut self,
        name: &str,
        scene: &SceneHandle,
    ) -> Result<Self::Renderer, ContractError>;
}
