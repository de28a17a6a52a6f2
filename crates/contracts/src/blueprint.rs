//! SonarBlueprint - Config Loader output
//!
//! Describes a complete run: the sensor, the simulated world around it and
//! the output routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{EmissionTopics, PixelFormat, PoseConfig, RenderSettings, ScanAxis, ScanLimits, Vec3};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SonarBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Sensor settings
    pub sensor: SonarConfig,

    /// Simulated world
    #[serde(default)]
    pub world: WorldConfig,

    /// Output routing
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

/// Sensor configuration, immutable after load
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SonarConfig {
    /// Sensor instance name
    #[serde(default = "default_sensor_name")]
    pub name: String,

    /// Child link carrying the sensor head
    pub link_reference: String,

    /// Upper sweep limit (radians, relative to the initial bearing)
    pub angle_max: f64,

    /// Lower sweep limit (radians, relative to the initial bearing)
    pub angle_min: f64,

    /// Sweep axis, encoded 0/1/2
    pub axis_rotation: ScanAxis,

    /// Angular velocity magnitude (rad/s)
    pub angular_velocity: f64,

    /// Static rotation applied to the render pose every frame (roll, pitch, yaw)
    #[serde(default)]
    pub local_rotation: Vec3,

    /// Publish rate (Hz), must be > 0
    pub update_rate: f64,

    /// Output topic, must be non-empty
    pub topic: String,

    /// Also publish the raw shader image
    #[serde(default)]
    pub debug: bool,

    /// Horizontal field of view (radians)
    pub hfov: f64,

    /// Vertical field of view (radians)
    pub vfov: f64,

    /// Clip range
    pub clip: ClipConfig,

    /// Rendered image
    pub image: ImageConfig,

    /// Range bins per beam
    pub bin_count: u32,

    /// Beams across the horizontal aperture
    pub beam_count: u32,
}

fn default_sensor_name() -> String {
    "msis_sonar".to_string()
}

/// Near/far clip distances (meters)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClipConfig {
    pub near: f64,
    pub far: f64,
}

/// Rendered image settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImageConfig {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub format: PixelFormat,
}

impl SonarConfig {
    pub fn limits(&self) -> ScanLimits {
        ScanLimits::new(self.angle_min, self.angle_max)
    }

    pub fn topics(&self) -> EmissionTopics {
        EmissionTopics::new(&self.topic, self.debug)
    }

    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            hfov: self.hfov,
            vfov: self.vfov,
            near_clip: self.clip.near,
            far_clip: self.clip.far,
            image_width: self.image.width,
            image_height: self.image.height,
            format: self.image.format,
            bin_count: self.bin_count,
            beam_count: self.beam_count,
        }
    }
}

/// Simulated world around the sensor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// World name used for scene lookup
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Physics step (seconds)
    #[serde(default = "default_step_size")]
    pub step_size: f64,

    /// Parent model pose in the world
    #[serde(default)]
    pub parent: PoseConfig,

    /// Initial pose of the mount link relative to the parent
    #[serde(default)]
    pub mount: PoseConfig,

    /// Reflecting targets in the scene
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

fn default_world_name() -> String {
    "default".to_string()
}

fn default_step_size() -> f64 {
    0.001
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            step_size: default_step_size(),
            parent: PoseConfig::default(),
            mount: PoseConfig::default(),
            targets: Vec::new(),
        }
    }
}

/// Spherical reflector
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Center in world coordinates (meters)
    pub position: Vec3,

    /// Radius (meters)
    pub radius: f64,

    /// Reflectivity in [0, 1]
    #[serde(default = "default_reflectivity")]
    pub reflectivity: f64,
}

fn default_reflectivity() -> f64 {
    1.0
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Log output
    Log,
    /// File output
    File,
}
