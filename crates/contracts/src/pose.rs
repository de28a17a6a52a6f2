//! MountPose - 6-DOF pose of the link carrying the sensor.

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Position and orientation of a rigid link relative to its parent.
///
/// The orientation is stored as a unit quaternion; roll/pitch/yaw views are
/// derived on demand, so writing a pose from Euler angles and reading it
/// back normalizes the angles into the quaternion's own range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MountPose {
    /// Translation, meters
    pub position: Vector3<f64>,
    /// Orientation
    pub rotation: UnitQuaternion<f64>,
}

impl Default for MountPose {
    fn default() -> Self {
        Self::identity()
    }
}

impl MountPose {
    /// Origin, no rotation.
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Build a pose from a position and roll/pitch/yaw (radians).
    pub fn from_rpy(position: Vector3<f64>, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::from_euler_angles(roll, pitch, yaw),
        }
    }

    /// `(roll, pitch, yaw)` of the orientation.
    pub fn rpy(&self) -> (f64, f64, f64) {
        self.rotation.euler_angles()
    }

    /// Same position, orientation rebuilt from the given angles.
    pub fn with_rpy(&self, roll: f64, pitch: f64, yaw: f64) -> Self {
        Self::from_rpy(self.position, roll, pitch, yaw)
    }

    /// Add `offset` component-wise to roll/pitch/yaw.
    pub fn offset_rpy(&self, offset: &Vector3<f64>) -> Self {
        let (roll, pitch, yaw) = self.rpy();
        self.with_rpy(roll + offset.x, pitch + offset.y, yaw + offset.z)
    }

    /// Express `child` (relative to `self`) in the frame `self` is relative to.
    pub fn compose(&self, child: &MountPose) -> MountPose {
        Self::from_isometry(self.to_isometry() * child.to_isometry())
    }

    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.position), self.rotation)
    }

    pub fn from_isometry(iso: Isometry3<f64>) -> Self {
        Self {
            position: iso.translation.vector,
            rotation: iso.rotation,
        }
    }
}

/// Plain 3-component vector used in configuration files.
///
/// Missing components default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<Vec3> for Vector3<f64> {
    fn from(v: Vec3) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

/// Pose as written in configuration: position + roll/pitch/yaw (radians).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseConfig {
    #[serde(default)]
    pub position: Vec3,
    /// `x` = roll, `y` = pitch, `z` = yaw
    #[serde(default)]
    pub rotation: Vec3,
}

impl PoseConfig {
    pub fn to_pose(&self) -> MountPose {
        MountPose::from_rpy(
            self.position.into(),
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }
}
