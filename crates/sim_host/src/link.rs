//! 按角速度积分的刚体连杆

use contracts::{MountLink, MountPose};
use nalgebra::{UnitQuaternion, Vector3};

/// Child link whose orientation integrates a commanded angular velocity.
///
/// The velocity is expressed in the parent frame. Position is fixed.
#[derive(Debug, Clone)]
pub struct KinematicLink {
    name: String,
    relative: MountPose,
    parent: MountPose,
    angular_velocity: Vector3<f64>,
}

impl KinematicLink {
    pub fn new(name: impl Into<String>, relative: MountPose, parent: MountPose) -> Self {
        Self {
            name: name.into(),
            relative,
            parent,
            angular_velocity: Vector3::zeros(),
        }
    }

    pub fn angular_velocity(&self) -> Vector3<f64> {
        self.angular_velocity
    }

    /// Advance the orientation by one physics step.
    pub fn integrate(&mut self, dt: f64) {
        let delta = UnitQuaternion::from_scaled_axis(self.angular_velocity * dt);
        self.relative.rotation = delta * self.relative.rotation;
    }
}

impl MountLink for KinematicLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn relative_pose(&self) -> MountPose {
        self.relative
    }

    fn set_relative_pose(&mut self, pose: MountPose) {
        self.relative = pose;
    }

    fn world_pose(&self) -> MountPose {
        self.parent.compose(&self.relative)
    }

    fn set_angular_velocity(&mut self, omega: Vector3<f64>) {
        self.angular_velocity = omega;
    }
}
