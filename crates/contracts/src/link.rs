//! Rigid-body pose provider abstraction.

use nalgebra::Vector3;

use crate::MountPose;

/// The mechanical link carrying the sensor head.
///
/// Owned by the host physics; the sensor only reads/writes the relative pose
/// and commands angular velocity. No other physical state is touched.
pub trait MountLink {
    /// Link name
    fn name(&self) -> &str;

    /// Pose relative to the parent model
    fn relative_pose(&self) -> MountPose;

    /// Overwrite the pose relative to the parent model
    fn set_relative_pose(&mut self, pose: MountPose);

    /// Pose in the world frame
    fn world_pose(&self) -> MountPose;

    /// Command angular velocity (rad/s) for the next physics step
    fn set_angular_velocity(&mut self, omega: Vector3<f64>);
}

/// Resolves child links of the sensor's parent model by name.
pub trait LinkLookup {
    type Link: MountLink;

    fn link(&self, name: &str) -> Option<&Self::Link>;

    fn link_mut(&mut self, name: &str) -> Option<&mut Self::Link>;
}
