//! Scalar bearing extraction.

use contracts::{MountPose, ScanAxis};

/// Converts a full orientation into the bearing about one scan axis.
///
/// Roll for X, pitch for Y, yaw for Z. The result follows the quaternion's
/// Euler convention and may wrap; callers interpret it relative to a stored
/// initial bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngleTracker {
    axis: ScanAxis,
}

impl AngleTracker {
    pub fn new(axis: ScanAxis) -> Self {
        Self { axis }
    }

    pub fn axis(&self) -> ScanAxis {
        self.axis
    }

    /// Bearing of `pose` about the scan axis.
    pub fn angle(&self, pose: &MountPose) -> f64 {
        self.axis.select(pose.rpy())
    }

    /// `pose` with `initial` subtracted along the scan axis only.
    pub fn zeroed(&self, pose: &MountPose, initial: f64) -> MountPose {
        let (roll, pitch, yaw) = pose.rpy();
        let offset = self.axis.vector(initial);
        pose.with_rpy(roll - offset.x, pitch - offset.y, yaw - offset.z)
    }
}
