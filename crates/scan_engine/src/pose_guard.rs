//! Scoped link pose override.

use contracts::{MountLink, MountPose};

/// Captures a link's relative pose on creation and writes it back on drop.
///
/// The restored value is the captured one, never a recomputation, so the
/// link ends up bit-identical even when the guarded work fails early.
pub struct PoseGuard<'a, L: MountLink> {
    link: &'a mut L,
    original: MountPose,
}

impl<'a, L: MountLink> PoseGuard<'a, L> {
    pub fn capture(link: &'a mut L) -> Self {
        let original = link.relative_pose();
        Self { link, original }
    }

    /// Pose captured at construction.
    pub fn original(&self) -> MountPose {
        self.original
    }

    /// Temporarily overwrite the relative pose.
    pub fn apply(&mut self, pose: MountPose) {
        self.link.set_relative_pose(pose);
    }

    pub fn link(&self) -> &L {
        self.link
    }
}

impl<L: MountLink> Drop for PoseGuard<'_, L> {
    fn drop(&mut self) {
        self.link.set_relative_pose(self.original);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubLink;
    use nalgebra::Vector3;

    #[test]
    fn test_restores_on_drop() {
        let mut link = StubLink::new("head");
        let start = MountPose::from_rpy(Vector3::new(1.0, 0.0, -0.5), 0.1, 0.2, 0.3);
        link.pose = start;
        {
            let mut guard = PoseGuard::capture(&mut link);
            guard.apply(start.with_rpy(0.0, 0.0, 1.2));
            assert_ne!(guard.link().relative_pose(), start);
            assert_eq!(guard.original(), start);
        }
        assert_eq!(link.pose, start);
    }

    #[test]
    fn test_restores_on_early_return() {
        fn fails(link: &mut StubLink) -> Result<(), &'static str> {
            let mut guard = PoseGuard::capture(link);
            guard.apply(MountPose::identity().with_rpy(0.0, 0.0, 2.5));
            Err("renderer failed")
        }

        let mut link = StubLink::new("head");
        let start = MountPose::identity().with_rpy(0.0, 0.0, -0.7);
        link.pose = start;
        assert!(fails(&mut link).is_err());
        assert_eq!(link.pose, start);
    }
}
