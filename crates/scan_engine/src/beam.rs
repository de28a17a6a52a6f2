//! Per-tick beam placement and displacement measurement.

use contracts::{ContractError, MountLink, SonarRenderer};
use nalgebra::Vector3;
use tracing::instrument;

use crate::{AngleTracker, PoseGuard};

/// Result of one beam placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamSample {
    /// Bearing relative to the initial bearing (radians)
    pub displacement: f64,
    /// Absolute bearing of the link's own relative pose (radians)
    pub bearing: f64,
}

/// Positions the virtual beam for the current bearing and measures the
/// scan displacement, leaving the link's relative pose untouched.
#[derive(Debug, Clone)]
pub struct BeamRenderAdapter {
    tracker: AngleTracker,
    local_rotation: Vector3<f64>,
    initial_bearing: f64,
}

impl BeamRenderAdapter {
    pub fn new(tracker: AngleTracker, local_rotation: Vector3<f64>, initial_bearing: f64) -> Self {
        Self {
            tracker,
            local_rotation,
            initial_bearing,
        }
    }

    pub fn initial_bearing(&self) -> f64 {
        self.initial_bearing
    }

    pub fn local_rotation(&self) -> Vector3<f64> {
        self.local_rotation
    }

    /// Hand the renderer the world pose of the beam, measure displacement
    /// and fold the last completed beam into the image at that displacement.
    ///
    /// The link's relative pose is overwritten twice and restored to the
    /// captured value after each use, on the error path as well.
    ///
    /// # Errors
    /// Propagates renderer `pre_render` and `accumulate` failures.
    #[instrument(level = "trace", skip_all, fields(link = %link.name()))]
    pub fn render_bearing<L, R>(
        &self,
        link: &mut L,
        renderer: &mut R,
    ) -> Result<BeamSample, ContractError>
    where
        L: MountLink,
        R: SonarRenderer + ?Sized,
    {
        let captured = link.relative_pose();

        {
            let mut guard = PoseGuard::capture(link);
            guard.apply(captured.offset_rpy(&self.local_rotation));
            renderer.pre_render(&guard.link().world_pose())?;
        }

        let displacement = {
            let mut guard = PoseGuard::capture(link);
            guard.apply(self.tracker.zeroed(&captured, self.initial_bearing));
            self.tracker.angle(&guard.link().relative_pose())
        };

        renderer.accumulate(displacement)?;

        let bearing = self.tracker.angle(&link.relative_pose());

        Ok(BeamSample {
            displacement,
            bearing,
        })
    }
}
