//! Back-and-forth sweep between two angular limits.

use contracts::{MountLink, ScanAxis, ScanLimits};
use nalgebra::Vector3;
use tracing::debug;

/// Sweep direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    /// Heading for `angle_max`
    SweepingPositive,
    /// Heading for `angle_min`
    SweepingNegative,
    /// Limits are equal; the commanded velocity is never reversed
    Stationary,
}

impl SweepState {
    pub fn as_str(self) -> &'static str {
        match self {
            SweepState::SweepingPositive => "positive",
            SweepState::SweepingNegative => "negative",
            SweepState::Stationary => "stationary",
        }
    }
}

/// Commands angular velocity on the scan axis, reversing at the limits.
///
/// Reversal only flips the sign of the commanded velocity; overshoot past a
/// limit is bounded by one physics step of motion and is not corrected.
#[derive(Debug, Clone)]
pub struct ScanMotionController {
    axis: ScanAxis,
    limits: ScanLimits,
    angular_velocity: f64,
    heading_to_max: bool,
}

impl ScanMotionController {
    pub fn new(axis: ScanAxis, limits: ScanLimits, angular_velocity: f64) -> Self {
        Self {
            axis,
            limits,
            angular_velocity,
            heading_to_max: true,
        }
    }

    pub fn state(&self) -> SweepState {
        if self.limits.is_degenerate() {
            SweepState::Stationary
        } else if self.heading_to_max {
            SweepState::SweepingPositive
        } else {
            SweepState::SweepingNegative
        }
    }

    /// Current signed commanded velocity (rad/s).
    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    pub fn limits(&self) -> ScanLimits {
        self.limits
    }

    pub fn axis(&self) -> ScanAxis {
        self.axis
    }

    /// Apply the transition rule to the latest displacement.
    ///
    /// Returns the new state when the sweep reversed.
    pub fn update(&mut self, displacement: f64) -> Option<SweepState> {
        if self.limits.is_degenerate() {
            return None;
        }

        if self.heading_to_max && displacement >= self.limits.angle_max {
            self.heading_to_max = false;
        } else if !self.heading_to_max && displacement <= self.limits.angle_min {
            self.heading_to_max = true;
        } else {
            return None;
        }

        self.angular_velocity = -self.angular_velocity;
        let state = self.state();
        debug!(
            displacement,
            angular_velocity = self.angular_velocity,
            direction = state.as_str(),
            "Sweep reversed"
        );
        Some(state)
    }

    /// Angular velocity vector for the current command.
    pub fn command(&self) -> Vector3<f64> {
        self.axis.vector(self.angular_velocity)
    }

    /// Update from `displacement` and write the command to `link`.
    pub fn step<L: MountLink>(&mut self, displacement: f64, link: &mut L) -> Option<SweepState> {
        let transition = self.update(displacement);
        link.set_angular_velocity(self.command());
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubLink;

    const LIMIT: f64 = 2.0944;

    fn controller(omega: f64) -> ScanMotionController {
        ScanMotionController::new(ScanAxis::Z, ScanLimits::new(-LIMIT, LIMIT), omega)
    }

    #[test]
    fn test_starts_heading_positive() {
        let c = controller(0.2);
        assert_eq!(c.state(), SweepState::SweepingPositive);
        assert_eq!(c.command(), Vector3::new(0.0, 0.0, 0.2));
    }

    #[test]
    fn test_reverses_at_max_then_min() {
        let mut c = controller(0.2);
        assert_eq!(c.update(1.0), None);
        assert_eq!(c.update(LIMIT), Some(SweepState::SweepingNegative));
        assert!((c.angular_velocity() + 0.2).abs() < f64::EPSILON);

        // Still above max but already heading negative: no second flip
        assert_eq!(c.update(LIMIT + 0.001), None);
        assert_eq!(c.update(0.0), None);
        assert_eq!(c.update(-LIMIT - 0.001), Some(SweepState::SweepingPositive));
        assert!((c.angular_velocity() - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_below_min_while_heading_positive_is_ignored() {
        let mut c = controller(0.2);
        assert_eq!(c.update(-3.0), None);
        assert_eq!(c.state(), SweepState::SweepingPositive);
    }

    #[test]
    fn test_equal_limits_never_transition() {
        let mut c = ScanMotionController::new(ScanAxis::Z, ScanLimits::new(0.0, 0.0), 0.5);
        assert_eq!(c.state(), SweepState::Stationary);
        for d in [-1.0, 0.0, 1.0, 10.0] {
            assert_eq!(c.update(d), None);
        }
        assert_eq!(c.command(), Vector3::new(0.0, 0.0, 0.5));
    }

    #[test]
    fn test_command_follows_configured_axis() {
        let c = ScanMotionController::new(ScanAxis::X, ScanLimits::new(-1.0, 1.0), 0.3);
        assert_eq!(c.command(), Vector3::new(0.3, 0.0, 0.0));
        let c = ScanMotionController::new(ScanAxis::Y, ScanLimits::new(-1.0, 1.0), 0.3);
        assert_eq!(c.command(), Vector3::new(0.0, 0.3, 0.0));
    }

    #[test]
    fn test_step_writes_link_velocity() {
        let mut link = StubLink::new("sonar_link");
        let mut c = controller(0.2);
        c.step(LIMIT + 0.01, &mut link);
        assert_eq!(link.angular_velocity, Vector3::new(0.0, 0.0, -0.2));
    }

    #[test]
    fn test_oscillation_bounded_by_one_step_overshoot() {
        let omega = 0.2;
        let dt = 0.01;
        let mut c = controller(omega);
        let mut displacement = 0.0_f64;
        let mut reversals = 0;
        for _ in 0..20_000 {
            if c.update(displacement).is_some() {
                reversals += 1;
            }
            displacement += c.angular_velocity() * dt;
            assert!(displacement <= LIMIT + omega * dt + 1e-9);
            assert!(displacement >= -LIMIT - omega * dt - 1e-9);
        }
        assert!(reversals >= 2);
    }
}
