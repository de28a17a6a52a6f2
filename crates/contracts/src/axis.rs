//! Scan axis and sweep limits.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Local rotational axis the mechanical sweep occurs about.
///
/// Encoded on the wire and in configuration files as `0`/`1`/`2`.
/// Decoding any other integer fails, so a validated sensor can never hold
/// an axis outside {X, Y, Z}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ScanAxis {
    /// Roll
    X,
    /// Pitch
    Y,
    /// Yaw
    Z,
}

impl ScanAxis {
    /// Integer code used by configuration files.
    pub fn code(self) -> i64 {
        match self {
            ScanAxis::X => 0,
            ScanAxis::Y => 1,
            ScanAxis::Z => 2,
        }
    }

    /// Pick the component belonging to this axis out of `(roll, pitch, yaw)`.
    pub fn select(self, (roll, pitch, yaw): (f64, f64, f64)) -> f64 {
        match self {
            ScanAxis::X => roll,
            ScanAxis::Y => pitch,
            ScanAxis::Z => yaw,
        }
    }

    /// Vector with `value` on this axis and zero on the other two.
    pub fn vector(self, value: f64) -> Vector3<f64> {
        match self {
            ScanAxis::X => Vector3::new(value, 0.0, 0.0),
            ScanAxis::Y => Vector3::new(0.0, value, 0.0),
            ScanAxis::Z => Vector3::new(0.0, 0.0, value),
        }
    }
}

impl TryFrom<i64> for ScanAxis {
    type Error = ContractError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ScanAxis::X),
            1 => Ok(ScanAxis::Y),
            2 => Ok(ScanAxis::Z),
            _ => Err(ContractError::UnknownAxis { value }),
        }
    }
}

impl From<ScanAxis> for i64 {
    fn from(axis: ScanAxis) -> Self {
        axis.code()
    }
}

/// Angular sweep limits, radians.
///
/// `angle_min <= angle_max` by convention; equality means "hold still".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanLimits {
    pub angle_min: f64,
    pub angle_max: f64,
}

impl ScanLimits {
    pub fn new(angle_min: f64, angle_max: f64) -> Self {
        Self {
            angle_min,
            angle_max,
        }
    }

    /// No sweep: both limits coincide.
    #[allow(clippy::float_cmp)]
    pub fn is_degenerate(&self) -> bool {
        self.angle_max == self.angle_min
    }

    /// Angular width of the sweep.
    pub fn span(&self) -> f64 {
        self.angle_max - self.angle_min
    }
}
