//! Sonar output artifacts handed to the publish boundary.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Colorized (or diagnostic) sonar image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SonarImage {
    /// Image width
    pub width: u32,

    /// Image height
    pub height: u32,

    /// Channel layout
    pub encoding: ImageEncoding,

    /// Raw pixel data, row-major, 3 bytes per pixel
    pub data: Bytes,
}

/// Image channel layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageEncoding {
    Rgb8,
}

impl ImageEncoding {
    pub fn channels(self) -> usize {
        match self {
            ImageEncoding::Rgb8 => 3,
        }
    }
}

impl SonarImage {
    /// # Errors
    /// `FrameShape` when `data` does not hold exactly `width * height` pixels.
    pub fn new(
        width: u32,
        height: u32,
        encoding: ImageEncoding,
        data: Bytes,
    ) -> Result<Self, ContractError> {
        let expected = width as usize * height as usize * encoding.channels();
        if data.len() != expected {
            return Err(ContractError::frame_shape(
                "sonar image data",
                expected,
                data.len(),
            ));
        }
        Ok(Self {
            width,
            height,
            encoding,
            data,
        })
    }

    /// Pixel at column `x`, row `y`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 3;
        let px = self.data.get(offset..offset + 3)?;
        Some([px[0], px[1], px[2]])
    }

    /// Iterate over all pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.data.chunks_exact(3).map(|px| [px[0], px[1], px[2]])
    }
}

/// Structured range/bearing return.
///
/// Carries unnormalized floating-point echo strengths; never colorized or masked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SonarReturn {
    /// Simulation time of capture (seconds)
    pub stamp: f64,

    /// Scan displacement at capture (radians)
    pub bearing: f64,

    /// Number of beams
    pub beam_count: u32,

    /// Number of range bins per beam
    pub bin_count: u32,

    /// Horizontal aperture covered by the beams (radians)
    pub hfov: f64,

    /// Range of the first bin (meters)
    pub range_min: f64,

    /// Range of the last bin (meters)
    pub range_max: f64,

    /// Echo strength, beam-major (`beam * bin_count + bin`)
    pub intensities: Vec<f32>,
}

impl SonarReturn {
    /// Echo strength of one cell.
    pub fn intensity(&self, beam: u32, bin: u32) -> Option<f32> {
        if beam >= self.beam_count || bin >= self.bin_count {
            return None;
        }
        self.intensities
            .get(beam as usize * self.bin_count as usize + bin as usize)
            .copied()
    }

    /// Center range of a bin (meters).
    pub fn bin_range(&self, bin: u32) -> f64 {
        if self.bin_count <= 1 {
            return self.range_min;
        }
        let step = (self.range_max - self.range_min) / f64::from(self.bin_count - 1);
        self.range_min + step * f64::from(bin)
    }
}

/// Topic names for one sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionTopics {
    /// Colorized image
    pub image: String,
    /// Structured return
    pub returns: String,
    /// Diagnostic shader image (debug only)
    pub shader: Option<String>,
}

impl EmissionTopics {
    pub fn new(topic: &str, debug: bool) -> Self {
        Self {
            image: topic.to_string(),
            returns: format!("{topic}/beams_fls"),
            shader: debug.then(|| format!("{topic}/shader")),
        }
    }
}

/// Everything published in one emission cycle.
#[derive(Debug, Clone)]
pub struct SonarEmission {
    /// Emission counter (monotonically increasing per sensor)
    pub sequence: u64,

    /// Simulation time of the emission (seconds)
    pub stamp: f64,

    /// Sensor name
    pub sensor: String,

    /// Target topics
    pub topics: EmissionTopics,

    /// Colorized, masked image
    pub image: SonarImage,

    /// Structured return
    pub sonar_return: SonarReturn,

    /// Diagnostic image, present only in debug mode
    pub shader: Option<SonarImage>,

    /// Share of image pixels that carried a return
    pub valid_fraction: f64,
}
