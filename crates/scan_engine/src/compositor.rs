//! Builds the published artifacts from renderer output.

use bytes::Bytes;
use contracts::{
    BeamFrame, ContractError, ImageEncoding, ShaderFrame, SonarImage, SonarRenderer,
    SonarReturn, WorldContext,
};
use tracing::instrument;

use crate::ColorLut;

/// Artifacts of one emission cycle.
#[derive(Debug, Clone)]
pub struct Composite {
    pub image: SonarImage,
    pub sonar_return: SonarReturn,
    pub shader: Option<SonarImage>,
    pub valid_fraction: f64,
}

/// Colorizes and masks the intensity grid, attaches the structured return
/// and, in debug mode, the raw shader output.
#[derive(Debug, Clone, Default)]
pub struct SonarImageCompositor {
    lut: ColorLut,
}

impl SonarImageCompositor {
    pub fn new() -> Self {
        Self {
            lut: ColorLut::winter(),
        }
    }

    /// Clamp to `[0, 1]` and scale to 8 bits. NaN maps to 0.
    pub fn quantize(value: f32) -> u8 {
        if value.is_nan() {
            return 0;
        }
        (value.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// Color-mapped image; pixels outside the mask are exactly `(0, 0, 0)`.
    pub fn colorize(&self, frame: &BeamFrame) -> Result<SonarImage, ContractError> {
        let mut data = Vec::with_capacity(frame.intensity().len() * 3);
        for (value, valid) in frame
            .intensity()
            .as_slice()
            .iter()
            .zip(frame.valid_mask().as_slice())
        {
            if *valid {
                data.extend_from_slice(&self.lut.get(Self::quantize(*value)));
            } else {
                data.extend_from_slice(&[0, 0, 0]);
            }
        }
        SonarImage::new(
            frame.width(),
            frame.height(),
            ImageEncoding::Rgb8,
            Bytes::from(data),
        )
    }

    /// Raw shader output as an 8-bit RGB image, no color map.
    pub fn shader_image(&self, shader: &ShaderFrame) -> Result<SonarImage, ContractError> {
        let data: Vec<u8> = shader
            .as_slice()
            .iter()
            .flat_map(|px| px.map(Self::quantize))
            .collect();
        SonarImage::new(
            shader.width(),
            shader.height(),
            ImageEncoding::Rgb8,
            Bytes::from(data),
        )
    }

    /// Read back the renderer and build every artifact for this cycle.
    ///
    /// # Errors
    /// `FrameShape` when the intensity grid, mask or structured return
    /// disagree in size.
    #[instrument(level = "trace", skip_all, fields(renderer = %renderer.name()))]
    pub fn compose<R>(
        &self,
        renderer: &R,
        world: &WorldContext,
        displacement: f64,
        debug: bool,
    ) -> Result<Composite, ContractError>
    where
        R: SonarRenderer + ?Sized,
    {
        let frame = BeamFrame::new(renderer.sonar_image(), renderer.sonar_mask())?;
        let image = self.colorize(&frame)?;

        let sonar_return = renderer.sonar_return(world, displacement);
        let expected = sonar_return.beam_count as usize * sonar_return.bin_count as usize;
        if sonar_return.intensities.len() != expected {
            return Err(ContractError::frame_shape(
                "sonar return",
                expected,
                sonar_return.intensities.len(),
            ));
        }

        let shader = if debug {
            Some(self.shader_image(&renderer.shader_image())?)
        } else {
            None
        };

        let valid_fraction = if frame.intensity().is_empty() {
            0.0
        } else {
            frame.valid_count() as f64 / frame.intensity().len() as f64
        };

        Ok(Composite {
            image,
            sonar_return,
            shader,
            valid_fraction,
        })
    }
}
