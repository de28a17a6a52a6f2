//! BeamFrame - renderer output for one instantaneous bearing.

use crate::ContractError;

/// Row-major 2-D grid with a checked shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T> Grid<T> {
    /// Wrap `data` as a `width × height` grid.
    ///
    /// # Errors
    /// `FrameShape` when `data.len() != width * height`.
    pub fn new(width: u32, height: u32, data: Vec<T>) -> Result<Self, ContractError> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(ContractError::frame_shape(
                "grid data",
                format!("{width}x{height} = {expected} cells"),
                data.len(),
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Grid filled with `value`.
    pub fn filled(width: u32, height: u32, value: T) -> Self
    where
        T: Clone,
    {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Cell at column `x`, row `y`.
    pub fn get(&self, x: u32, y: u32) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y as usize * self.width as usize + x as usize)
    }

    pub fn set(&mut self, x: u32, y: u32, value: T) {
        if x < self.width && y < self.height {
            self.data[y as usize * self.width as usize + x as usize] = value;
        }
    }

    pub fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

/// Normalized intensity grid plus its validity mask.
///
/// Both grids always share one shape; building a frame from grids of
/// different shapes is a contract violation and fails.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamFrame {
    intensity: Grid<f32>,
    valid_mask: Grid<bool>,
}

impl BeamFrame {
    /// # Errors
    /// `FrameShape` when intensity and mask dimensions differ.
    pub fn new(intensity: Grid<f32>, valid_mask: Grid<bool>) -> Result<Self, ContractError> {
        if !intensity.same_shape(&valid_mask) {
            return Err(ContractError::frame_shape(
                "beam frame mask",
                format!("{}x{}", intensity.width(), intensity.height()),
                format!("{}x{}", valid_mask.width(), valid_mask.height()),
            ));
        }
        Ok(Self {
            intensity,
            valid_mask,
        })
    }

    pub fn width(&self) -> u32 {
        self.intensity.width()
    }

    pub fn height(&self) -> u32 {
        self.intensity.height()
    }

    pub fn intensity(&self) -> &Grid<f32> {
        &self.intensity
    }

    pub fn valid_mask(&self) -> &Grid<bool> {
        &self.valid_mask
    }

    /// Number of pixels carrying a valid return.
    pub fn valid_count(&self) -> usize {
        self.valid_mask.as_slice().iter().filter(|v| **v).count()
    }
}

/// Raw 3-channel shader output, one float triple per pixel.
pub type ShaderFrame = Grid<[f32; 3]>;
