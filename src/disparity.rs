//! # General disparity objects
//!
//! This module provides generic disparity traits and structures for use by different algorithms.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::GrayImage;
use ndarray::Array2;

use crate::error::*;
use crate::frame::StereoFrame;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// A generic floating point disparity map.
///
/// Pixels no disparity could be established for hold the `invalid` sentinel.
#[derive(Debug, Clone)]
pub struct DisparityMap {
    data: Array2<f32>,
    invalid: f32,
    pub max_disp: Option<f32>,
    pub min_disp: Option<f32>,
}

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

pub trait DisparityAlgorithm {
    /// Compute the disparity map of the given stereo frame.
    fn compute(&mut self, frame: &StereoFrame) -> Result<DisparityMap>;
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl DisparityMap {
    /// An all-invalid map.
    pub fn new(width: usize, height: usize, invalid: f32) -> Self {
        DisparityMap {
            data: Array2::from_elem((height, width), invalid),
            invalid,
            min_disp: None,
            max_disp: None,
        }
    }

    /// Wrap a `[row, column]` array of disparities.
    pub fn from_array(data: Array2<f32>, invalid: f32) -> Self {
        DisparityMap {
            data,
            invalid,
            min_disp: None,
            max_disp: None,
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[[y, x]]
    }

    pub fn put(&mut self, x: usize, y: usize, val: f32) {
        self.data[[y, x]] = val
    }

    /// The sentinel stored in invalid pixels.
    pub fn invalid(&self) -> f32 {
        self.invalid
    }

    pub fn is_valid(&self, x: usize, y: usize) -> bool {
        self.get(x, y) != self.invalid
    }

    /// Number of pixels holding a disparity.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|&&d| d != self.invalid).count()
    }

    /// The disparities indexed `[row, column]`.
    pub fn data(&self) -> &Array2<f32> {
        &self.data
    }

    /// Converts the image into a dynamic Luma8 image.
    ///
    /// Disparities are clamped to `0..=255`, invalid pixels are black.
    pub fn to_luma(&self) -> GrayImage {
        self.to_gray(|val| val)
    }

    /// Converts the image to a normalised GrayImage.
    ///
    /// Maps `min_disp..=max_disp` onto the full grey range. If the maximum disparity is not set
    /// then the function is equivalent to `.to_luma()`.
    pub fn to_luma_normalised(&self) -> GrayImage {
        match self.max_disp {
            Some(max) => {
                let min = self.min_disp.unwrap_or(0.0);
                self.to_luma_range(min, max - min)
            }
            None => self.to_luma(),
        }
    }

    /// Maps `min..=min + range` onto the full grey range, invalid pixels are black.
    pub fn to_luma_range(&self, min: f32, range: f32) -> GrayImage {
        let mult = match range > 0.0 {
            true => 255.0 / range,
            false => 1.0,
        };

        self.to_gray(|val| (val - min) * mult)
    }

    fn to_gray<F: Fn(f32) -> f32>(&self, map: F) -> GrayImage {
        let mut new = image::GrayImage::new(self.width() as u32, self.height() as u32);

        for ((y, x), &d) in self.data.indexed_iter() {
            let val = match d == self.invalid {
                true => 0.0,
                false => map(d).max(0.0).min(255.0),
            };

            *new.get_pixel_mut(x as u32, y as u32) = image::Luma([val as u8]);
        }

        new
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_map_is_invalid() {
        let map = DisparityMap::new(4, 3, -1.0);
        assert_eq!(map.width(), 4);
        assert_eq!(map.height(), 3);
        assert_eq!(map.valid_count(), 0);
        assert!(!map.is_valid(3, 2));
    }

    #[test]
    fn luma_conversions() {
        let mut map = DisparityMap::new(3, 1, -1.0);
        map.put(1, 0, 8.0);
        map.put(2, 0, 16.0);
        map.min_disp = Some(0.0);
        map.max_disp = Some(16.0);

        let raw = map.to_luma();
        assert_eq!(raw.get_pixel(0, 0)[0], 0);
        assert_eq!(raw.get_pixel(1, 0)[0], 8);

        let norm = map.to_luma_normalised();
        assert_eq!(norm.get_pixel(0, 0)[0], 0);
        assert_eq!(norm.get_pixel(1, 0)[0], 127);
        assert_eq!(norm.get_pixel(2, 0)[0], 255);

        let ranged = map.to_luma_range(8.0, 8.0);
        assert_eq!(ranged.get_pixel(1, 0)[0], 0);
        assert_eq!(ranged.get_pixel(2, 0)[0], 255);
    }
}
