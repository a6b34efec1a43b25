//! # Prefilter
//!
//! Converts each view into the planes the cost metrics work on: one intensity plane per
//! channel, a luma plane used for guidance and census, and a capped horizontal derivative
//! which normalises illumination differences between the two cameras.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::{DynamicImage, GrayImage, RgbImage};
use imageproc::gradients::horizontal_sobel;

use crate::frame::matching_channels;
use crate::plane::Plane;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// A prefiltered view, ready for pixel matching.
pub struct MatchingView {
    /// Intensity planes, one per matched channel.
    pub channels: Vec<Plane>,
    /// Luma of the view, equal to `channels[0]` for gray input.
    pub luma: Plane,
    /// Horizontal Sobel derivative clamped to `[-cap, cap]` and offset by `cap`.
    pub gradient: Plane,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl MatchingView {
    pub fn rows(&self) -> usize {
        self.luma.nrows()
    }

    pub fn cols(&self) -> usize {
        self.luma.ncols()
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Prefilter a single view.
pub fn prefilter(image: &DynamicImage, pre_filter_cap: i32) -> MatchingView {
    let gray = image.to_luma8();
    let luma = gray_plane(&gray);

    let channels = if matching_channels(image) == 1 {
        vec![luma.clone()]
    } else {
        rgb_planes(&image.to_rgb8())
    };

    MatchingView {
        channels,
        gradient: capped_sobel(&gray, pre_filter_cap),
        luma,
    }
}

/// Prefilter both views of a pair with the same settings.
pub fn prefilter_pair(
    target: &DynamicImage,
    reference: &DynamicImage,
    pre_filter_cap: i32,
) -> (MatchingView, MatchingView) {
    (
        prefilter(target, pre_filter_cap),
        prefilter(reference, pre_filter_cap),
    )
}

fn gray_plane(gray: &GrayImage) -> Plane {
    let (w, h) = gray.dimensions();
    Plane::from_shape_fn((h as usize, w as usize), |(y, x)| {
        gray.get_pixel(x as u32, y as u32)[0] as f32
    })
}

fn rgb_planes(rgb: &RgbImage) -> Vec<Plane> {
    let (w, h) = rgb.dimensions();
    (0..3)
        .map(|c| {
            Plane::from_shape_fn((h as usize, w as usize), |(y, x)| {
                rgb.get_pixel(x as u32, y as u32)[c] as f32
            })
        })
        .collect()
}

fn capped_sobel(gray: &GrayImage, cap: i32) -> Plane {
    let sobel = horizontal_sobel(gray);
    let (w, h) = sobel.dimensions();
    let cap = cap as i16;

    Plane::from_shape_fn((h as usize, w as usize), |(y, x)| {
        let v = sobel.get_pixel(x as u32, y as u32)[0];
        (v.max(-cap).min(cap) + cap) as f32
    })
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn gradient_is_offset_and_capped() {
        let gray = GrayImage::from_fn(8, 4, |x, _| Luma([if x < 4 { 0 } else { 255 }]));
        let view = prefilter(&DynamicImage::ImageLuma8(gray), 31);

        assert_eq!(view.channels.len(), 1);
        assert_eq!((view.rows(), view.cols()), (4, 8));
        // Flat regions sit at the offset, the step saturates at twice the cap.
        assert_eq!(view.gradient[[1, 1]], 31.0);
        assert_eq!(view.gradient[[1, 4]], 62.0);
        for v in view.gradient.iter() {
            assert!(*v >= 0.0 && *v <= 62.0);
        }
    }

    #[test]
    fn colour_input_keeps_three_channels() {
        let rgb = RgbImage::from_fn(5, 3, |x, y| Rgb([x as u8, y as u8, 7]));
        let view = prefilter(&DynamicImage::ImageRgb8(rgb), 15);

        assert_eq!(view.channels.len(), 3);
        assert_eq!(view.channels[0][[2, 4]], 4.0);
        assert_eq!(view.channels[1][[2, 4]], 2.0);
        assert_eq!(view.channels[2][[2, 4]], 7.0);
    }
}
