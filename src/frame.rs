//! # Stereo frames
//!
//! A rectified pair of images, left (target) and right (reference).

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::{ColorType, DynamicImage, GenericImageView};

use crate::error::*;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// A rectified stereo pair. Both views must share size and channel count.
pub struct StereoFrame {
    pub left: DynamicImage,
    pub right: DynamicImage,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl StereoFrame {
    pub fn new(left: DynamicImage, right: DynamicImage) -> Self {
        Self { left, right }
    }

    pub fn width(&self) -> u32 {
        self.left.width()
    }

    pub fn height(&self) -> u32 {
        self.left.height()
    }

    /// Check that both views can be matched against each other.
    pub fn check(&self) -> Result<()> {
        check_pair(&self.left, &self.right)
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Number of channels the image is matched on: 1 for gray, 3 for colour. Alpha is ignored.
pub(crate) fn matching_channels(image: &DynamicImage) -> u8 {
    match image.color() {
        ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16 => 1,
        _ => 3,
    }
}

/// Fail if the target and reference images differ in size or channel count.
pub(crate) fn check_pair(target: &DynamicImage, reference: &DynamicImage) -> Result<()> {
    if target.dimensions() != reference.dimensions() {
        return Err(Error::ShapeMismatch {
            target: target.dimensions(),
            reference: reference.dimensions(),
        });
    }

    let (tc, rc) = (matching_channels(target), matching_channels(reference));
    if tc != rc {
        return Err(Error::ChannelMismatch {
            target: tc,
            reference: rc,
        });
    }

    Ok(())
}
