//! # Post filters
//!
//! Validation stages run on the refined disparity map. Each stage writes the invalid sentinel
//! over the pixels it rejects and returns how many pixels it rejected. Pixels already holding
//! the sentinel are left alone and not counted again.
//!
//! The refinement stages that follow (weighted mode, occlusion fill, boundary correction)
//! rewrite disparities instead and return how many pixels they changed.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

mod lr_check;
mod min_cost;
mod occlusion;
mod speckle;
mod uniqueness;
mod weighted_mode;

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::plane::Plane;

pub use lr_check::{lr_check_geometric, lr_check_with_cost};
pub use min_cost::min_cost_filter;
pub use occlusion::{correct_boundary, fill_occlusion};
pub use speckle::SpeckleBuffer;
pub use uniqueness::uniqueness_filter;
pub use weighted_mode::{ModeBuffer, ModeWindow};

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Invalidate the columns left of `max_disparity`, where part of the search range falls
/// outside the reference image.
pub fn invalidate_left_border(disparity: &mut Plane, max_disparity: i32, invalid: f32) -> usize {
    let strip = (max_disparity.max(0) as usize).min(disparity.ncols());
    let mut count = 0;

    for mut row in disparity.rows_mut() {
        for d in row.iter_mut().take(strip) {
            if *d != invalid {
                *d = invalid;
                count += 1;
            }
        }
    }

    count
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_border_strip() {
        let mut disparity = Plane::from_elem((3, 8), 2.0);
        disparity[[0, 1]] = -1.0;

        let count = invalidate_left_border(&mut disparity, 3, -1.0);

        assert_eq!(count, 8);
        for row in disparity.rows() {
            assert!(row.iter().take(3).all(|&d| d == -1.0));
            assert!(row.iter().skip(3).all(|&d| d == 2.0));
        }
    }

    #[test]
    fn negative_range_has_no_strip() {
        let mut disparity = Plane::from_elem((2, 4), -3.0);
        assert_eq!(invalidate_left_border(&mut disparity, -2, -6.0), 0);
    }
}
