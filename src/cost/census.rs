//! Census transform cost. Every pixel is encoded as the bit string of `neighbour < centre`
//! comparisons over a small window of the luma plane; the cost is the Hamming distance
//! between target and reference codes.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use ndarray::Array2;

use super::CostMetric;
use crate::plane::{clamp_coord, Plane};
use crate::prefilter::MatchingView;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

/// Census window shape, width x height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CensusWindow {
    W3x3,
    W5x5,
    W7x5,
    W9x1,
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

pub struct CensusCost {
    window: CensusWindow,
    target_codes: Array2<u64>,
    reference_codes: Array2<u64>,
    cap: f32,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl CensusWindow {
    /// Half extents `(x, y)` of the window.
    pub fn radii(self) -> (usize, usize) {
        match self {
            CensusWindow::W3x3 => (1, 1),
            CensusWindow::W5x5 => (2, 2),
            CensusWindow::W7x5 => (3, 2),
            CensusWindow::W9x1 => (4, 0),
        }
    }

    /// Number of bits in a code, the centre is not compared.
    pub fn bits(self) -> u32 {
        let (rx, ry) = self.radii();
        ((2 * rx + 1) * (2 * ry + 1) - 1) as u32
    }
}

impl CensusCost {
    pub fn new(
        window: CensusWindow,
        target: &MatchingView,
        reference: &MatchingView,
        cap: f32,
    ) -> Self {
        Self {
            window,
            target_codes: census_transform(&target.luma, window),
            reference_codes: census_transform(&reference.luma, window),
            cap,
        }
    }
}

impl CostMetric for CensusCost {
    fn name(&self) -> String {
        let (rx, ry) = self.window.radii();
        format!("Census{}x{}", 2 * rx + 1, 2 * ry + 1)
    }

    fn compute(
        &self,
        _target: &MatchingView,
        _reference: &MatchingView,
        disparity: i32,
        dest: &mut Plane,
    ) {
        let (rows, cols) = self.target_codes.dim();
        let d = disparity as isize;

        for y in 0..rows {
            for x in 0..cols {
                let xr = clamp_coord(x as isize - d, cols);
                let distance =
                    (self.target_codes[[y, x]] ^ self.reference_codes[[y, xr]]).count_ones();
                dest[[y, x]] = (distance as f32).min(self.cap);
            }
        }
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Census codes of a plane. Neighbours outside the image are replicated from the border.
pub fn census_transform(src: &Plane, window: CensusWindow) -> Array2<u64> {
    let (rows, cols) = src.dim();
    let (rx, ry) = window.radii();
    let (rx, ry) = (rx as isize, ry as isize);

    Array2::from_shape_fn((rows, cols), |(y, x)| {
        let centre = src[[y, x]];
        let mut code = 0u64;

        for j in -ry..=ry {
            let yy = clamp_coord(y as isize + j, rows);
            for i in -rx..=rx {
                if i == 0 && j == 0 {
                    continue;
                }
                let xx = clamp_coord(x as isize + i, cols);
                code <<= 1;
                if src[[yy, xx]] < centre {
                    code |= 1;
                }
            }
        }

        code
    })
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
