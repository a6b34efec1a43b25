//! Speckle removal. Small connected regions of similar disparity are usually mismatches and
//! are invalidated as a whole.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::params::SpeckleConnectivity;
use crate::plane::Plane;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

const FOUR: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

const EIGHT: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Flood fill scratch space, kept between calls so repeated filtering of same sized maps does
/// not allocate.
#[derive(Debug, Default)]
pub struct SpeckleBuffer {
    visited: Vec<bool>,
    stack: Vec<usize>,
    region: Vec<usize>,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl SpeckleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate every connected region with fewer than `max_size` pixels.
    ///
    /// Two valid neighbours belong to the same region when their disparities differ by at
    /// most `range`. Returns the number of invalidated pixels.
    pub fn filter(
        &mut self,
        disparity: &mut Plane,
        max_size: usize,
        range: f32,
        connectivity: SpeckleConnectivity,
        invalid: f32,
    ) -> usize {
        if max_size == 0 {
            return 0;
        }

        let neighbours: &[(isize, isize)] = match connectivity {
            SpeckleConnectivity::Four => &FOUR,
            SpeckleConnectivity::Eight => &EIGHT,
        };

        let (rows, cols) = disparity.dim();
        self.visited.clear();
        self.visited.resize(rows * cols, false);

        let mut count = 0;

        for seed in 0..rows * cols {
            if self.visited[seed] || disparity[[seed / cols, seed % cols]] == invalid {
                continue;
            }

            self.region.clear();
            self.stack.clear();
            self.stack.push(seed);
            self.visited[seed] = true;

            while let Some(p) = self.stack.pop() {
                self.region.push(p);
                let (y, x) = ((p / cols) as isize, (p % cols) as isize);
                let d = disparity[[y as usize, x as usize]];

                for (dy, dx) in neighbours {
                    let (yy, xx) = (y + dy, x + dx);
                    if yy < 0 || xx < 0 || yy >= rows as isize || xx >= cols as isize {
                        continue;
                    }
                    let q = yy as usize * cols + xx as usize;
                    if self.visited[q] {
                        continue;
                    }
                    let dq = disparity[[yy as usize, xx as usize]];
                    if dq != invalid && (dq - d).abs() <= range {
                        self.visited[q] = true;
                        self.stack.push(q);
                    }
                }
            }

            if self.region.len() < max_size {
                for &p in &self.region {
                    disparity[[p / cols, p % cols]] = invalid;
                }
                count += self.region.len();
            }
        }

        count
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const INVALID: f32 = -1.0;

    #[test]
    fn small_island_is_removed() {
        let mut disparity = Plane::from_elem((10, 10), 5.0);
        for y in 3..5 {
            for x in 6..8 {
                disparity[[y, x]] = 20.0;
            }
        }

        let mut buffer = SpeckleBuffer::new();
        let count = buffer.filter(&mut disparity, 5, 1.0, SpeckleConnectivity::Four, INVALID);

        assert_eq!(count, 4);
        assert_eq!(disparity[[3, 6]], INVALID);
        assert_eq!(disparity[[4, 7]], INVALID);
        assert_eq!(disparity[[0, 0]], 5.0);
        assert_eq!(disparity.iter().filter(|&&d| d == 5.0).count(), 96);
    }

    #[test]
    fn single_pixel_outlier() {
        let mut base = Plane::from_elem((5, 5), 3.0);
        base[[2, 2]] = 12.0;

        let mut removed = base.clone();
        let mut buffer = SpeckleBuffer::new();
        let count = buffer.filter(&mut removed, 2, 1.0, SpeckleConnectivity::Four, INVALID);
        assert_eq!(count, 1);
        assert_eq!(removed[[2, 2]], INVALID);
        assert_eq!(removed.iter().filter(|&&d| d == 3.0).count(), 24);

        let mut kept = base.clone();
        assert_eq!(buffer.filter(&mut kept, 0, 1.0, SpeckleConnectivity::Four, INVALID), 0);
        assert_eq!(kept, base);
    }

    #[test]
    fn zero_window_disables() {
        let mut disparity = Plane::from_shape_fn((4, 4), |(y, x)| (x * 7 + y * 3) as f32);
        let before = disparity.clone();

        let mut buffer = SpeckleBuffer::new();
        assert_eq!(
            buffer.filter(&mut disparity, 0, 0.0, SpeckleConnectivity::Four, INVALID),
            0
        );
        assert_eq!(disparity, before);
    }

    #[test]
    fn diagonal_pixels_join_with_eight_connectivity() {
        let mut base = Plane::from_elem((6, 6), 1.0);
        base[[2, 2]] = 9.0;
        base[[3, 3]] = 9.0;

        let mut four = base.clone();
        let mut buffer = SpeckleBuffer::new();
        assert_eq!(buffer.filter(&mut four, 2, 0.5, SpeckleConnectivity::Four, INVALID), 2);
        assert_eq!(four[[2, 2]], INVALID);

        let mut eight = base.clone();
        assert_eq!(buffer.filter(&mut eight, 2, 0.5, SpeckleConnectivity::Eight, INVALID), 0);
        assert_eq!(eight, base);
    }

    #[test]
    fn gradual_slope_is_one_region() {
        // Neighbours differ by 0.5, the ends by far more than the range.
        let mut disparity = Plane::from_shape_fn((1, 12), |(_, x)| x as f32 * 0.5);
        let mut buffer = SpeckleBuffer::new();
        let count = buffer.filter(&mut disparity, 12, 0.5, SpeckleConnectivity::Four, INVALID);
        assert_eq!(count, 0);
    }

    #[test]
    fn invalid_pixels_split_regions() {
        let mut disparity = Plane::from_elem((1, 7), 2.0);
        disparity[[0, 3]] = INVALID;
        let mut buffer = SpeckleBuffer::new();

        let count = buffer.filter(&mut disparity, 4, 0.0, SpeckleConnectivity::Eight, INVALID);

        assert_eq!(count, 6);
        assert!(disparity.iter().all(|&d| d == INVALID));
    }
}
