//! Weighted mode refinement. Each valid pixel takes the disparity holding the heaviest vote in
//! its window, where a vote counts the uniqueness confidence of the voter and its intensity
//! similarity to the centre pixel.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::plane::{ensure_shape, Plane};

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Smallest change that counts as a moved pixel.
const MOVE_TOLERANCE: f32 = 1e-4;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct ModeWindow {
    pub radius: usize,
    /// Intensity difference scale of the range weight `exp(-dI^2 / (2 sigma^2))`.
    pub sigma_range: f32,
}

/// Vote histogram and source copy, kept between calls.
#[derive(Debug, Default)]
pub struct ModeBuffer {
    votes: Vec<f32>,
    sums: Vec<f32>,
    source: Plane,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl ModeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every valid disparity with the weighted mode of the valid disparities around it.
    ///
    /// Bins are integer disparities in `min_disparity..min_disparity + number_of_disparities`.
    /// The output is the vote weighted mean of the disparities that fell into the winning bin,
    /// so subpixel precision survives. Ties go to the smaller disparity. Pixels whose window
    /// carries no weight keep their value, invalid pixels neither vote nor change.
    ///
    /// Returns the number of pixels that moved.
    pub fn filter(
        &mut self,
        disparity: &mut Plane,
        weight: &Plane,
        guide: &Plane,
        window: ModeWindow,
        min_disparity: i32,
        number_of_disparities: usize,
        invalid: f32,
    ) -> usize {
        let (rows, cols) = disparity.dim();
        ensure_shape(&mut self.source, (rows, cols));
        self.source.assign(disparity);

        self.votes.clear();
        self.votes.resize(number_of_disparities, 0.0);
        self.sums.clear();
        self.sums.resize(number_of_disparities, 0.0);

        let radius = window.radius;
        let inv_two_sigma_sq = 1.0 / (2.0 * window.sigma_range * window.sigma_range);
        let mut count = 0;

        for y in 0..rows {
            for x in 0..cols {
                let centre = self.source[[y, x]];
                if centre == invalid {
                    continue;
                }

                self.votes.iter_mut().for_each(|v| *v = 0.0);
                self.sums.iter_mut().for_each(|s| *s = 0.0);

                let intensity = guide[[y, x]];
                for yy in y.saturating_sub(radius)..(y + radius + 1).min(rows) {
                    for xx in x.saturating_sub(radius)..(x + radius + 1).min(cols) {
                        let d = self.source[[yy, xx]];
                        let w = weight[[yy, xx]].max(0.0).min(1.0);
                        if d == invalid || w <= 0.0 {
                            continue;
                        }

                        let bin = d.round() as i32 - min_disparity;
                        if bin < 0 || bin as usize >= number_of_disparities {
                            continue;
                        }

                        let diff = intensity - guide[[yy, xx]];
                        let vote = w * (-diff * diff * inv_two_sigma_sq).exp();
                        self.votes[bin as usize] += vote;
                        self.sums[bin as usize] += vote * d;
                    }
                }

                let (best, heaviest) = self
                    .votes
                    .iter()
                    .enumerate()
                    .fold((0, 0.0f32), |(bk, bv), (k, &v)| match v > bv {
                        true => (k, v),
                        false => (bk, bv),
                    });
                if heaviest <= 0.0 {
                    continue;
                }

                let refined = self.sums[best] / heaviest;
                disparity[[y, x]] = refined;
                if (refined - centre).abs() > MOVE_TOLERANCE {
                    count += 1;
                }
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
    use approx::assert_abs_diff_eq;

    const WINDOW: ModeWindow = ModeWindow {
        radius: 1,
        sigma_range: 10.0,
    };

    #[test]
    fn outlier_follows_confident_neighbours() {
        let mut disparity = Plane::from_elem((5, 5), 4.0);
        let mut weight = Plane::from_elem((5, 5), 0.9);
        disparity[[2, 2]] = 9.0;
        weight[[2, 2]] = 0.1;
        let guide = Plane::from_elem((5, 5), 50.0);

        let count = ModeBuffer::new().filter(&mut disparity, &weight, &guide, WINDOW, 0, 16, -1.0);

        assert_eq!(count, 1);
        assert_abs_diff_eq!(disparity[[2, 2]], 4.0, epsilon = 1e-5);
        assert_abs_diff_eq!(disparity[[0, 0]], 4.0, epsilon = 1e-5);
    }

    #[test]
    fn guide_edge_keeps_regions_apart() {
        let mut disparity = Plane::from_shape_fn((4, 6), |(_, x)| if x < 3 { 2.0 } else { 6.0 });
        let weight = Plane::from_elem((4, 6), 1.0);
        let guide = Plane::from_shape_fn((4, 6), |(_, x)| if x < 3 { 0.0 } else { 200.0 });
        let before = disparity.clone();

        let count = ModeBuffer::new().filter(&mut disparity, &weight, &guide, WINDOW, 0, 16, -1.0);

        assert_eq!(count, 0);
        for (a, b) in disparity.iter().zip(before.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-5);
        }
    }

    #[test]
    fn subpixel_values_are_averaged_within_the_winning_bin() {
        let mut disparity = Plane::from_elem((1, 3), 3.2);
        disparity[[0, 2]] = 2.8;
        let weight = Plane::from_elem((1, 3), 1.0);
        let guide = Plane::zeros((1, 3));

        ModeBuffer::new().filter(&mut disparity, &weight, &guide, WINDOW, 0, 8, -1.0);

        // Centre window holds 3.2, 3.2 and 2.8, all in bin 3.
        assert_abs_diff_eq!(disparity[[0, 1]], 3.2 * 2.0 / 3.0 + 2.8 / 3.0, epsilon = 1e-5);
    }

    #[test]
    fn zero_weight_and_invalid_pixels_are_left_alone() {
        let mut disparity = Plane::from_elem((3, 3), 5.0);
        disparity[[1, 1]] = -1.0;
        disparity[[0, 0]] = 1.0;
        let weight = Plane::zeros((3, 3));
        let guide = Plane::zeros((3, 3));
        let before = disparity.clone();

        let count = ModeBuffer::new().filter(&mut disparity, &weight, &guide, WINDOW, 0, 8, -1.0);

        assert_eq!(count, 0);
        assert_eq!(disparity, before);
    }
}
