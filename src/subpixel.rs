//! # Subpixel interpolation
//!
//! Refines integer winner-take-all disparities by fitting a model through the cost of the
//! winner and its two neighbours on the disparity axis.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::params::SubpixelMethod;
use crate::plane::Plane;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Largest correction magnitude, keeps the refined value inside the winner's half-pixel cell.
const MAX_OFFSET: f32 = 0.499;

/// Curvatures at or below this are treated as a flat fit.
const MIN_CURVATURE: f32 = 1e-6;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Smoothing of the fitted cost samples over neighbours sharing the winner's disparity.
#[derive(Debug, Clone, Copy)]
pub struct RangeFilter {
    /// Largest integer disparity difference of a neighbour that still contributes.
    pub cap: i32,
    /// Window radius.
    pub window: usize,
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Vertex offset of the parabola through `(-1, prev)`, `(0, best)`, `(1, next)`.
///
/// Returns zero when the samples do not describe a minimum.
pub fn quadratic_offset(prev: f32, best: f32, next: f32) -> f32 {
    let curvature = prev - 2.0 * best + next;
    if curvature <= MIN_CURVATURE {
        return 0.0;
    }
    clamp_offset((prev - next) / (2.0 * curvature))
}

/// Equiangular fit: two lines of equal and opposite slope through the samples, the steeper
/// side fixing the slope.
pub fn linear_offset(prev: f32, best: f32, next: f32) -> f32 {
    // If left is higher than right the slope is taken from the left
    let denom = match prev > next {
        true => 2.0 * (prev - best),
        false => 2.0 * (next - best),
    };
    if denom <= MIN_CURVATURE {
        return 0.0;
    }
    clamp_offset((prev - next) / denom)
}

fn clamp_offset(offset: f32) -> f32 {
    offset.max(-MAX_OFFSET).min(MAX_OFFSET)
}

/// Add a subpixel correction to every integer disparity in `disparity`.
///
/// Pixels whose winner sits at either end of the disparity range keep their integer value.
/// `SubpixelMethod::None` leaves the map untouched.
pub fn subpixel_interpolation(
    dsi: &[Plane],
    min_disparity: i32,
    method: SubpixelMethod,
    range_filter: Option<RangeFilter>,
    disparity: &mut Plane,
) {
    let fit: fn(f32, f32, f32) -> f32 = match method {
        SubpixelMethod::None => return,
        SubpixelMethod::Quad => quadratic_offset,
        SubpixelMethod::Linear => linear_offset,
    };
    if dsi.len() < 3 {
        return;
    }

    let (rows, cols) = disparity.dim();
    let last = dsi.len() - 1;
    let winners = range_filter.map(|_| disparity.clone());

    for y in 0..rows {
        for x in 0..cols {
            let k = (disparity[[y, x]] as i32 - min_disparity) as usize;
            if k == 0 || k >= last {
                continue;
            }

            let (prev, best, next) = match (&winners, range_filter) {
                (Some(winners), Some(filter)) => {
                    range_filtered_samples(dsi, winners, filter, y, x, k)
                }
                _ => (dsi[k - 1][[y, x]], dsi[k][[y, x]], dsi[k + 1][[y, x]]),
            };

            disparity[[y, x]] += fit(prev, best, next);
        }
    }
}

/// Mean of the three cost samples around winner `k` over the window neighbours whose own
/// winner lies within `filter.cap` of the centre's.
fn range_filtered_samples(
    dsi: &[Plane],
    winners: &Plane,
    filter: RangeFilter,
    y: usize,
    x: usize,
    k: usize,
) -> (f32, f32, f32) {
    let (rows, cols) = winners.dim();
    let centre = winners[[y, x]];
    let cap = filter.cap as f32;

    let y0 = y.saturating_sub(filter.window);
    let y1 = (y + filter.window + 1).min(rows);
    let x0 = x.saturating_sub(filter.window);
    let x1 = (x + filter.window + 1).min(cols);

    let (mut prev, mut best, mut next, mut count) = (0.0f32, 0.0f32, 0.0f32, 0u32);
    for yy in y0..y1 {
        for xx in x0..x1 {
            if (winners[[yy, xx]] - centre).abs() > cap {
                continue;
            }
            prev += dsi[k - 1][[yy, xx]];
            best += dsi[k][[yy, xx]];
            next += dsi[k + 1][[yy, xx]];
            count += 1;
        }
    }

    // The centre always passes, so count is at least one.
    let n = count as f32;
    (prev / n, best / n, next / n)
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn symmetric_parabola_has_no_correction() {
        assert_abs_diff_eq!(quadratic_offset(4.0, 1.0, 4.0), 0.0);
        assert_abs_diff_eq!(linear_offset(4.0, 1.0, 4.0), 0.0);
    }

    #[test]
    fn asymmetric_samples_pull_towards_lower_side() {
        let quad = quadratic_offset(4.0, 1.0, 2.0);
        assert_abs_diff_eq!(quad, 0.25);

        let linear = linear_offset(4.0, 1.0, 2.0);
        assert_abs_diff_eq!(linear, 1.0 / 3.0, epsilon = 1e-6);

        assert!(quadratic_offset(2.0, 1.0, 4.0) < 0.0);
    }

    #[test]
    fn degenerate_fit_falls_back_to_integer() {
        assert_eq!(quadratic_offset(1.0, 1.0, 1.0), 0.0);
        assert_eq!(quadratic_offset(0.0, 1.0, 0.0), 0.0);
        assert_eq!(linear_offset(2.0, 2.0, 2.0), 0.0);
    }

    #[test]
    fn correction_stays_inside_half_pixel() {
        let offset = quadratic_offset(10.0, 0.0, 0.0001);
        assert!(offset < 0.5 && offset > 0.0);
    }

    #[test]
    fn refines_map_and_skips_range_ends() {
        let costs = [9.0, 4.0, 1.0, 2.0, 8.0];
        let dsi: Vec<Plane> = costs
            .iter()
            .map(|&c| Plane::from_elem((1, 2), c))
            .collect();
        let mut disparity = Plane::from_elem((1, 2), 2.0);
        disparity[[0, 1]] = 0.0;

        subpixel_interpolation(&dsi, 0, SubpixelMethod::Quad, None, &mut disparity);

        // (4 - 2) / (2 * (4 - 2 + 2))
        assert_abs_diff_eq!(disparity[[0, 0]], 2.25);
        assert_eq!(disparity[[0, 1]], 0.0);
    }

    #[test]
    fn none_leaves_integer_map() {
        let dsi: Vec<Plane> = (0..4).map(|k| Plane::from_elem((2, 2), k as f32)).collect();
        let mut disparity = Plane::from_elem((2, 2), 1.0);
        subpixel_interpolation(&dsi, 0, SubpixelMethod::None, None, &mut disparity);
        assert!(disparity.iter().all(|&d| d == 1.0));
    }

    #[test]
    fn range_filter_averages_agreeing_neighbours() {
        // Left pixel has noisy samples, right pixel agrees on the winner with symmetric ones.
        let mut dsi: Vec<Plane> = (0..3).map(|_| Plane::zeros((1, 2))).collect();
        dsi[0][[0, 0]] = 4.0;
        dsi[1][[0, 0]] = 1.0;
        dsi[2][[0, 0]] = 2.0;
        dsi[0][[0, 1]] = 4.0;
        dsi[1][[0, 1]] = 1.0;
        dsi[2][[0, 1]] = 6.0;
        let mut disparity = Plane::from_elem((1, 2), 1.0);

        let filter = RangeFilter { cap: 0, window: 1 };
        subpixel_interpolation(&dsi, 0, SubpixelMethod::Quad, Some(filter), &mut disparity);

        // Both pixels fit the mean samples (4, 1, 4).
        assert_abs_diff_eq!(disparity[[0, 0]], 1.0);
        assert_abs_diff_eq!(disparity[[0, 1]], 1.0);
    }
}
