//! # Winner-take-all
//!
//! Per-pixel arg-min over the disparity axis of the aggregated cost volume.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use ndarray::Zip;

use crate::plane::Plane;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Select the lowest cost disparity of every pixel.
///
/// `dsi[k]` holds the costs of disparity `min_disparity + k`. The winning disparity is written
/// to `disparity` and its cost to `min_cost`. Planes are scanned in increasing disparity order
/// with a strict comparison, so on ties the smallest disparity wins.
pub fn winner_take_all(
    dsi: &[Plane],
    min_disparity: i32,
    disparity: &mut Plane,
    min_cost: &mut Plane,
) {
    min_cost.fill(f32::INFINITY);
    disparity.fill(min_disparity as f32);

    for (k, plane) in dsi.iter().enumerate() {
        let d = (min_disparity + k as i32) as f32;

        Zip::from(&mut *min_cost)
            .and(&mut *disparity)
            .and(plane)
            .for_each(|m, disp, &c| {
                if c < *m {
                    *m = c;
                    *disp = d;
                }
            });
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn volume(costs: &[f32]) -> Vec<Plane> {
        costs.iter().map(|&c| Plane::from_elem((1, 1), c)).collect()
    }

    #[test]
    fn picks_minimum() {
        let dsi = volume(&[5.0, 3.0, 1.0, 4.0]);
        let mut disp = Plane::zeros((1, 1));
        let mut cost = Plane::zeros((1, 1));

        winner_take_all(&dsi, -2, &mut disp, &mut cost);

        assert_eq!(disp[[0, 0]], 0.0);
        assert_eq!(cost[[0, 0]], 1.0);
    }

    #[test]
    fn ties_prefer_smaller_disparity() {
        let dsi = volume(&[7.0, 2.0, 9.0, 2.0, 2.0]);
        let mut disp = Plane::zeros((1, 1));
        let mut cost = Plane::zeros((1, 1));

        winner_take_all(&dsi, 10, &mut disp, &mut cost);

        assert_eq!(disp[[0, 0]], 11.0);
        assert_eq!(cost[[0, 0]], 2.0);
    }

    #[test]
    fn stale_buffers_are_overwritten() {
        let dsi = volume(&[3.0, 4.0]);
        let mut disp = Plane::from_elem((1, 1), 42.0);
        let mut cost = Plane::from_elem((1, 1), -1.0);

        winner_take_all(&dsi, 0, &mut disp, &mut cost);

        assert_eq!(disp[[0, 0]], 0.0);
        assert_eq!(cost[[0, 0]], 3.0);
    }
}
