//! Uniqueness check: a winner is only trusted when no clearly different disparity comes close
//! to its cost.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::plane::Plane;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Reject pixels whose best cost is not unique.
///
/// The competitor is the lowest cost over all disparities more than one step away from the
/// winner, so the two neighbours of a sharp minimum never count against it. A pixel is
/// rejected when `competitor < min_cost * (1 + ratio / 100)`.
///
/// `weight` receives the confidence `1 - min_cost / competitor` of every pixel, zero for
/// rejected pixels and for a zero competitor.
pub fn uniqueness_filter(
    dsi: &[Plane],
    min_disparity: i32,
    ratio: i32,
    min_cost: &Plane,
    disparity: &mut Plane,
    weight: &mut Plane,
    invalid: f32,
) -> usize {
    let (rows, cols) = disparity.dim();
    let margin = (100 + ratio) as f32;
    let mut count = 0;

    for y in 0..rows {
        for x in 0..cols {
            let d = disparity[[y, x]];
            if d == invalid {
                weight[[y, x]] = 0.0;
                continue;
            }

            let winner = (d.round() as i32 - min_disparity) as usize;
            let best = min_cost[[y, x]];

            let competitor = dsi
                .iter()
                .enumerate()
                .filter(|(k, _)| (*k as isize - winner as isize).abs() > 1)
                .map(|(_, plane)| plane[[y, x]])
                .fold(f32::INFINITY, f32::min);

            if competitor * 100.0 < best * margin {
                disparity[[y, x]] = invalid;
                weight[[y, x]] = 0.0;
                count += 1;
            } else if competitor > 0.0 {
                weight[[y, x]] = 1.0 - best / competitor;
            } else {
                weight[[y, x]] = 0.0;
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
    use approx::assert_abs_diff_eq;

    fn run(costs: &[f32], winner: f32, ratio: i32) -> (f32, f32, usize) {
        let dsi: Vec<Plane> = costs.iter().map(|&c| Plane::from_elem((1, 1), c)).collect();
        let best = costs.iter().cloned().fold(f32::INFINITY, f32::min);
        let min_cost = Plane::from_elem((1, 1), best);
        let mut disparity = Plane::from_elem((1, 1), winner);
        let mut weight = Plane::zeros((1, 1));

        let count = uniqueness_filter(
            &dsi,
            0,
            ratio,
            &min_cost,
            &mut disparity,
            &mut weight,
            -1.0,
        );
        (disparity[[0, 0]], weight[[0, 0]], count)
    }

    #[test]
    fn adjacent_runner_up_is_ignored() {
        let (d, w, count) = run(&[10.0, 1.0, 1.05, 10.0, 10.0], 1.0, 10);
        assert_eq!(d, 1.0);
        assert_eq!(count, 0);
        assert_abs_diff_eq!(w, 0.9);
    }

    #[test]
    fn distant_runner_up_rejects() {
        let (d, w, count) = run(&[1.0, 10.0, 10.0, 1.05, 10.0], 0.0, 10);
        assert_eq!(d, -1.0);
        assert_eq!(w, 0.0);
        assert_eq!(count, 1);
    }

    #[test]
    fn zero_ratio_only_rejects_strictly_better() {
        let (d, _, _) = run(&[2.0, 9.0, 9.0, 2.0], 0.0, 0);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn subpixel_winner_rounds_to_its_plane() {
        let (d, _, count) = run(&[9.0, 9.0, 1.0, 3.0, 9.0], 2.3, 10);
        assert_eq!(d, 2.3);
        assert_eq!(count, 0);
    }
}
