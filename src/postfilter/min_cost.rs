//! Rejects pixels whose best match is still much worse than the matches around them.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::filter::box_mean_new;
use crate::plane::Plane;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Invalidate pixels with `min_cost > ratio * mean`, the mean taken over the minimum cost map
/// in a window twice the aggregation radius.
pub fn min_cost_filter(
    min_cost: &Plane,
    radius_h: usize,
    radius_v: usize,
    ratio: f32,
    disparity: &mut Plane,
    invalid: f32,
) -> usize {
    let local = box_mean_new(min_cost, 2 * radius_h, 2 * radius_v);
    let mut count = 0;

    ndarray::Zip::from(disparity)
        .and(min_cost)
        .and(&local)
        .for_each(|d, &cost, &mean| {
            if *d != invalid && cost > ratio * mean {
                *d = invalid;
                count += 1;
            }
        });

    count
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outlier_cost_is_rejected() {
        let mut min_cost = Plane::from_elem((9, 9), 1.0);
        min_cost[[4, 4]] = 60.0;
        let mut disparity = Plane::from_elem((9, 9), 3.0);

        let count = min_cost_filter(&min_cost, 1, 1, 2.0, &mut disparity, -1.0);

        assert_eq!(count, 1);
        assert_eq!(disparity[[4, 4]], -1.0);
        assert_eq!(disparity[[4, 5]], 3.0);
    }

    #[test]
    fn uniform_costs_survive() {
        let min_cost = Plane::from_elem((5, 5), 7.0);
        let mut disparity = Plane::from_elem((5, 5), 1.0);
        assert_eq!(min_cost_filter(&min_cost, 2, 2, 1.0, &mut disparity, -1.0), 0);
    }
}
