//! Left-right consistency. The reference view's disparity is derived from the target map
//! itself instead of running a second matching pass, then every target pixel is checked
//! against the disparity found where it lands in the reference view.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use ndarray::ArrayViewMut1;

use crate::plane::Plane;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Consistency check where the reference disparity at each column is taken from the target
/// pixel with the lowest cost among those projecting onto it.
pub fn lr_check_with_cost(
    disparity: &mut Plane,
    cost: &Plane,
    disp12diff: i32,
    invalid: f32,
) -> usize {
    let mut reference = vec![invalid; disparity.ncols()];
    let mut reference_cost = vec![f32::INFINITY; disparity.ncols()];
    let mut count = 0;

    for (row, cost_row) in disparity.rows_mut().into_iter().zip(cost.rows()) {
        reference.iter_mut().for_each(|d| *d = invalid);
        reference_cost.iter_mut().for_each(|c| *c = f32::INFINITY);

        for (x, (&d, &c)) in row.iter().zip(cost_row.iter()).enumerate() {
            if d == invalid {
                continue;
            }
            if let Some(xr) = project(x, d, reference.len()) {
                if c < reference_cost[xr] {
                    reference_cost[xr] = c;
                    reference[xr] = d;
                }
            }
        }

        count += check_row(row, &reference, disp12diff, invalid);
    }

    count
}

/// Consistency check where the reference disparity at each column is the largest target
/// disparity projecting onto it, i.e. the closest surface wins occlusions.
pub fn lr_check_geometric(disparity: &mut Plane, disp12diff: i32, invalid: f32) -> usize {
    let mut reference = vec![invalid; disparity.ncols()];
    let mut count = 0;

    for row in disparity.rows_mut() {
        reference.iter_mut().for_each(|d| *d = invalid);

        for (x, &d) in row.iter().enumerate() {
            if d == invalid {
                continue;
            }
            if let Some(xr) = project(x, d, reference.len()) {
                if reference[xr] == invalid || d > reference[xr] {
                    reference[xr] = d;
                }
            }
        }

        count += check_row(row, &reference, disp12diff, invalid);
    }

    count
}

/// Column in the reference view seen by target column `x` at disparity `d`.
#[inline]
fn project(x: usize, d: f32, cols: usize) -> Option<usize> {
    let xr = (x as f32 - d).round();
    if xr >= 0.0 && xr < cols as f32 {
        Some(xr as usize)
    } else {
        None
    }
}

fn check_row(
    mut row: ArrayViewMut1<f32>,
    reference: &[f32],
    disp12diff: i32,
    invalid: f32,
) -> usize {
    let threshold = disp12diff as f32;
    let mut count = 0;

    for (x, d) in row.iter_mut().enumerate() {
        if *d == invalid {
            continue;
        }
        let consistent = match project(x, *d, reference.len()) {
            Some(xr) => (*d - reference[xr]).abs() <= threshold,
            None => false,
        };
        if !consistent {
            *d = invalid;
            count += 1;
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

    const INVALID: f32 = -1.0;

    /// A near surface (d = 2) starting at column 3 occludes background columns 1 and 2.
    fn occlusion_row() -> (Plane, Plane) {
        let disparity = Plane::from_shape_vec((1, 6), vec![0.0, 0.0, 0.0, 2.0, 2.0, 2.0])
            .expect("shape");
        let cost = Plane::from_shape_vec((1, 6), vec![1.0, 1.0, 1.0, 5.0, 5.0, 1.0])
            .expect("shape");
        (disparity, cost)
    }

    #[test]
    fn geometric_keeps_the_near_surface() {
        let (mut disparity, _) = occlusion_row();
        let count = lr_check_geometric(&mut disparity, 0, INVALID);

        assert_eq!(count, 2);
        assert_eq!(
            disparity.row(0).to_vec(),
            vec![0.0, INVALID, INVALID, 2.0, 2.0, 2.0]
        );
    }

    #[test]
    fn cost_map_keeps_the_cheaper_match() {
        let (mut disparity, cost) = occlusion_row();
        let count = lr_check_with_cost(&mut disparity, &cost, 0, INVALID);

        assert_eq!(count, 2);
        assert_eq!(
            disparity.row(0).to_vec(),
            vec![0.0, 0.0, 0.0, INVALID, INVALID, 2.0]
        );
    }

    #[test]
    fn projection_outside_image_is_invalid() {
        let mut disparity = Plane::from_elem((2, 5), 2.0);
        let count = lr_check_geometric(&mut disparity, 1, INVALID);

        assert_eq!(count, 4);
        for row in disparity.rows() {
            assert_eq!(row.to_vec(), vec![INVALID, INVALID, 2.0, 2.0, 2.0]);
        }
    }

    #[test]
    fn tolerance_allows_small_differences() {
        let mut disparity =
            Plane::from_shape_vec((1, 4), vec![0.0, 1.0, 0.0, 0.0]).expect("shape");
        let cost = Plane::from_shape_vec((1, 4), vec![1.0, 2.0, 1.0, 1.0]).expect("shape");

        assert_eq!(lr_check_with_cost(&mut disparity, &cost, 1, INVALID), 0);
    }
}
