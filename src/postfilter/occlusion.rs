//! Occlusion filling and edge aligned boundary correction. Unlike the validation stages these
//! write disparities instead of rejecting them.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::plane::Plane;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Fill every run of invalid pixels in a row with the smaller of the two valid disparities
/// bounding it, occluded pixels belonging to the farther surface.
///
/// Runs touching the image edge copy their only neighbour. Rows without any valid pixel are
/// left alone. Returns the number of filled pixels.
pub fn fill_occlusion(disparity: &mut Plane, invalid: f32) -> usize {
    let mut count = 0;

    for mut row in disparity.rows_mut() {
        let cols = row.len();
        let mut last_valid = None;
        let mut x = 0;

        while x < cols {
            if row[x] != invalid {
                last_valid = Some(row[x]);
                x += 1;
                continue;
            }

            let start = x;
            while x < cols && row[x] == invalid {
                x += 1;
            }
            let next_valid = match x < cols {
                true => Some(row[x]),
                false => None,
            };

            let fill = match (last_valid, next_valid) {
                (Some(l), Some(r)) => l.min(r),
                (Some(v), None) | (None, Some(v)) => v,
                (None, None) => break,
            };
            for d in row.iter_mut().skip(start).take(x - start) {
                *d = fill;
            }
            count += x - start;
        }
    }

    count
}

/// Move horizontal disparity discontinuities onto the nearest strong intensity edge.
///
/// A discontinuity is a jump of more than one between valid neighbours `x` and `x + 1`. The
/// strongest guide step `|I(e + 1) - I(e)|` within `radius` of `x` is searched, nearer steps
/// winning ties. When it reaches `edge_threshold` the jump is moved to `e` by extending the
/// disparity of the side the edge lies in. Returns the number of changed pixels.
pub fn correct_boundary(
    disparity: &mut Plane,
    guide: &Plane,
    radius: usize,
    edge_threshold: f32,
    invalid: f32,
) -> usize {
    let cols = disparity.ncols();
    let mut source = Vec::with_capacity(cols);
    let mut count = 0;

    for (mut row, guide_row) in disparity.rows_mut().into_iter().zip(guide.rows()) {
        source.clear();
        source.extend(row.iter().copied());

        let step = |e: usize| (guide_row[e + 1] - guide_row[e]).abs();

        for x in 0..cols.saturating_sub(1) {
            let (left, right) = (source[x], source[x + 1]);
            if left == invalid || right == invalid || (left - right).abs() <= 1.0 {
                continue;
            }

            let mut edge = x;
            let mut strength = step(x);
            for offset in 1..=radius {
                let candidates = [
                    x.checked_sub(offset),
                    Some(x + offset).filter(|&e| e + 1 < cols),
                ];
                for &e in candidates.iter().flatten() {
                    if step(e) > strength {
                        edge = e;
                        strength = step(e);
                    }
                }
            }
            if edge == x || strength < edge_threshold {
                continue;
            }

            // Edge left of the jump: the right side grows, and the other way round.
            let (span, value) = match edge < x {
                true => (edge + 1..x + 1, right),
                false => (x + 1..edge + 1, left),
            };
            for xx in span {
                if source[xx] != invalid && row[xx] != value {
                    row[xx] = value;
                    count += 1;
                }
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
    use ndarray::arr2;

    #[test]
    fn occlusion_takes_the_farther_side() {
        let mut disparity = arr2(&[
            [3.0, -1.0, -1.0, 7.0],
            [-1.0, 5.0, -1.0, -1.0],
            [-1.0, -1.0, -1.0, -1.0],
        ]);

        let count = fill_occlusion(&mut disparity, -1.0);

        assert_eq!(count, 5);
        assert_eq!(
            disparity,
            arr2(&[
                [3.0, 3.0, 3.0, 7.0],
                [5.0, 5.0, 5.0, 5.0],
                [-1.0, -1.0, -1.0, -1.0],
            ])
        );
    }

    #[test]
    fn fattened_foreground_snaps_to_edge() {
        // Intensity edge between columns 3 and 4, disparity jump between 5 and 6.
        let guide = Plane::from_shape_fn((1, 10), |(_, x)| if x < 4 { 0.0 } else { 100.0 });
        let mut disparity = Plane::from_shape_fn((1, 10), |(_, x)| if x < 6 { 2.0 } else { 8.0 });

        let count = correct_boundary(&mut disparity, &guide, 3, 20.0, -1.0);

        assert_eq!(count, 2);
        let expected = Plane::from_shape_fn((1, 10), |(_, x)| if x < 4 { 2.0 } else { 8.0 });
        assert_eq!(disparity, expected);
    }

    #[test]
    fn background_spill_snaps_to_edge() {
        let guide = Plane::from_shape_fn((1, 10), |(_, x)| if x < 7 { 0.0 } else { 100.0 });
        let mut disparity = Plane::from_shape_fn((1, 10), |(_, x)| if x < 5 { 2.0 } else { 8.0 });

        let count = correct_boundary(&mut disparity, &guide, 3, 20.0, -1.0);

        assert_eq!(count, 2);
        let expected = Plane::from_shape_fn((1, 10), |(_, x)| if x < 7 { 2.0 } else { 8.0 });
        assert_eq!(disparity, expected);
    }

    #[test]
    fn weak_edges_and_small_steps_are_ignored() {
        let guide = Plane::from_shape_fn((1, 10), |(_, x)| if x < 4 { 0.0 } else { 10.0 });
        let mut weak = Plane::from_shape_fn((1, 10), |(_, x)| if x < 6 { 2.0 } else { 8.0 });
        assert_eq!(correct_boundary(&mut weak, &guide, 3, 20.0, -1.0), 0);

        let strong = Plane::from_shape_fn((1, 10), |(_, x)| if x < 4 { 0.0 } else { 100.0 });
        let mut smooth = Plane::from_shape_fn((1, 10), |(_, x)| if x < 6 { 2.0 } else { 3.0 });
        assert_eq!(correct_boundary(&mut smooth, &strong, 3, 20.0, -1.0), 0);
    }
}
