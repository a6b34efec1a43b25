//! Joint bilateral aggregation. Weights combine spatial distance and intensity similarity in
//! the guide and are precomputed as one plane per window offset.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use super::Aggregator;
use crate::plane::Plane;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

pub struct BilateralAggregator {
    /// Window offsets `(dy, dx)` paired with the weight plane of that offset.
    taps: Vec<((isize, isize), Plane)>,
    norm: Plane,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl BilateralAggregator {
    pub fn new(
        guide: &Plane,
        radius_x: usize,
        radius_y: usize,
        sigma_space: f64,
        sigma_range: f64,
    ) -> Self {
        let (rows, cols) = guide.dim();
        let (rx, ry) = (radius_x as isize, radius_y as isize);
        let space_den = (2.0 * sigma_space * sigma_space) as f32;
        let range_den = (2.0 * sigma_range * sigma_range) as f32;

        let mut taps = Vec::with_capacity(((2 * rx + 1) * (2 * ry + 1)) as usize);
        let mut norm = Plane::zeros((rows, cols));

        for dy in -ry..=ry {
            for dx in -rx..=rx {
                let space = (-((dx * dx + dy * dy) as f32) / space_den).exp();

                let weights = Plane::from_shape_fn((rows, cols), |(y, x)| {
                    let (yy, xx) = (y as isize + dy, x as isize + dx);
                    if yy < 0 || xx < 0 || yy as usize >= rows || xx as usize >= cols {
                        return 0.0;
                    }
                    let diff = guide[[yy as usize, xx as usize]] - guide[[y, x]];
                    space * (-(diff * diff) / range_den).exp()
                });

                norm += &weights;
                taps.push(((dy, dx), weights));
            }
        }

        Self { taps, norm }
    }
}

impl Aggregator for BilateralAggregator {
    fn name(&self) -> String {
        "Bilateral".into()
    }

    fn aggregate(&self, src: &Plane, dest: &mut Plane) {
        let (rows, cols) = src.dim();
        dest.fill(0.0);

        for ((dy, dx), weights) in &self.taps {
            for y in 0..rows {
                let yy = y as isize + dy;
                if yy < 0 || yy as usize >= rows {
                    continue;
                }
                for x in 0..cols {
                    let xx = x as isize + dx;
                    if xx < 0 || xx as usize >= cols {
                        continue;
                    }
                    dest[[y, x]] += weights[[y, x]] * src[[yy as usize, xx as usize]];
                }
            }
        }

        ndarray::Zip::from(dest)
            .and(&self.norm)
            .for_each(|d, &n| *d /= n);
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn constant_cost_is_preserved() {
        let guide = Plane::from_shape_fn((6, 6), |(y, x)| ((x * 31 + y * 17) % 40) as f32);
        let cost = Plane::from_elem((6, 6), 4.0);

        let agg = BilateralAggregator::new(&guide, 2, 1, 2.0, 10.0);
        let mut dest = Plane::zeros(cost.dim());
        agg.aggregate(&cost, &mut dest);

        for v in dest.iter() {
            assert_abs_diff_eq!(*v, 4.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn dissimilar_neighbours_barely_contribute() {
        let guide = Plane::from_shape_fn((3, 6), |(_, x)| if x < 3 { 0.0 } else { 255.0 });
        let cost = Plane::from_shape_fn((3, 6), |(_, x)| if x < 3 { 0.0 } else { 50.0 });

        let agg = BilateralAggregator::new(&guide, 2, 1, 2.0, 5.0);
        let mut dest = Plane::zeros(cost.dim());
        agg.aggregate(&cost, &mut dest);

        assert!(dest[[1, 2]] < 1e-3);
        assert!(dest[[1, 3]] > 49.9);
    }
}
