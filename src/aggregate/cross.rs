//! Cross-based adaptive support. Every pixel grows four arms along runs of similar intensity;
//! the support region is the union of the horizontal arms of all pixels on its vertical arm.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use ndarray::Array2;

use super::Aggregator;
use crate::plane::Plane;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Arm lengths of one pixel, the pixel itself not included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrossArm {
    pub left: u16,
    pub right: u16,
    pub up: u16,
    pub down: u16,
}

pub struct CrossBasedAggregator {
    arms: Array2<CrossArm>,
    /// Number of pixels in each support region.
    support: Plane,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl CrossBasedAggregator {
    /// Build arms on `guide`. Horizontal arms are at most `radius_x` long, vertical arms at most
    /// `radius_y`; an arm stops before the first pixel differing by `threshold` or more from the
    /// anchor.
    pub fn new(guide: &Plane, radius_x: usize, radius_y: usize, threshold: f32) -> Self {
        let arms = build_arms(guide, radius_x, radius_y, threshold);

        let ones = Plane::from_elem(guide.dim(), 1.0);
        let mut support = Plane::zeros(guide.dim());
        sum_over_support(&arms, &ones, &mut support);

        Self { arms, support }
    }

    pub fn arms(&self) -> &Array2<CrossArm> {
        &self.arms
    }
}

impl Aggregator for CrossBasedAggregator {
    fn name(&self) -> String {
        "CrossBasedBox".into()
    }

    fn aggregate(&self, src: &Plane, dest: &mut Plane) {
        sum_over_support(&self.arms, src, dest);
        ndarray::Zip::from(dest)
            .and(&self.support)
            .for_each(|d, &n| *d /= n);
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

fn build_arms(guide: &Plane, radius_x: usize, radius_y: usize, threshold: f32) -> Array2<CrossArm> {
    let (rows, cols) = guide.dim();

    Array2::from_shape_fn((rows, cols), |(y, x)| {
        let anchor = guide[[y, x]];
        let similar = |yy: usize, xx: usize| (guide[[yy, xx]] - anchor).abs() < threshold;

        let mut arm = CrossArm::default();
        while (arm.left as usize) < radius_x.min(x) && similar(y, x - arm.left as usize - 1) {
            arm.left += 1;
        }
        while (arm.right as usize) < radius_x.min(cols - 1 - x)
            && similar(y, x + arm.right as usize + 1)
        {
            arm.right += 1;
        }
        while (arm.up as usize) < radius_y.min(y) && similar(y - arm.up as usize - 1, x) {
            arm.up += 1;
        }
        while (arm.down as usize) < radius_y.min(rows - 1 - y)
            && similar(y + arm.down as usize + 1, x)
        {
            arm.down += 1;
        }

        arm
    })
}

/// Horizontal arm sums followed by vertical sums of those along the vertical arm.
fn sum_over_support(arms: &Array2<CrossArm>, src: &Plane, dest: &mut Plane) {
    let (rows, cols) = src.dim();
    let mut horizontal = Plane::zeros((rows, cols));
    let mut prefix = vec![0.0f64; cols.max(rows) + 1];

    for y in 0..rows {
        for x in 0..cols {
            prefix[x + 1] = prefix[x] + src[[y, x]] as f64;
        }
        for x in 0..cols {
            let arm = arms[[y, x]];
            let x0 = x - arm.left as usize;
            let x1 = x + arm.right as usize + 1;
            horizontal[[y, x]] = (prefix[x1] - prefix[x0]) as f32;
        }
    }

    for x in 0..cols {
        for y in 0..rows {
            prefix[y + 1] = prefix[y] + horizontal[[y, x]] as f64;
        }
        for y in 0..rows {
            let arm = arms[[y, x]];
            let y0 = y - arm.up as usize;
            let y1 = y + arm.down as usize + 1;
            dest[[y, x]] = (prefix[y1] - prefix[y0]) as f32;
        }
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
    fn arms_stop_at_intensity_edges() {
        let guide = Plane::from_shape_fn((5, 10), |(_, x)| if x < 4 { 10.0 } else { 100.0 });
        let agg = CrossBasedAggregator::new(&guide, 3, 2, 20.0);

        let arm = agg.arms()[[2, 3]];
        assert_eq!(arm.left, 3);
        assert_eq!(arm.right, 0);
        assert_eq!(arm.up, 2);
        assert_eq!(arm.down, 2);

        let arm = agg.arms()[[0, 9]];
        assert_eq!((arm.left, arm.right, arm.up, arm.down), (3, 0, 0, 2));
    }

    #[test]
    fn aggregation_stays_inside_region() {
        let guide = Plane::from_shape_fn((5, 10), |(_, x)| if x < 4 { 10.0 } else { 100.0 });
        let cost = Plane::from_shape_fn((5, 10), |(_, x)| if x < 4 { 7.0 } else { 1.0 });

        let agg = CrossBasedAggregator::new(&guide, 3, 2, 20.0);
        let mut dest = Plane::zeros(cost.dim());
        agg.aggregate(&cost, &mut dest);

        for y in 0..5 {
            assert_abs_diff_eq!(dest[[y, 3]], 7.0, epsilon = 1e-5);
            assert_abs_diff_eq!(dest[[y, 4]], 1.0, epsilon = 1e-5);
        }
    }
}
