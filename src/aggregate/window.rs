//! Fixed-shape windows: uniform box and Gaussian.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use super::Aggregator;
use crate::filter::{box_mean, gaussian_kernel, separable_mean};
use crate::plane::Plane;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

pub struct BoxAggregator {
    radius_x: usize,
    radius_y: usize,
}

pub struct GaussAggregator {
    kernel_x: Vec<f32>,
    kernel_y: Vec<f32>,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl BoxAggregator {
    pub fn new(radius_x: usize, radius_y: usize) -> Self {
        Self { radius_x, radius_y }
    }
}

impl Aggregator for BoxAggregator {
    fn name(&self) -> String {
        "Box".into()
    }

    fn aggregate(&self, src: &Plane, dest: &mut Plane) {
        box_mean(src, self.radius_x, self.radius_y, dest);
    }
}

impl GaussAggregator {
    pub fn new(radius_x: usize, radius_y: usize, sigma: f64) -> Self {
        Self {
            kernel_x: gaussian_kernel(radius_x, sigma),
            kernel_y: gaussian_kernel(radius_y, sigma),
        }
    }
}

impl Aggregator for GaussAggregator {
    fn name(&self) -> String {
        "Gauss".into()
    }

    fn aggregate(&self, src: &Plane, dest: &mut Plane) {
        separable_mean(src, &self.kernel_x, &self.kernel_y, dest);
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
    fn gauss_weights_centre_more_than_box() {
        let mut src = Plane::zeros((1, 5));
        src[[0, 2]] = 10.0;

        let mut boxed = Plane::zeros((1, 5));
        let mut gauss = Plane::zeros((1, 5));
        BoxAggregator::new(2, 0).aggregate(&src, &mut boxed);
        GaussAggregator::new(2, 0, 1.0).aggregate(&src, &mut gauss);

        assert_abs_diff_eq!(boxed[[0, 2]], 2.0, epsilon = 1e-6);
        assert!(gauss[[0, 2]] > boxed[[0, 2]]);
        assert!(gauss[[0, 0]] < boxed[[0, 0]]);
    }
}
