//! # Smoothing kernels
//!
//! Box mean, separable Gaussian and guided filtering of single precision planes. Windows are
//! clipped at the image boundary and normalised by the weight that actually falls inside.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use ndarray::{Array2, Zip};

use crate::plane::Plane;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Regularised guide variance below which a window is treated as flat.
const MIN_VARIANCE: f32 = 1e-3;

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Guided filter with a fixed guidance image. Guide statistics are computed once and reused
/// for every plane filtered.
pub(crate) struct GuidedFilter {
    guide: Plane,
    mean_guide: Plane,
    var_guide: Plane,
    radius_x: usize,
    radius_y: usize,
    eps: f32,
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Summed area table with one row and column of zero padding.
fn integral(src: &Plane) -> Array2<f64> {
    let (rows, cols) = src.dim();
    let mut table = Array2::<f64>::zeros((rows + 1, cols + 1));

    for y in 0..rows {
        let mut row_sum = 0.0f64;
        for x in 0..cols {
            row_sum += src[[y, x]] as f64;
            table[[y + 1, x + 1]] = table[[y, x + 1]] + row_sum;
        }
    }

    table
}

/// Mean over a `(2 * radius_x + 1) x (2 * radius_y + 1)` window, clipped at the border.
pub(crate) fn box_mean(src: &Plane, radius_x: usize, radius_y: usize, dest: &mut Plane) {
    let (rows, cols) = src.dim();
    let table = integral(src);

    for y in 0..rows {
        let y0 = y.saturating_sub(radius_y);
        let y1 = (y + radius_y + 1).min(rows);

        for x in 0..cols {
            let x0 = x.saturating_sub(radius_x);
            let x1 = (x + radius_x + 1).min(cols);

            let sum = table[[y1, x1]] - table[[y0, x1]] - table[[y1, x0]] + table[[y0, x0]];
            let count = ((y1 - y0) * (x1 - x0)) as f64;
            dest[[y, x]] = (sum / count) as f32;
        }
    }
}

/// Allocating form of [`box_mean`].
pub(crate) fn box_mean_new(src: &Plane, radius_x: usize, radius_y: usize) -> Plane {
    let mut dest = Plane::zeros(src.dim());
    box_mean(src, radius_x, radius_y, &mut dest);
    dest
}

/// One dimensional Gaussian taps for offsets `-radius..=radius`, not normalised.
pub(crate) fn gaussian_kernel(radius: usize, sigma: f64) -> Vec<f32> {
    let r = radius as isize;
    (-r..=r)
        .map(|i| (-((i * i) as f64) / (2.0 * sigma * sigma)).exp() as f32)
        .collect()
}

/// Separable weighted mean with the given horizontal and vertical taps.
///
/// Taps falling outside the image are dropped and the remaining weight renormalised, which for
/// uniform taps reproduces [`box_mean`].
pub(crate) fn separable_mean(src: &Plane, kernel_x: &[f32], kernel_y: &[f32], dest: &mut Plane) {
    let (rows, cols) = src.dim();
    let rx = (kernel_x.len() / 2) as isize;
    let ry = (kernel_y.len() / 2) as isize;

    let mut horizontal = Plane::zeros((rows, cols));
    let mut norm_x = vec![0.0f32; cols];
    for x in 0..cols {
        for (i, w) in kernel_x.iter().enumerate() {
            let xx = x as isize + i as isize - rx;
            if xx >= 0 && (xx as usize) < cols {
                norm_x[x] += w;
            }
        }
    }

    for y in 0..rows {
        for x in 0..cols {
            let mut acc = 0.0f32;
            for (i, w) in kernel_x.iter().enumerate() {
                let xx = x as isize + i as isize - rx;
                if xx >= 0 && (xx as usize) < cols {
                    acc += w * src[[y, xx as usize]];
                }
            }
            horizontal[[y, x]] = acc / norm_x[x];
        }
    }

    for y in 0..rows {
        let mut norm = 0.0f32;
        for (j, w) in kernel_y.iter().enumerate() {
            let yy = y as isize + j as isize - ry;
            if yy >= 0 && (yy as usize) < rows {
                norm += w;
            }
        }

        for x in 0..cols {
            let mut acc = 0.0f32;
            for (j, w) in kernel_y.iter().enumerate() {
                let yy = y as isize + j as isize - ry;
                if yy >= 0 && (yy as usize) < rows {
                    acc += w * horizontal[[yy as usize, x]];
                }
            }
            dest[[y, x]] = acc / norm;
        }
    }
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl GuidedFilter {
    pub(crate) fn new(guide: &Plane, radius_x: usize, radius_y: usize, eps: f32) -> Self {
        let mean_guide = box_mean_new(guide, radius_x, radius_y);
        let sq = guide * guide;
        let mut var_guide = box_mean_new(&sq, radius_x, radius_y);
        Zip::from(&mut var_guide)
            .and(&mean_guide)
            .for_each(|v, &m| *v -= m * m);

        Self {
            guide: guide.clone(),
            mean_guide,
            var_guide,
            radius_x,
            radius_y,
            eps,
        }
    }

    /// Filter `input` with the stored guide, writing into `dest`.
    pub(crate) fn filter(&self, input: &Plane, dest: &mut Plane) {
        let (rx, ry) = (self.radius_x, self.radius_y);

        let mean_input = box_mean_new(input, rx, ry);
        let product = &self.guide * input;
        let corr = box_mean_new(&product, rx, ry);

        // a = cov(I, p) / (var(I) + eps), b = mean(p) - a * mean(I)
        let mut a = Plane::zeros(input.dim());
        let mut b = Plane::zeros(input.dim());
        Zip::from(&mut a)
            .and(&mut b)
            .and(&corr)
            .and(&mean_input)
            .and(&self.mean_guide)
            .and(&self.var_guide)
            .for_each(|a, b, &c, &mp, &mi, &vi| {
                // Rounding can push the variance of a flat window slightly negative.
                let denom = vi.max(0.0) + self.eps;
                *a = match denom > MIN_VARIANCE {
                    true => (c - mi * mp) / denom,
                    false => 0.0,
                };
                *b = mp - *a * mi;
            });

        let mean_a = box_mean_new(&a, rx, ry);
        let mean_b = box_mean_new(&b, rx, ry);

        Zip::from(dest)
            .and(&mean_a)
            .and(&mean_b)
            .and(&self.guide)
            .for_each(|d, &ma, &mb, &g| *d = ma * g + mb);
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
