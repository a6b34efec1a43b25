//! Shiftable windows. Instead of centring the support window on the pixel, every window
//! position within a small grid of shifts that still contains the pixel is tried and the
//! lowest aggregated cost kept. This reduces foreground fattening near depth edges.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use super::Aggregator;
use crate::plane::{clamp_coord, Plane};

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

/// Decorator turning any centred aggregation into its shiftable variant.
pub struct Shiftable<A> {
    inner: A,
    /// Window centre offsets `(dy, dx)`.
    offsets: Vec<(isize, isize)>,
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl<A: Aggregator> Shiftable<A> {
    /// `kernel` is the number of window positions per axis (odd), `radius` the window radius of
    /// the wrapped aggregation. A 3x3 kernel on radius `r` tries the nine windows centred at
    /// `{-r, 0, r}` in each direction.
    pub fn new(inner: A, kernel: (usize, usize), radius: (usize, usize)) -> Self {
        let (kx, ky) = ((kernel.0 / 2) as isize, (kernel.1 / 2) as isize);
        let (sx, sy) = (radius.0.max(1) as isize, radius.1.max(1) as isize);

        let mut offsets = Vec::with_capacity(((2 * kx + 1) * (2 * ky + 1)) as usize);
        for j in -ky..=ky {
            for i in -kx..=kx {
                offsets.push((j * sy, i * sx));
            }
        }

        Self { inner, offsets }
    }

    pub fn offsets(&self) -> &[(isize, isize)] {
        &self.offsets
    }
}

impl<A: Aggregator> Aggregator for Shiftable<A> {
    fn name(&self) -> String {
        format!("{}Shiftable", self.inner.name())
    }

    fn aggregate(&self, src: &Plane, dest: &mut Plane) {
        let (rows, cols) = src.dim();
        let mut centred = Plane::zeros((rows, cols));
        self.inner.aggregate(src, &mut centred);

        for y in 0..rows {
            for x in 0..cols {
                let mut best = f32::INFINITY;
                for (dy, dx) in &self.offsets {
                    let yy = clamp_coord(y as isize + dy, rows);
                    let xx = clamp_coord(x as isize + dx, cols);
                    best = best.min(centred[[yy, xx]]);
                }
                dest[[y, x]] = best;
            }
        }
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
