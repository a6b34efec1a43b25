//! Intensity and gradient based costs: squared and absolute difference and Birchfield-Tomasi,
//! evaluated on the image, on the prefiltered gradient, or on a blend of both.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use ndarray::{ArrayView1, Zip};

use super::CostMetric;
use crate::filter::box_mean_new;
use crate::plane::{clamp_coord, Plane};
use crate::prefilter::MatchingView;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

/// Pixel dissimilarity measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// Squared difference, capped at the square of the error cap.
    Sd,
    /// Absolute difference.
    Ad,
    /// Birchfield-Tomasi against the reference half-sample interval.
    Bt,
    /// Symmetric Birchfield-Tomasi, the smaller of both one-sided measures.
    BtFull,
}

/// Which planes of the views a cost is computed on.
#[derive(Debug, Clone)]
pub enum CostSource {
    /// Intensity channels, averaged.
    Image,
    /// Prefiltered horizontal derivative only.
    Gradient,
    /// `alpha * image + (1 - alpha) * gradient`.
    Blend(f32),
    /// Like `Blend` with a per-pixel alpha.
    TextureBlend(Plane),
}

// -----------------------------------------------------------------------------------------------
// DATA STRUCTURES
// -----------------------------------------------------------------------------------------------

pub struct IntensityCost {
    measure: Measure,
    source: CostSource,
    cap: f32,
}

struct SdMeasure;
struct AdMeasure;
struct BtMeasure;
struct BtFullMeasure;

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

/// Static form of [`Measure`], monomorphised into the cost loops.
trait PixelMeasure {
    /// Raw cost of target row sample `x` against reference row sample `xr`.
    fn cost(target: &ArrayView1<f32>, reference: &ArrayView1<f32>, x: usize, xr: usize) -> f32;

    fn ceiling(cap: f32) -> f32 {
        cap
    }
}

// -----------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// -----------------------------------------------------------------------------------------------

impl PixelMeasure for SdMeasure {
    #[inline]
    fn cost(target: &ArrayView1<f32>, reference: &ArrayView1<f32>, x: usize, xr: usize) -> f32 {
        let diff = target[x] - reference[xr];
        diff * diff
    }

    fn ceiling(cap: f32) -> f32 {
        cap * cap
    }
}

impl PixelMeasure for AdMeasure {
    #[inline]
    fn cost(target: &ArrayView1<f32>, reference: &ArrayView1<f32>, x: usize, xr: usize) -> f32 {
        (target[x] - reference[xr]).abs()
    }
}

impl PixelMeasure for BtMeasure {
    #[inline]
    fn cost(target: &ArrayView1<f32>, reference: &ArrayView1<f32>, x: usize, xr: usize) -> f32 {
        bt_one_side(target[x], reference, xr)
    }
}

impl PixelMeasure for BtFullMeasure {
    #[inline]
    fn cost(target: &ArrayView1<f32>, reference: &ArrayView1<f32>, x: usize, xr: usize) -> f32 {
        bt_one_side(target[x], reference, xr).min(bt_one_side(reference[xr], target, x))
    }
}

impl IntensityCost {
    pub fn new(measure: Measure, source: CostSource, cap: f32) -> Self {
        Self {
            measure,
            source,
            cap,
        }
    }

    fn compute_with<M: PixelMeasure>(
        &self,
        target: &MatchingView,
        reference: &MatchingView,
        disparity: i32,
        dest: &mut Plane,
    ) {
        let channels = target.channels.iter().zip(reference.channels.iter());
        let per_channel = 1.0 / target.channels.len() as f32;
        let cap = self.cap;

        dest.fill(0.0);

        match &self.source {
            CostSource::Image => {
                for (t, r) in channels {
                    accumulate::<M, _>(t, r, disparity, cap, dest, |_, _| per_channel);
                }
            }
            CostSource::Gradient => {
                accumulate::<M, _>(
                    &target.gradient,
                    &reference.gradient,
                    disparity,
                    cap,
                    dest,
                    |_, _| 1.0,
                );
            }
            CostSource::Blend(alpha) => {
                let image_weight = alpha * per_channel;
                for (t, r) in channels {
                    accumulate::<M, _>(t, r, disparity, cap, dest, |_, _| image_weight);
                }
                accumulate::<M, _>(
                    &target.gradient,
                    &reference.gradient,
                    disparity,
                    cap,
                    dest,
                    |_, _| 1.0 - alpha,
                );
            }
            CostSource::TextureBlend(alpha) => {
                for (t, r) in channels {
                    accumulate::<M, _>(t, r, disparity, cap, dest, |y, x| {
                        alpha[[y, x]] * per_channel
                    });
                }
                accumulate::<M, _>(
                    &target.gradient,
                    &reference.gradient,
                    disparity,
                    cap,
                    dest,
                    |y, x| 1.0 - alpha[[y, x]],
                );
            }
        }
    }
}

impl CostMetric for IntensityCost {
    fn name(&self) -> String {
        let source = match self.source {
            CostSource::Image => "",
            CostSource::Gradient => "Sobel",
            CostSource::Blend(_) => "SobelBlend",
            CostSource::TextureBlend(_) => "TextureBlend",
        };
        format!("{:?}{}", self.measure, source)
    }

    fn compute(
        &self,
        target: &MatchingView,
        reference: &MatchingView,
        disparity: i32,
        dest: &mut Plane,
    ) {
        match self.measure {
            Measure::Sd => self.compute_with::<SdMeasure>(target, reference, disparity, dest),
            Measure::Ad => self.compute_with::<AdMeasure>(target, reference, disparity, dest),
            Measure::Bt => self.compute_with::<BtMeasure>(target, reference, disparity, dest),
            Measure::BtFull => {
                self.compute_with::<BtFullMeasure>(target, reference, disparity, dest)
            }
        }
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Add `weight(y, x) * min(cost, ceiling)` of one plane pair into `dest`.
fn accumulate<M, W>(
    target: &Plane,
    reference: &Plane,
    disparity: i32,
    cap: f32,
    dest: &mut Plane,
    weight: W,
) where
    M: PixelMeasure,
    W: Fn(usize, usize) -> f32,
{
    let (rows, cols) = target.dim();
    let ceiling = M::ceiling(cap);
    let d = disparity as isize;

    for y in 0..rows {
        let t = target.row(y);
        let r = reference.row(y);
        for x in 0..cols {
            let xr = clamp_coord(x as isize - d, cols);
            dest[[y, x]] += weight(y, x) * M::cost(&t, &r, x, xr).min(ceiling);
        }
    }
}

/// Distance of `value` to the interval spanned by `row[i]` and its two half-sample
/// interpolations.
#[inline]
fn bt_one_side(value: f32, row: &ArrayView1<f32>, i: usize) -> f32 {
    let n = row.len();
    let c = row[i];
    let left = 0.5 * (c + row[i.saturating_sub(1)]);
    let right = 0.5 * (c + row[(i + 1).min(n - 1)]);

    let lo = c.min(left).min(right);
    let hi = c.max(left).max(right);

    (value - hi).max(lo - value).max(0.0)
}

/// Per-pixel image weight of the texture blend metrics.
///
/// Texture strength is the local mean of the absolute prefiltered derivative. At or below
/// `low` only the image cost is used; at or above `high` the fixed blend `base_alpha` applies;
/// in between the weight ramps linearly.
pub fn texture_alpha(
    view: &MatchingView,
    pre_filter_cap: i32,
    radius: usize,
    low: i32,
    high: i32,
    base_alpha: f32,
) -> Plane {
    let offset = pre_filter_cap as f32;
    let magnitude = view.gradient.mapv(|g| (g - offset).abs());
    let mut alpha = box_mean_new(&magnitude, radius, radius);

    let (low, high) = (low as f32, high as f32);
    Zip::from(&mut alpha).for_each(|a| {
        let strength = *a;
        *a = if strength <= low {
            1.0
        } else if strength >= high {
            base_alpha
        } else {
            1.0 + (base_alpha - 1.0) * (strength - low) / (high - low)
        };
    });

    alpha
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
