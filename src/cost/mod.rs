//! # Pixel matching costs
//!
//! The cost metric bank. Each metric fills one cost plane for one disparity: the value at
//! `(x, y)` measures how badly the target pixel `(x, y)` matches the reference pixel
//! `(x - d, y)`. Reference columns falling outside the image are clamped to the nearest edge
//! column, those pixels are dealt with by the left border handling later on.
//!
//! The metric is chosen once per matching call by [`build_metric`], so the per-pixel loops
//! never branch on the configured method.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

mod census;
mod intensity;

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::params::{Params, PixelMatchingMethod};
use crate::plane::Plane;
use crate::prefilter::MatchingView;

pub use census::{CensusCost, CensusWindow};
pub use intensity::{texture_alpha, CostSource, IntensityCost, Measure};

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

pub trait CostMetric {
    /// Human readable name of the metric.
    fn name(&self) -> String;

    /// Fill `dest` with the matching cost of every target pixel at `disparity`.
    ///
    /// `dest` must have the shape of the views and every element is overwritten.
    fn compute(
        &self,
        target: &MatchingView,
        reference: &MatchingView,
        disparity: i32,
        dest: &mut Plane,
    );
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Build the metric selected in `params` for the given pair.
///
/// Census codes and texture maps depend only on the views, so they are computed here once and
/// shared by every disparity.
pub fn build_metric(
    params: &Params,
    target: &MatchingView,
    reference: &MatchingView,
) -> Box<dyn CostMetric> {
    use PixelMatchingMethod as M;

    let cap = params.pixel_match_error_cap as f32;
    let alpha = params.cost_alpha_image_sobel as f32 / 100.0;

    let intensity = |measure: Measure, source: CostSource| -> Box<dyn CostMetric> {
        Box::new(IntensityCost::new(measure, source, cap))
    };
    let census = |window: CensusWindow| -> Box<dyn CostMetric> {
        Box::new(CensusCost::new(window, target, reference, cap))
    };
    let textured = |measure: Measure| -> Box<dyn CostMetric> {
        let alpha_map = texture_alpha(
            target,
            params.pre_filter_cap,
            params.sobel_blend_map_param_size,
            params.sobel_blend_map_param1,
            params.sobel_blend_map_param2,
            alpha,
        );
        Box::new(IntensityCost::new(
            measure,
            CostSource::TextureBlend(alpha_map),
            cap,
        ))
    };

    match params.pixel_matching_method {
        M::Sd => intensity(Measure::Sd, CostSource::Image),
        M::SdSobel => intensity(Measure::Sd, CostSource::Gradient),
        M::SdSobelBlend => intensity(Measure::Sd, CostSource::Blend(alpha)),
        M::Ad => intensity(Measure::Ad, CostSource::Image),
        M::AdSobel => intensity(Measure::Ad, CostSource::Gradient),
        M::AdSobelBlend => intensity(Measure::Ad, CostSource::Blend(alpha)),
        M::Bt => intensity(Measure::Bt, CostSource::Image),
        M::BtSobel => intensity(Measure::Bt, CostSource::Gradient),
        M::BtSobelBlend => intensity(Measure::Bt, CostSource::Blend(alpha)),
        M::BtFull => intensity(Measure::BtFull, CostSource::Image),
        M::BtFullSobel => intensity(Measure::BtFull, CostSource::Gradient),
        M::BtFullSobelBlend => intensity(Measure::BtFull, CostSource::Blend(alpha)),
        M::Census3x3 => census(CensusWindow::W3x3),
        M::Census5x5 => census(CensusWindow::W5x5),
        M::Census7x5 => census(CensusWindow::W7x5),
        M::Census9x1 => census(CensusWindow::W9x1),
        M::AdTextureBlend => textured(Measure::Ad),
        M::BtTextureBlend => textured(Measure::Bt),
    }
}
