//! # Cost aggregation
//!
//! Each strategy replaces every cost by a weighted mean over a support window around the
//! pixel. Anything that depends only on the guidance image (cross arms, bilateral weights,
//! guide statistics) is computed once in [`build_aggregator`] and shared by all disparities.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

mod bilateral;
mod cross;
mod guided;
mod shiftable;
mod window;

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use crate::params::{AggregationMethod, Params};
use crate::plane::Plane;

pub use bilateral::BilateralAggregator;
pub use cross::{CrossArm, CrossBasedAggregator};
pub use guided::GuidedAggregator;
pub use shiftable::Shiftable;
pub use window::{BoxAggregator, GaussAggregator};

// -----------------------------------------------------------------------------------------------
// TRAITS
// -----------------------------------------------------------------------------------------------

pub trait Aggregator {
    /// Human readable name of the strategy.
    fn name(&self) -> String;

    /// Aggregate the cost plane `src` into `dest`, which has the same shape. Every element of
    /// `dest` is overwritten.
    fn aggregate(&self, src: &Plane, dest: &mut Plane);
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Build the aggregation strategy selected in `params`, guided by the target luma.
pub fn build_aggregator(params: &Params, guide: &Plane) -> Box<dyn Aggregator> {
    let (rx, ry) = (params.aggregation_radius_h, params.aggregation_radius_v);
    let kernel = params.aggregation_shiftable_kernel;

    match params.aggregation_method {
        AggregationMethod::Box => Box::new(BoxAggregator::new(rx, ry)),
        AggregationMethod::BoxShiftable => Box::new(Shiftable::new(
            BoxAggregator::new(rx, ry),
            kernel,
            (rx, ry),
        )),
        AggregationMethod::Gauss => Box::new(GaussAggregator::new(
            rx,
            ry,
            params.aggregation_sigma_space,
        )),
        AggregationMethod::GaussShiftable => Box::new(Shiftable::new(
            GaussAggregator::new(rx, ry, params.aggregation_sigma_space),
            kernel,
            (rx, ry),
        )),
        AggregationMethod::Guided => Box::new(GuidedAggregator::new(
            guide,
            rx,
            ry,
            params.aggregation_guided_filter_eps as f32,
        )),
        AggregationMethod::CrossBasedBox => Box::new(CrossBasedAggregator::new(
            guide,
            rx,
            ry,
            params.cross_based_threshold,
        )),
        AggregationMethod::Bilateral => Box::new(BilateralAggregator::new(
            guide,
            rx,
            ry,
            params.aggregation_sigma_space,
            params.aggregation_sigma_range,
        )),
    }
}
